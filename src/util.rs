use std::{
    fs::{self, File},
    io::{self, ErrorKind, Write},
    path::Path,
};

use bincode::{config, Decode, Encode};

/// Save to file, using Bincode.
pub fn save<T: Encode>(path: &Path, data: &T) -> io::Result<()> {
    let encoded = bincode::encode_to_vec(data, config::standard())
        .map_err(|e| io::Error::new(ErrorKind::InvalidData, e.to_string()))?;

    let mut file = File::create(path)?;
    file.write_all(&encoded)?;
    Ok(())
}

/// Load from file, using Bincode.
pub fn load<T: Decode<()>>(path: &Path) -> io::Result<T> {
    let buffer = fs::read(path)?;
    let (decoded, _len) = bincode::decode_from_slice(&buffer, config::standard())
        .map_err(|e| io::Error::new(ErrorKind::InvalidData, e.to_string()))?;
    Ok(decoded)
}
