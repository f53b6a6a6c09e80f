use std::fs::OpenOptions;
use std::path::Path;

use sha2::{Sha256, Digest};

use crate::structures::Error;

/// Opens a file and calculates it's SHA256 hash
pub fn get_hash(file_path: &Path) -> Result<String, Error> {
  let mut file = OpenOptions::new().read(true).open(file_path)?;
  let mut sha256 = Sha256::new();
  std::io::copy(&mut file, &mut sha256)?;
  Ok(hex::encode_upper(sha256.finalize()))
}

/// SHA256 hash of an in-memory buffer, formatted like `get_hash`
pub fn get_buffer_hash(buffer: &[u8]) -> String {
  hex::encode_upper(Sha256::digest(buffer))
}
