use std::path::Path;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::functions::get_hash;
use crate::structures::{Error, FsFileSize, Sha256Checksum, Verifier, VerifyLevel};
use crate::traits::{ChecksumProvider, FileSizeProvider};

impl ChecksumProvider for Sha256Checksum {
  fn checksum(&self, path: &Path) -> Result<String, Error> {
    get_hash(path)
  }
}

impl FileSizeProvider for FsFileSize {
  fn file_size(&self, path: &Path) -> Result<u64, Error> {
    Ok(std::fs::metadata(path)?.len())
  }
}

impl std::fmt::Debug for Verifier {
  fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
    f.debug_struct("Verifier").field("level", &self.level).finish()
  }
}

impl Verifier {
  pub fn new(level: VerifyLevel) -> Self {
    Self::with_providers(level, Arc::new(Sha256Checksum), Arc::new(FsFileSize))
  }

  pub fn with_providers(level: VerifyLevel, checksum: Arc<dyn ChecksumProvider>, file_size: Arc<dyn FileSizeProvider>) -> Self {
    Self {
      level,
      checksum,
      file_size,
    }
  }

  pub fn level(&self) -> VerifyLevel {
    self.level
  }

  /// Checks the file at `path`. A missing or unreadable file fails verification.
  ///
  /// `VerifyLevel::Size` trusts any file of the right length, even one that was
  /// truncated and padded back to size.
  pub fn verify(&self, path: &Path, expected_size: u64, expected_checksum: &str) -> bool {
    if !path.is_file() {
      trace!("{} does not exist", path.display());
      return false;
    }
    let verified = match self.level {
      VerifyLevel::Size => self.file_size.file_size(path).map(|size| size == expected_size),
      VerifyLevel::Checksum => self.checksum.checksum(path).map(|checksum| checksum.eq_ignore_ascii_case(expected_checksum)),
    };
    match verified {
      Ok(verified) => {
        if !verified {
          debug!("{} failed {:?} verification", path.display(), self.level);
        }
        verified
      },
      Err(e) => {
        debug!("Couldn't verify {}: {}", path.display(), e);
        false
      }
    }
  }
}
