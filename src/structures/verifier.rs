use std::sync::Arc;

use crate::traits::{ChecksumProvider, FileSizeProvider};

/// How thoroughly a cached file is checked before it is trusted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyLevel {
  /// Compare the byte length only
  Size,
  /// Compare the whole-file checksum
  Checksum,
}

#[derive(Clone)]
pub struct Verifier {
  pub(crate) level: VerifyLevel,
  pub(crate) checksum: Arc<dyn ChecksumProvider>,
  pub(crate) file_size: Arc<dyn FileSizeProvider>,
}

/// SHA256 checksum, upper case hex
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Checksum;

#[derive(Debug, Clone, Copy, Default)]
pub struct FsFileSize;
