use std::sync::atomic::AtomicU64;
use std::sync::{Arc, Mutex};

/// Shared progress counters, cheap to clone
#[derive(Debug, Clone)]
pub struct Progress {
  pub(crate) current_action: Arc<Mutex<String>>,
  /// (completed, total)
  pub(crate) downloaded_files: Arc<(AtomicU64, AtomicU64)>,
  /// (completed, total)
  pub(crate) downloaded_bytes: Arc<(AtomicU64, AtomicU64)>,
  pub(crate) failed_files: Arc<AtomicU64>,
}

/// Point in time copy of the download counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DownloadProgress {
  pub bytes_completed: u64,
  pub bytes_total: u64,
  pub files_completed: u64,
  pub files_total: u64,
}
