use tracing::info;

use crate::functions::human_readable_bytesize;
use crate::structures::{DownloadProgress, Error, Progress};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

impl Progress {
  pub fn new() -> Self {
    Self {
      current_action: Arc::new(Mutex::new(String::new())),
      downloaded_files: Arc::new((AtomicU64::new(0), AtomicU64::new(0))),
      downloaded_bytes: Arc::new((AtomicU64::new(0), AtomicU64::new(0))),
      failed_files: Arc::new(AtomicU64::new(0)),
    }
  }

  pub fn get_current_action(&self) -> Result<String, Error> {
    Ok((*self.current_action.lock()?).clone())
  }

  pub(crate) fn set_current_action(&self, value: &str) -> Result<(), Error> {
    info!("Current action: {}", value);
    *self.current_action.lock()? = value.to_owned();
    Ok(())
  }

  /// Starts counting a new batch of downloads from `start`.
  pub(crate) fn reset_downloads(&self, start: DownloadProgress) {
    info!("Downloading {} files, {}", start.files_total - start.files_completed, human_readable_bytesize(start.bytes_total - start.bytes_completed));
    self.downloaded_files.0.store(start.files_completed, Ordering::Relaxed);
    self.downloaded_files.1.store(start.files_total, Ordering::Relaxed);
    self.downloaded_bytes.0.store(start.bytes_completed, Ordering::Relaxed);
    self.downloaded_bytes.1.store(start.bytes_total, Ordering::Relaxed);
    self.failed_files.store(0, Ordering::Relaxed);
  }

  pub(crate) fn increment_downloaded(&self, bytes: u64) {
    self.downloaded_files.0.fetch_add(1, Ordering::Relaxed);
    self.downloaded_bytes.0.fetch_add(bytes, Ordering::Relaxed);
  }

  pub(crate) fn increment_failed(&self) {
    self.failed_files.fetch_add(1, Ordering::Relaxed);
  }

  pub fn failed_files(&self) -> u64 {
    self.failed_files.load(Ordering::Relaxed)
  }

  pub fn downloads(&self) -> DownloadProgress {
    DownloadProgress {
      bytes_completed: self.downloaded_bytes.0.load(Ordering::Relaxed),
      bytes_total: self.downloaded_bytes.1.load(Ordering::Relaxed),
      files_completed: self.downloaded_files.0.load(Ordering::Relaxed),
      files_total: self.downloaded_files.1.load(Ordering::Relaxed),
    }
  }
}

impl Default for Progress {
  fn default() -> Self {
    Self::new()
  }
}

impl DownloadProgress {
  /// Completed share of the bytes, 1.0 for an empty batch
  pub fn ratio(&self) -> f64 {
    if self.bytes_total == 0 {
      return 1.0;
    }
    self.bytes_completed as f64 / self.bytes_total as f64
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn clones_share_counters() {
    let progress = Progress::new();
    let observer = progress.clone();
    progress.reset_downloads(DownloadProgress { bytes_completed: 0, bytes_total: 300, files_completed: 0, files_total: 2 });
    progress.increment_downloaded(100);
    assert_eq!(observer.downloads(), DownloadProgress { bytes_completed: 100, bytes_total: 300, files_completed: 1, files_total: 2 });
    assert!((observer.downloads().ratio() - 1.0 / 3.0).abs() < f64::EPSILON);
  }

  #[test]
  fn current_action_is_shared() {
    let progress = Progress::new();
    progress.set_current_action("Downloading bundles").unwrap();
    assert_eq!(progress.clone().get_current_action().unwrap(), "Downloading bundles");
  }

  #[test]
  fn empty_batch_is_complete() {
    assert_eq!(DownloadProgress::default().ratio(), 1.0);
  }
}
