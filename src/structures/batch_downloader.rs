use std::sync::Arc;
use std::time::Duration;

use crate::structures::{DownloadRequest, Progress, Verifier};
use crate::traits::Transport;

/// Lifecycle of one request inside a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
  Pending,
  InFlight,
  Succeeded,
  /// Failed, another attempt is queued
  Failed,
  /// Failed and out of attempts
  FailedFinal,
}

/// Downloads a list of bundles with bounded concurrency and per-file retries
pub struct BatchDownloader {
  pub(crate) requests: Vec<DownloadRequest>,
  pub(crate) states: Vec<RequestState>,
  pub(crate) attempts: Vec<u32>,
  pub(crate) max_concurrency: usize,
  pub(crate) max_retries: u32,
  pub(crate) timeout: Duration,
  pub(crate) transport: Arc<dyn Transport>,
  pub(crate) verifier: Verifier,
  pub(crate) progress: Progress,
  pub(crate) peak_in_flight: usize,
}
