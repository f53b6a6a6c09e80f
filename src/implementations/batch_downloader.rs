use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{FuturesUnordered, StreamExt};
use tracing::{error, info, warn};

use crate::functions::download_bundle;
use crate::structures::{BatchDownloader, CacheIndex, DownloadProgress, DownloadRequest, Error, Progress, RequestState, Verifier};
use crate::traits::Transport;

impl BatchDownloader {
  /// Requests repeating an earlier request's hash are dropped, they would share
  /// one save path.
  pub fn new(requests: Vec<DownloadRequest>, transport: Arc<dyn Transport>, verifier: Verifier, max_concurrency: usize, max_retries: u32, timeout: Duration, progress: Progress) -> Self {
    let mut hashes = HashSet::new();
    let requests: Vec<DownloadRequest> = requests.into_iter()
      .filter(|request| {
        let first = hashes.insert(request.hash.clone());
        if !first {
          warn!("{} has the same content as an earlier request, downloading it once", request.bundle_name);
        }
        first
      })
      .collect();
    let count = requests.len();
    Self {
      requests,
      states: vec![RequestState::Pending; count],
      attempts: vec![0; count],
      max_concurrency: max_concurrency.max(1),
      max_retries,
      timeout,
      transport,
      verifier,
      progress,
      peak_in_flight: 0,
    }
  }

  pub fn requests(&self) -> &[DownloadRequest] {
    &self.requests
  }

  pub fn request_states(&self) -> &[RequestState] {
    &self.states
  }

  pub fn total_download_count(&self) -> usize {
    self.requests.len()
  }

  pub fn total_download_bytes(&self) -> u64 {
    self.requests.iter().map(|request| request.size).sum()
  }

  pub fn progress(&self) -> &Progress {
    &self.progress
  }

  /// Highest number of simultaneous transfers seen so far
  pub fn peak_in_flight(&self) -> usize {
    self.peak_in_flight
  }

  pub fn has_error(&self) -> bool {
    self.states.iter().any(|state| *state == RequestState::FailedFinal)
  }

  pub fn failed_bundles(&self) -> Vec<&str> {
    self.requests.iter().zip(&self.states)
      .filter(|(_, state)| **state == RequestState::FailedFinal)
      .map(|(request, _)| request.bundle_name.as_str())
      .collect()
  }

  /// Downloads every request that hasn't succeeded yet.
  ///
  /// Verified files are recorded in `cache` as they complete. A request that keeps
  /// failing ends up `FailedFinal` without stopping the others, check `has_error`
  /// afterwards. Only a cache write failure aborts the batch. Dropping the returned
  /// future abandons all transfers in flight.
  pub async fn start(&mut self, cache: &mut CacheIndex, on_progress: &(dyn Fn(&Progress) + Send + Sync)) -> Result<(), Error> {
    let mut queue = VecDeque::new();
    let mut already_done = DownloadProgress {
      files_total: self.requests.len() as u64,
      bytes_total: self.total_download_bytes(),
      ..DownloadProgress::default()
    };
    for (index, state) in self.states.iter_mut().enumerate() {
      if *state == RequestState::Succeeded {
        already_done.files_completed += 1;
        already_done.bytes_completed += self.requests[index].size;
      } else {
        *state = RequestState::Pending;
        self.attempts[index] = 0;
        queue.push_back(index);
      }
    }
    self.progress.reset_downloads(already_done);
    on_progress(&self.progress);

    let mut in_flight = FuturesUnordered::new();
    loop {
      while in_flight.len() < self.max_concurrency {
        let index = match queue.pop_front() {
          Some(index) => index,
          None => break,
        };
        self.states[index] = RequestState::InFlight;
        self.attempts[index] += 1;
        let download = download_bundle(self.transport.clone(), self.verifier.clone(), self.requests[index].clone(), self.timeout);
        in_flight.push(async move { (index, download.await) });
      }
      self.peak_in_flight = self.peak_in_flight.max(in_flight.len());

      let (index, result) = match in_flight.next().await {
        Some(completed) => completed,
        None => break,
      };
      let request = &self.requests[index];
      match result {
        Ok(bytes) => {
          info!("Cache download web file : {} Version : {} Hash : {}", request.bundle_name, request.version, request.hash);
          cache.record_verified(&request.hash)?;
          self.states[index] = RequestState::Succeeded;
          self.progress.increment_downloaded(bytes);
        },
        Err(e) if self.attempts[index] <= self.max_retries => {
          warn!("Downloading {} failed on attempt {}: {}", request.bundle_name, self.attempts[index], e);
          self.states[index] = RequestState::Failed;
          queue.push_back(index);
        },
        Err(e) => {
          error!("Giving up on {} after {} attempts: {}", request.bundle_name, self.attempts[index], e);
          self.states[index] = RequestState::FailedFinal;
          self.progress.increment_failed();
        }
      }
      on_progress(&self.progress);
    }

    if self.has_error() {
      error!("{} bundles failed to download: {:?}", self.failed_bundles().len(), self.failed_bundles());
    }
    Ok(())
  }
}
