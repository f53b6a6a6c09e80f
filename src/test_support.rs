use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::functions::get_buffer_hash;
use crate::structures::{BundleDescriptor, Error};
use crate::traits::Transport;

/// In-memory `Transport` with scripted failures
#[derive(Default)]
pub(crate) struct MockTransport {
  files: Mutex<HashMap<String, Vec<u8>>>,
  failures: Mutex<HashMap<String, usize>>,
  corruptions: Mutex<HashMap<String, usize>>,
  delays: Mutex<HashMap<String, Duration>>,
  requested: Mutex<Vec<String>>,
  posted: Mutex<Vec<(String, String)>>,
  in_flight: AtomicUsize,
  peak: AtomicUsize,
}

impl MockTransport {
  pub(crate) fn new() -> Self {
    Self::default()
  }

  pub(crate) fn serve(&self, url: &str, bytes: &[u8]) {
    self.files.lock().unwrap().insert(url.to_string(), bytes.to_vec());
  }

  /// The next `times` requests of `url` fail with a network error
  pub(crate) fn fail(&self, url: &str, times: usize) {
    self.failures.lock().unwrap().insert(url.to_string(), times);
  }

  /// The next `times` requests of `url` answer with damaged bytes
  pub(crate) fn corrupt(&self, url: &str, times: usize) {
    self.corruptions.lock().unwrap().insert(url.to_string(), times);
  }

  pub(crate) fn delay(&self, url: &str, delay: Duration) {
    self.delays.lock().unwrap().insert(url.to_string(), delay);
  }

  pub(crate) fn times_requested(&self, url: &str) -> usize {
    self.requested.lock().unwrap().iter().filter(|requested| *requested == url).count()
  }

  pub(crate) fn total_requests(&self) -> usize {
    self.requested.lock().unwrap().len()
  }

  pub(crate) fn posted(&self) -> Vec<(String, String)> {
    self.posted.lock().unwrap().clone()
  }

  pub(crate) fn peak_in_flight(&self) -> usize {
    self.peak.load(Ordering::SeqCst)
  }

  fn respond(&self, url: &str) -> Result<Vec<u8>, Error> {
    self.requested.lock().unwrap().push(url.to_string());
    if let Some(remaining) = self.failures.lock().unwrap().get_mut(url) {
      if *remaining > 0 {
        *remaining -= 1;
        return Err(Error::Network(format!("connection reset while fetching {}", url)));
      }
    }
    let mut bytes = self.files.lock().unwrap().get(url).cloned().ok_or_else(|| Error::InvalidStatus(url.to_string(), 404))?;
    if let Some(remaining) = self.corruptions.lock().unwrap().get_mut(url) {
      if *remaining > 0 {
        *remaining -= 1;
        if let Some(first) = bytes.first_mut() {
          *first ^= 0xFF;
        }
      }
    }
    Ok(bytes)
  }

  async fn fetch(&self, url: &str) -> Result<Vec<u8>, Error> {
    let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
    self.peak.fetch_max(now, Ordering::SeqCst);
    let delay = self.delays.lock().unwrap().get(url).copied();
    if let Some(delay) = delay {
      tokio::time::sleep(delay).await;
    } else {
      tokio::task::yield_now().await;
    }
    let result = self.respond(url);
    self.in_flight.fetch_sub(1, Ordering::SeqCst);
    result
  }
}

#[async_trait]
impl Transport for MockTransport {
  async fn get(&self, url: &str, _timeout: Duration) -> Result<Vec<u8>, Error> {
    self.fetch(url).await
  }

  async fn post(&self, url: &str, body: String, _timeout: Duration) -> Result<Vec<u8>, Error> {
    self.posted.lock().unwrap().push((url.to_string(), body));
    self.fetch(url).await
  }
}

/// A descriptor whose hash and checksum are derived from `content`
pub(crate) fn published(name: &str, content: &[u8], version: i32, is_builtin: bool, tags: &[&str]) -> BundleDescriptor {
  let hash = get_buffer_hash(content);
  BundleDescriptor {
    name: name.to_string(),
    crc: hash.clone(),
    hash,
    size: content.len() as u64,
    version,
    is_builtin,
    is_encrypted: false,
    is_raw_file: false,
    tags: tags.iter().map(|tag| tag.to_string()).collect(),
  }
}
