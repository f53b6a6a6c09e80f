use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;

use crate::structures::Error;

/// Computes the whole-file checksum that manifests carry in `crc`.
pub trait ChecksumProvider: Send + Sync {
  fn checksum(&self, path: &Path) -> Result<String, Error>;
}

pub trait FileSizeProvider: Send + Sync {
  fn file_size(&self, path: &Path) -> Result<u64, Error>;
}

/// Fetches raw bytes from a server.
#[async_trait]
pub trait Transport: Send + Sync {
  async fn get(&self, url: &str, timeout: Duration) -> Result<Vec<u8>, Error>;

  async fn post(&self, url: &str, body: String, timeout: Duration) -> Result<Vec<u8>, Error>;
}

/// Interprets the response of the version endpoint.
///
/// `parse` is called once per version request, the accessors are read afterwards.
pub trait VersionParser: Send + Sync {
  fn parse(&mut self, content: &str) -> bool;
  fn game_version(&self) -> &str;
  fn resource_version(&self) -> i32;
  fn found_new_app(&self) -> bool;
  fn force_install(&self) -> bool;
  fn app_url(&self) -> &str;
}
