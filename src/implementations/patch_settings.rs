use std::path::PathBuf;
use std::time::Duration;

use crate::structures::{PatchSettings, VerifyLevel};

impl Default for PatchSettings {
  fn default() -> Self {
    Self {
      app_version: env!("CARGO_PKG_VERSION").to_string(),
      builtin_location: PathBuf::new(),
      sandbox_location: PathBuf::new(),
      platform: std::env::consts::OS.to_string(),
      server_info: None,
      web_post_content: None,
      ignore_resource_version: false,
      clear_cache_when_dirty: false,
      verify_level: VerifyLevel::Checksum,
      auto_download_tags: Vec::new(),
      auto_download_builtin_tags: false,
      game_version_request_timeout: Duration::from_secs(10),
      patch_manifest_request_timeout: Duration::from_secs(30),
      download_timeout: Duration::from_secs(60),
      max_concurrent_downloads: 5,
      max_retries: 3,
    }
  }
}
