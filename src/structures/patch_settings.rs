use std::path::PathBuf;
use std::time::Duration;

use crate::structures::{RemoteServerInfo, VerifyLevel};

/// Everything a `Patcher` is configured with
#[derive(Debug, Clone)]
pub struct PatchSettings {
  /// Version of the running application, owner of the cache
  pub app_version: String,
  /// Directory with the shipped manifest and bundles
  pub builtin_location: PathBuf,
  /// Writable directory for the cache and the downloaded manifest
  pub sandbox_location: PathBuf,
  pub platform: String,
  pub server_info: Option<RemoteServerInfo>,
  /// Sent as the body of the version request, which is a GET when absent
  pub web_post_content: Option<String>,
  /// Fetch the remote manifest even when the resource version didn't change
  pub ignore_resource_version: bool,
  /// Wipe the sandbox instead of only its manifest when the app version changed
  pub clear_cache_when_dirty: bool,
  pub verify_level: VerifyLevel,
  pub auto_download_tags: Vec<String>,
  pub auto_download_builtin_tags: bool,
  pub game_version_request_timeout: Duration,
  pub patch_manifest_request_timeout: Duration,
  pub download_timeout: Duration,
  pub max_concurrent_downloads: usize,
  /// Extra attempts per file after the first one failed
  pub max_retries: u32,
}
