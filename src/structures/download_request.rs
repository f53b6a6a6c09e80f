use std::path::PathBuf;

/// A bundle that has to be fetched from the content servers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
  pub bundle_name: String,
  pub hash: String,
  pub size: u64,
  pub checksum: String,
  pub version: i32,
  pub url: String,
  pub fallback_url: String,
  /// Where the verified file ends up inside the sandbox
  pub save_path: PathBuf,
}
