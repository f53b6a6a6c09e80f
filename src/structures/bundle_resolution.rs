use std::path::PathBuf;

/// Where the bytes of a bundle come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BundleLocation {
  /// Shipped with the application and unchanged
  Builtin(PathBuf),
  /// Downloaded and verified earlier
  Cached(PathBuf),
  /// Has to be downloaded to `save_path` first
  Remote { url: String, fallback_url: String, save_path: PathBuf },
  /// The active manifest doesn't know the bundle
  Unresolved,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleResolution {
  pub bundle_name: String,
  pub location: BundleLocation,
  pub version: i32,
  pub is_encrypted: bool,
  pub is_raw_file: bool,
}
