use std::path::PathBuf;

pub(crate) const CACHE_FILE_NAME: &str = "cache.json";
pub(crate) const CACHE_FOLDER_NAME: &str = "cache_files";
pub const PATCH_MANIFEST_FILE_NAME: &str = "patch_manifest.json";
pub(crate) const PART_EXTENSION: &str = "part";

/// Application-private writable directory holding the cache
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sandbox {
  pub(crate) root: PathBuf,
}
