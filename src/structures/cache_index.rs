use std::collections::HashSet;
use std::path::PathBuf;

/// Durable record of content hashes that are downloaded and verified.
#[derive(Debug)]
pub struct CacheIndex {
  pub(crate) path: PathBuf,
  pub(crate) app_version: String,
  pub(crate) hashes: HashSet<String>,
  pub(crate) exists: bool,
}
