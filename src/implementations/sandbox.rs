use std::path::{Path, PathBuf};

use tracing::warn;

use crate::structures::{Error, Sandbox, CACHE_FILE_NAME, CACHE_FOLDER_NAME, PART_EXTENSION, PATCH_MANIFEST_FILE_NAME};

impl Sandbox {
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self {
      root: root.into(),
    }
  }

  pub fn root(&self) -> &Path {
    &self.root
  }

  pub fn cache_index_path(&self) -> PathBuf {
    self.root.join(CACHE_FILE_NAME)
  }

  pub fn manifest_path(&self) -> PathBuf {
    self.root.join(PATCH_MANIFEST_FILE_NAME)
  }

  pub fn cache_folder(&self) -> PathBuf {
    self.root.join(CACHE_FOLDER_NAME)
  }

  pub fn cache_file_path(&self, hash: &str) -> PathBuf {
    self.cache_folder().join(hash)
  }

  /// Removes the whole sandbox directory, cache files included.
  pub fn clear(&self) -> Result<(), Error> {
    warn!("Clearing sandbox {}", self.root.display());
    match std::fs::remove_dir_all(&self.root) {
      Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(Error::persistence(&self.root, e)),
      _ => Ok(()),
    }
  }

  /// Removes only the persisted patch manifest.
  pub fn delete_manifest_file(&self) -> Result<(), Error> {
    let path = self.manifest_path();
    match std::fs::remove_file(&path) {
      Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(Error::persistence(path, e)),
      _ => Ok(()),
    }
  }

  /// Deletes `.part` leftovers of interrupted downloads, returns how many were removed.
  pub fn remove_partial_files(&self) -> Result<usize, Error> {
    let entries = match std::fs::read_dir(self.cache_folder()) {
      Ok(entries) => entries,
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
      Err(e) => return Err(e.into()),
    };
    let mut removed = 0;
    for entry in entries {
      let path = entry?.path();
      if path.extension().map_or(false, |extension| extension == PART_EXTENSION) {
        std::fs::remove_file(&path)?;
        removed += 1;
      }
    }
    Ok(removed)
  }
}
