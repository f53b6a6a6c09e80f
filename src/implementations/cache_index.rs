use std::collections::HashSet;
use std::path::{Path, PathBuf};

use json::JsonValue;
use tracing::{info, warn};

use crate::functions::write_atomically;
use crate::structures::{CacheIndex, Error};

impl CacheIndex {
  /// Loads the index stored at `path`.
  ///
  /// A missing file means there is no cache yet. A file that can't be parsed is
  /// treated the same way, the content it described is picked up again by verification.
  pub fn load(path: impl Into<PathBuf>) -> Self {
    let path = path.into();
    let document = match std::fs::read_to_string(&path) {
      Ok(document) => document,
      Err(e) => {
        if e.kind() != std::io::ErrorKind::NotFound {
          warn!("Couldn't read cache index {}: {}", path.display(), e);
        }
        return Self::empty(path);
      }
    };
    match parse_document(&document) {
      Ok((app_version, hashes)) => {
        info!("Loaded cache index with {} entries, owned by app version {}", hashes.len(), app_version);
        Self {
          path,
          app_version,
          hashes,
          exists: true,
        }
      },
      Err(e) => {
        warn!("Ignoring malformed cache index {}: {}", path.display(), e);
        Self::empty(path)
      }
    }
  }

  fn empty(path: PathBuf) -> Self {
    Self {
      path,
      app_version: String::new(),
      hashes: HashSet::new(),
      exists: false,
    }
  }

  /// Whether an index file was found on disk when this index was loaded or has been written since.
  pub fn exists(&self) -> bool {
    self.exists
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  pub fn owner_app_version(&self) -> &str {
    &self.app_version
  }

  pub fn len(&self) -> usize {
    self.hashes.len()
  }

  pub fn is_empty(&self) -> bool {
    self.hashes.is_empty()
  }

  pub fn contains(&self, hash: &str) -> bool {
    self.hashes.contains(hash)
  }

  pub fn record_verified(&mut self, hash: &str) -> Result<(), Error> {
    if self.hashes.contains(hash) {
      return Ok(());
    }
    self.hashes.insert(hash.to_owned());
    self.persist_or_forget(&[hash])
  }

  /// Records several hashes with a single write.
  pub fn record_verified_many<S: AsRef<str>>(&mut self, hashes: &[S]) -> Result<(), Error> {
    let added: Vec<&str> = hashes.iter()
      .map(|hash| hash.as_ref())
      .filter(|hash| self.hashes.insert(hash.to_string()))
      .collect();
    if added.is_empty() {
      return Ok(());
    }
    self.persist_or_forget(&added)
  }

  /// Drops every entry and stamps the index with `app_version`.
  pub fn reset(&mut self, app_version: &str) -> Result<(), Error> {
    info!("Resetting cache index for app version {}", app_version);
    self.hashes.clear();
    self.app_version = app_version.to_owned();
    self.persist()
  }

  fn persist_or_forget(&mut self, added: &[&str]) -> Result<(), Error> {
    if let Err(e) = self.persist() {
      // keep memory in line with what is on disk
      for hash in added {
        self.hashes.remove(*hash);
      }
      return Err(e);
    }
    Ok(())
  }

  fn persist(&mut self) -> Result<(), Error> {
    let mut hashes: Vec<&String> = self.hashes.iter().collect();
    hashes.sort();
    let mut document = JsonValue::new_object();
    document["app_version"] = self.app_version.as_str().into();
    document["hashes"] = JsonValue::Array(hashes.into_iter().map(|hash| hash.as_str().into()).collect());
    write_atomically(&self.path, document.dump().as_bytes())?;
    self.exists = true;
    Ok(())
  }
}

fn parse_document(document: &str) -> Result<(String, HashSet<String>), Error> {
  let parsed = json::parse(document)?;
  let app_version = parsed["app_version"].as_str().ok_or_else(|| Error::ManifestParse("cache index has no \"app_version\"".to_string()))?.to_owned();
  let hashes = parsed["hashes"].members().filter_map(|hash| hash.as_str().map(str::to_owned)).collect();
  Ok((app_version, hashes))
}
