use std::path::Path;

use crate::structures::{BundleLocation, BundleResolution};

impl BundleResolution {
  pub(crate) fn unresolved(bundle_name: &str) -> Self {
    Self {
      bundle_name: bundle_name.to_owned(),
      location: BundleLocation::Unresolved,
      version: 0,
      is_encrypted: false,
      is_raw_file: false,
    }
  }

  /// Path the bundle can be loaded from right now, if any
  pub fn local_path(&self) -> Option<&Path> {
    match &self.location {
      BundleLocation::Builtin(path) | BundleLocation::Cached(path) => Some(path.as_path()),
      _ => None,
    }
  }

  pub fn remote_urls(&self) -> Option<(&str, &str)> {
    match &self.location {
      BundleLocation::Remote { url, fallback_url, .. } => Some((url.as_str(), fallback_url.as_str())),
      _ => None,
    }
  }

  pub fn is_resolved(&self) -> bool {
    self.location != BundleLocation::Unresolved
  }
}
