use std::collections::HashMap;

use crate::structures::BundleDescriptor;

/// Ordered list of bundles published together under one resource version.
///
/// The name lookup is derived from the bundle list whenever a manifest is built,
/// so the fields stay private.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
  pub(crate) resource_version: i32,
  pub(crate) bundles: Vec<BundleDescriptor>,
  pub(crate) lookup: HashMap<String, usize>,
}
