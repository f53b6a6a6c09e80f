use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use json::JsonValue;
use tracing::{debug, instrument};

use crate::functions::write_atomically;
use crate::structures::{BundleDescriptor, Error, Manifest};

impl Manifest {
  /// Builds a manifest, failing on duplicate bundle names.
  pub fn new(resource_version: i32, bundles: Vec<BundleDescriptor>) -> Result<Self, Error> {
    let mut lookup = HashMap::with_capacity(bundles.len());
    for (index, bundle) in bundles.iter().enumerate() {
      if lookup.insert(bundle.name.clone(), index).is_some() {
        return Err(Error::DuplicateBundle(bundle.name.clone()));
      }
    }
    Ok(Self {
      resource_version,
      bundles,
      lookup,
    })
  }

  pub fn deserialize(document: &str) -> Result<Self, Error> {
    let parsed = json::parse(document).map_err(|e| Error::ManifestParse(e.to_string()))?;
    let resource_version = parsed["resource_version"].as_i32().ok_or_else(|| Error::ManifestParse("missing \"resource_version\"".to_string()))?;
    if !parsed["bundles"].is_array() {
      return Err(Error::ManifestParse("\"bundles\" is not an array".to_string()));
    }
    let bundles = parsed["bundles"].members().map(BundleDescriptor::from_json).collect::<Result<Vec<_>, Error>>()?;
    Self::new(resource_version, bundles)
  }

  pub fn serialize(&self) -> String {
    let mut document = JsonValue::new_object();
    document["resource_version"] = self.resource_version.into();
    document["bundles"] = JsonValue::Array(self.bundles.iter().map(BundleDescriptor::to_json).collect());
    document.pretty(2)
  }

  #[instrument]
  pub fn load(path: &Path) -> Result<Self, Error> {
    let document = std::fs::read_to_string(path)?;
    let manifest = Self::deserialize(&document)?;
    debug!("Loaded {} bundles with resource version {}", manifest.bundles.len(), manifest.resource_version);
    Ok(manifest)
  }

  /// Overwrites the manifest file at `path` as a whole.
  pub fn save(&self, path: &Path) -> Result<(), Error> {
    write_atomically(path, self.serialize().as_bytes())
  }

  pub fn resource_version(&self) -> i32 {
    self.resource_version
  }

  pub fn bundles(&self) -> &[BundleDescriptor] {
    &self.bundles
  }

  pub fn len(&self) -> usize {
    self.bundles.len()
  }

  pub fn is_empty(&self) -> bool {
    self.bundles.is_empty()
  }

  pub fn lookup(&self, name: &str) -> Option<&BundleDescriptor> {
    self.lookup.get(name).map(|index| &self.bundles[*index])
  }

  /// All bundles carrying at least one of `tags`.
  pub fn tagged<S: AsRef<str>>(&self, tags: &[S]) -> Vec<&BundleDescriptor> {
    self.bundles.iter().filter(|bundle| bundle.has_tag(tags)).collect()
  }

  /// Union of the tags on built-in bundles, sorted.
  pub fn builtin_tags(&self) -> Vec<String> {
    self.bundles.iter()
      .filter(|bundle| bundle.is_builtin)
      .flat_map(|bundle| bundle.tags.iter().cloned())
      .collect::<BTreeSet<String>>()
      .into_iter()
      .collect()
  }
}
