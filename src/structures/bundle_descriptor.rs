/// One bundle entry of a patch manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleDescriptor {
  /// Unique name of the bundle within a manifest
  pub name: String,
  /// Content hash, used as the cache key and as the remote file name
  pub hash: String,
  /// Whole-file checksum, compared at `VerifyLevel::Checksum`
  pub crc: String,
  /// Size of the bundle in bytes
  pub size: u64,
  /// Resource version the bundle was published with
  pub version: i32,
  /// Shipped inside the application package
  pub is_builtin: bool,
  pub is_encrypted: bool,
  /// Raw file rather than an archive
  pub is_raw_file: bool,
  /// Classification tags, e.g. the DLC groups this bundle belongs to
  pub tags: Vec<String>,
}
