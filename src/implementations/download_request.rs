use crate::structures::{BundleDescriptor, DownloadRequest, Sandbox, ServerEndpoints};

impl DownloadRequest {
  pub fn new(bundle: &BundleDescriptor, sandbox: &Sandbox, endpoints: &ServerEndpoints) -> Self {
    Self {
      bundle_name: bundle.name.clone(),
      hash: bundle.hash.clone(),
      size: bundle.size,
      checksum: bundle.crc.clone(),
      version: bundle.version,
      url: endpoints.bundle_url(bundle.version, &bundle.hash),
      fallback_url: endpoints.fallback_bundle_url(bundle.version, &bundle.hash),
      save_path: sandbox.cache_file_path(&bundle.hash),
    }
  }
}
