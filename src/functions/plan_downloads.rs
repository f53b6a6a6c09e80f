use std::collections::HashSet;

use tracing::{debug, info, trace};

use crate::structures::{CacheIndex, DownloadRequest, Error, Manifest, Sandbox, ServerEndpoints, Verifier};

/// Works out which bundles of `active` have to be downloaded.
///
/// Bundles already in the cache, and built-in bundles whose content didn't change,
/// are skipped. Untagged bundles are always taken, tagged ones only when they carry
/// one of `tag_filter`. Names sharing a hash share one download. The result keeps
/// manifest order.
pub fn plan_downloads<S: AsRef<str>>(active: &Manifest, builtin: &Manifest, cache: &CacheIndex, tag_filter: &[S], sandbox: &Sandbox, endpoints: &ServerEndpoints) -> Vec<DownloadRequest> {
  let mut requests = Vec::new();
  let mut planned = HashSet::new();
  for bundle in active.bundles() {
    if cache.contains(&bundle.hash) {
      trace!("{} is cached", bundle.name);
      continue;
    }

    if let Some(shipped) = builtin.lookup(&bundle.name) {
      if shipped.is_builtin && shipped.hash == bundle.hash {
        trace!("{} is shipped with the application", bundle.name);
        continue;
      }
    }

    if !(bundle.is_pure_builtin() || bundle.has_tag(tag_filter)) {
      continue;
    }
    if !planned.insert(bundle.hash.as_str()) {
      trace!("{} shares its content with a bundle already planned", bundle.name);
      continue;
    }
    requests.push(DownloadRequest::new(bundle, sandbox, endpoints));
  }
  debug!("Planned {} of {} bundles for download", requests.len(), active.len());
  requests
}

/// Drops requests whose file is already on disk and valid, recording them in the cache.
///
/// Picks up downloads that finished before the cache index was written, e.g. when the
/// application was killed mid-run. Files are verified on the blocking pool, the
/// cache is written by the caller's task.
pub async fn reconcile_already_present(requests: Vec<DownloadRequest>, verifier: &Verifier, cache: &mut CacheIndex) -> Result<Vec<DownloadRequest>, Error> {
  if requests.is_empty() {
    return Ok(requests);
  }
  let verifier = verifier.clone();
  let (present, missing) = tokio::task::spawn_blocking(move || {
    let split: (Vec<DownloadRequest>, Vec<DownloadRequest>) = requests.into_iter()
      .partition(|request| verifier.verify(&request.save_path, request.size, &request.checksum));
    split
  }).await?;

  if !present.is_empty() {
    for request in &present {
      info!("Cache download web file : {} Version : {} Hash : {}", request.bundle_name, request.version, request.hash);
    }
    let hashes: Vec<&str> = present.iter().map(|request| request.hash.as_str()).collect();
    cache.record_verified_many(&hashes)?;
  }
  Ok(missing)
}
