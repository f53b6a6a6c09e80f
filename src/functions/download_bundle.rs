use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::{instrument, warn};

use crate::structures::{DownloadRequest, Error, Verifier, PART_EXTENSION};
use crate::traits::Transport;

/// Fetches one bundle into its sandbox location and verifies it.
///
/// The bytes go to a `.part` file first, so the final path only ever holds a
/// complete transfer. A file that fails verification is removed again.
#[instrument(skip(transport, verifier, request), fields(bundle = %request.bundle_name))]
pub(crate) async fn download_bundle(transport: Arc<dyn Transport>, verifier: Verifier, request: DownloadRequest, timeout: Duration) -> Result<u64, Error> {
  let bytes = match transport.get(&request.url, timeout).await {
    Ok(bytes) => bytes,
    Err(e) if e.is_network() && !request.fallback_url.is_empty() => {
      warn!("Downloading {} failed ({}), trying fallback {}", request.url, e, request.fallback_url);
      transport.get(&request.fallback_url, timeout).await?
    },
    Err(e) => return Err(e),
  };

  let mut part_path = request.save_path.clone().into_os_string();
  part_path.push(format!(".{}", PART_EXTENSION));
  let part_path = PathBuf::from(part_path);
  if let Some(parent) = request.save_path.parent() {
    tokio::fs::create_dir_all(parent).await?;
  }
  tokio::fs::write(&part_path, &bytes).await?;
  tokio::fs::rename(&part_path, &request.save_path).await?;

  let save_path = request.save_path.clone();
  let size = request.size;
  let checksum = request.checksum.clone();
  let verified = tokio::task::spawn_blocking(move || verifier.verify(&save_path, size, &checksum)).await?;
  if !verified {
    warn!("{} failed verification, removing it", request.save_path.display());
    let _ = tokio::fs::remove_file(&request.save_path).await;
    return Err(Error::IntegrityMismatch(request.hash));
  }
  Ok(bytes.len() as u64)
}
