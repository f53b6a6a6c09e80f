use std::sync::Arc;

use tracing::{error, info, instrument, warn};

use crate::functions::{human_readable_bytesize, plan_downloads, reconcile_already_present};
use crate::pausable::{PauseHandle, PausableTrait};
use crate::structures::{
  BatchDownloader, BundleLocation, BundleResolution, CacheIndex, DownloadRequest, Error, Manifest, NodeStatus, Operation,
  PatchSettings, PatchState, ProcedureFsm, Progress, Sandbox, ServerEndpoints, Verifier, PATCH_MANIFEST_FILE_NAME,
};
use crate::traits::{Transport, VersionParser};

pub type ProgressCallback = Arc<dyn Fn(&Progress) + Send + Sync>;

/// One update session: the procedure plus every piece of state it works on.
///
/// Built through `PatcherBuilder`. Call `initialize()` once, then `start()` and
/// drive it with `run()` or repeated `update()` calls. The procedure parks after
/// `RequestPatchManifest` and `GetDownloadList` until `advance()` is called, and
/// parks on any failure until `retry_current()` or `revert_to()`.
pub struct Patcher {
  pub(crate) settings: PatchSettings,
  pub(crate) endpoints: ServerEndpoints,
  pub(crate) transport: Arc<dyn Transport>,
  pub(crate) version_parser: Box<dyn VersionParser>,
  pub(crate) verifier: Verifier,
  pub(crate) sandbox: Sandbox,
  pub(crate) cache: CacheIndex,
  pub(crate) builtin_manifest: Manifest,
  pub(crate) active_manifest: Option<Manifest>,
  pub(crate) remote_manifest_fetched: bool,
  pub(crate) version_received: bool,
  pub(crate) procedure: ProcedureFsm,
  pub(crate) download_list: Vec<DownloadRequest>,
  pub(crate) downloader: Option<BatchDownloader>,
  pub(crate) progress: Progress,
  pub(crate) progress_callback: ProgressCallback,
  pub(crate) pause_handle: PauseHandle,
  pub(crate) last_failure: Option<String>,
}

impl Patcher {
  /// Loads the cache and both manifests.
  ///
  /// A cache stamped with another application version is dirty: depending on
  /// `clear_cache_when_dirty` either the whole sandbox or only its manifest file is
  /// removed, then the cache is reset to the current version. The built-in
  /// manifest has to exist.
  #[instrument(skip(self))]
  pub fn initialize(&mut self) -> Result<(), Error> {
    let app_version = self.settings.app_version.clone();
    info!("Initializing sandbox {}", self.sandbox.root().display());
    self.cache = CacheIndex::load(self.sandbox.cache_index_path());
    if !self.cache.exists() {
      info!("No cache found, creating one for app version {}", app_version);
      self.cache.reset(&app_version)?;
    } else if self.cache.owner_app_version() != app_version {
      warn!("Cache belongs to app version {}, current app version is {}", self.cache.owner_app_version(), app_version);
      if self.settings.clear_cache_when_dirty {
        self.sandbox.clear()?;
      } else {
        info!("Deleting sandbox patch manifest");
        self.sandbox.delete_manifest_file()?;
      }
      self.cache.reset(&app_version)?;
    }

    let builtin_path = self.settings.builtin_location.join(PATCH_MANIFEST_FILE_NAME);
    if !builtin_path.exists() {
      error!("No built-in patch manifest at {}", builtin_path.display());
      return Err(Error::Configuration(format!("built-in patch manifest {} is missing", builtin_path.display())));
    }
    self.builtin_manifest = Manifest::load(&builtin_path)?;

    let sandbox_path = self.sandbox.manifest_path();
    let active = if sandbox_path.exists() {
      match Manifest::load(&sandbox_path) {
        Ok(manifest) => manifest,
        Err(e) => {
          warn!("Ignoring sandbox patch manifest: {}", e);
          self.builtin_manifest.clone()
        }
      }
    } else {
      self.builtin_manifest.clone()
    };
    info!("Local resource version is {}", active.resource_version());
    self.active_manifest = Some(active);
    self.remote_manifest_fetched = false;
    Ok(())
  }

  /// Adds every procedure node and enters `RequestGameVersion`.
  pub fn start(&mut self) -> Result<(), Error> {
    if self.active_manifest.is_none() || self.procedure.is_running() {
      let state = if self.active_manifest.is_none() { "NotInitialized" } else { self.procedure.current_name() };
      error!("Can't start the patch procedure in state {}", state);
      return Err(Error::UnsupportedOperation { state: state.to_string(), operation: "Start".to_string() });
    }
    for state in PatchState::ALL {
      self.procedure.add_node(state)?;
    }
    self.procedure.run()
  }

  /// Runs the logic of the current node if it was just entered.
  ///
  /// Node failures park the procedure and are kept in `last_failure`, only a
  /// persistence failure is returned as well.
  pub async fn update(&mut self) -> Result<(), Error> {
    let state = match self.procedure.current() {
      Some(state) if self.procedure.status() == NodeStatus::Entered => state,
      _ => return Ok(()),
    };
    self.progress.set_current_action(state.description())?;
    let result = match state {
      PatchState::RequestGameVersion => self.request_game_version().await,
      PatchState::RequestPatchManifest => self.request_patch_manifest().await,
      PatchState::GetDownloadList => self.get_download_list().await,
      PatchState::DownloadWebFiles => self.download_web_files().await,
      PatchState::DownloadOver => self.download_over(),
      PatchState::Done => {
        info!("Patch procedure done");
        self.procedure.finish();
        Ok(())
      }
    };
    if let Err(e) = result {
      error!("{} failed: {}", state, e);
      self.last_failure = Some(e.to_string());
      self.procedure.fail();
      if let Error::Persistence { .. } = e {
        return Err(e);
      }
    }
    Ok(())
  }

  /// Calls `update()` until the procedure parks, fails or finishes.
  pub async fn run(&mut self) -> Result<NodeStatus, Error> {
    while self.procedure.is_running() && self.procedure.status() == NodeStatus::Entered {
      self.update().await?;
    }
    Ok(self.procedure.status())
  }

  pub fn handle_operation(&mut self, operation: Operation) -> Result<PatchState, Error> {
    let next = self.procedure.handle_operation(operation)?;
    self.last_failure = None;
    if matches!(next, PatchState::RequestGameVersion | PatchState::RequestPatchManifest | PatchState::GetDownloadList) {
      self.downloader = None;
    }
    Ok(next)
  }

  pub fn advance(&mut self) -> Result<PatchState, Error> {
    self.handle_operation(Operation::Advance)
  }

  pub fn retry_current(&mut self) -> Result<PatchState, Error> {
    self.handle_operation(Operation::RetryCurrent)
  }

  pub fn revert_to(&mut self, state: PatchState) -> Result<PatchState, Error> {
    self.handle_operation(Operation::RevertTo(state))
  }

  async fn request_game_version(&mut self) -> Result<(), Error> {
    let url = self.endpoints.web_server.as_str();
    let timeout = self.settings.game_version_request_timeout;
    info!("Requesting game version from {}", url);
    let response = match &self.settings.web_post_content {
      Some(body) => self.transport.post(url, body.clone(), timeout).await?,
      None => self.transport.get(url, timeout).await?,
    };
    let content = String::from_utf8(response)?;
    if !self.version_parser.parse(&content) {
      return Err(Error::VersionParse(format!("{} answered with an unrecognized version response", url)));
    }
    self.version_received = true;
    info!("Game version {}, resource version {}", self.version_parser.game_version(), self.version_parser.resource_version());
    if self.version_parser.found_new_app() {
      info!("New application available at {} (force install: {})", self.version_parser.app_url(), self.version_parser.force_install());
    }
    self.procedure.switch_next();
    Ok(())
  }

  async fn request_patch_manifest(&mut self) -> Result<(), Error> {
    let requested = self.version_parser.resource_version();
    let local = self.local_resource_version();
    if !self.settings.ignore_resource_version && requested == local {
      info!("Resource version {} is up to date", local);
      self.procedure.suspend();
      return Ok(());
    }

    let timeout = self.settings.patch_manifest_request_timeout;
    let url = self.endpoints.bundle_url(requested, PATCH_MANIFEST_FILE_NAME);
    info!("Requesting patch manifest {}", url);
    let document = match self.transport.get(&url, timeout).await {
      Ok(document) => document,
      Err(e) if e.is_network() && !self.endpoints.cdn_fallback_server.is_empty() => {
        let fallback_url = self.endpoints.fallback_bundle_url(requested, PATCH_MANIFEST_FILE_NAME);
        warn!("Requesting {} failed ({}), trying fallback {}", url, e, fallback_url);
        self.transport.get(&fallback_url, timeout).await?
      },
      Err(e) => return Err(e),
    };
    let manifest = Manifest::deserialize(&String::from_utf8(document)?)?;
    info!("Remote patch manifest has {} bundles with resource version {}", manifest.len(), manifest.resource_version());
    self.active_manifest = Some(manifest);
    self.remote_manifest_fetched = true;
    self.procedure.suspend();
    Ok(())
  }

  async fn get_download_list(&mut self) -> Result<(), Error> {
    self.downloader = None;
    self.download_list = self.get_auto_patch_download_list().await?;
    let total: u64 = self.download_list.iter().map(|request| request.size).sum();
    info!("Found {} files to download, total size {}", self.download_list.len(), human_readable_bytesize(total));
    self.procedure.suspend();
    Ok(())
  }

  async fn download_web_files(&mut self) -> Result<(), Error> {
    if self.download_list.is_empty() {
      info!("Nothing to download");
      self.procedure.switch_next();
      return Ok(());
    }
    let mut downloader = match self.downloader.take() {
      Some(downloader) => downloader,
      None => self.create_downloader(self.download_list.clone()),
    };
    let callback = self.progress_callback.clone();
    let result = Box::pin(downloader.start(&mut self.cache, &*callback)).pausable(self.pause_handle.clone()).await;
    let failed = downloader.failed_bundles().join(", ");
    let has_error = downloader.has_error();
    self.downloader = Some(downloader);
    result?;
    if has_error {
      return Err(Error::OutOfRetries(format!("couldn't download {}", failed)));
    }
    self.procedure.switch_next();
    Ok(())
  }

  fn download_over(&mut self) -> Result<(), Error> {
    if self.remote_manifest_fetched {
      if let Some(manifest) = &self.active_manifest {
        info!("Saving remote patch manifest");
        manifest.save(&self.sandbox.manifest_path())?;
      }
      self.remote_manifest_fetched = false;
    }
    let removed = self.sandbox.remove_partial_files()?;
    if removed > 0 {
      info!("Removed {} partial downloads", removed);
    }
    self.downloader = None;
    self.download_list.clear();
    self.procedure.switch_next();
    Ok(())
  }

  /// Plans the downloads for the given tags against the active manifest.
  ///
  /// Files already on disk that verify are recorded in the cache and left out.
  pub async fn get_patch_download_list<S: AsRef<str>>(&mut self, tags: &[S]) -> Result<Vec<DownloadRequest>, Error> {
    let active = match &self.active_manifest {
      Some(active) => active,
      None => return Ok(Vec::new()),
    };
    let planned = plan_downloads(active, &self.builtin_manifest, &self.cache, tags, &self.sandbox, &self.endpoints);
    reconcile_already_present(planned, &self.verifier, &mut self.cache).await
  }

  /// `get_patch_download_list` with the configured auto-download tags.
  pub async fn get_auto_patch_download_list(&mut self) -> Result<Vec<DownloadRequest>, Error> {
    let mut tags = self.settings.auto_download_tags.clone();
    if self.settings.auto_download_builtin_tags {
      tags.extend(self.builtin_manifest.builtin_tags());
    }
    self.get_patch_download_list(&tags).await
  }

  pub fn create_downloader(&self, requests: Vec<DownloadRequest>) -> BatchDownloader {
    BatchDownloader::new(
      requests,
      self.transport.clone(),
      self.verifier.clone(),
      self.settings.max_concurrent_downloads,
      self.settings.max_retries,
      self.settings.download_timeout,
      self.progress.clone(),
    )
  }

  /// Runs a downloader made by `create_downloader` outside of the procedure.
  pub async fn run_downloader(&mut self, downloader: &mut BatchDownloader) -> Result<(), Error> {
    let callback = self.progress_callback.clone();
    Box::pin(downloader.start(&mut self.cache, &*callback)).pausable(self.pause_handle.clone()).await
  }

  /// Finds the file to load for `bundle_name`: built-in and unchanged, cached, or remote.
  pub fn resolve(&self, bundle_name: &str) -> BundleResolution {
    let bundle = match self.active_manifest.as_ref().and_then(|manifest| manifest.lookup(bundle_name)) {
      Some(bundle) => bundle,
      None => {
        warn!("Bundle {} is not in the patch manifest", bundle_name);
        return BundleResolution::unresolved(bundle_name);
      }
    };
    let builtin = self.builtin_manifest.lookup(bundle_name).filter(|builtin| builtin.is_builtin && builtin.hash == bundle.hash);
    let (location, version) = if let Some(builtin) = builtin {
      (BundleLocation::Builtin(self.settings.builtin_location.join(&builtin.hash)), builtin.version)
    } else if self.cache.contains(&bundle.hash) {
      (BundleLocation::Cached(self.sandbox.cache_file_path(&bundle.hash)), bundle.version)
    } else {
      (BundleLocation::Remote {
        url: self.endpoints.bundle_url(bundle.version, &bundle.hash),
        fallback_url: self.endpoints.fallback_bundle_url(bundle.version, &bundle.hash),
        save_path: self.sandbox.cache_file_path(&bundle.hash),
      }, bundle.version)
    };
    BundleResolution {
      bundle_name: bundle_name.to_string(),
      location,
      version,
      is_encrypted: bundle.is_encrypted,
      is_raw_file: bundle.is_raw_file,
    }
  }

  /// Verifies the sandbox copy of `bundle_name` against the active manifest.
  pub fn check_content_integrity(&self, bundle_name: &str) -> bool {
    match self.active_manifest.as_ref().and_then(|manifest| manifest.lookup(bundle_name)) {
      Some(bundle) => self.verifier.verify(&self.sandbox.cache_file_path(&bundle.hash), bundle.size, &bundle.crc),
      None => {
        warn!("Bundle {} is not in the patch manifest, can't check it", bundle_name);
        false
      }
    }
  }

  /// Records the sandbox copy of `bundle_name` as verified.
  pub fn cache_download_patch_file(&mut self, bundle_name: &str) -> Result<(), Error> {
    match self.active_manifest.as_ref().and_then(|manifest| manifest.lookup(bundle_name)) {
      Some(bundle) => {
        info!("Cache download web file : {} Version : {} Hash : {}", bundle.name, bundle.version, bundle.hash);
        self.cache.record_verified(&bundle.hash)
      },
      None => {
        warn!("Bundle {} is not in the patch manifest, not caching it", bundle_name);
        Ok(())
      }
    }
  }

  /// Resource version of the active manifest, -1 before `initialize()`.
  pub fn local_resource_version(&self) -> i32 {
    self.active_manifest.as_ref().map_or(-1, |manifest| manifest.resource_version())
  }

  pub fn requested_game_version(&self) -> Option<&str> {
    self.version_received.then(|| self.version_parser.game_version())
  }

  pub fn requested_resource_version(&self) -> Option<i32> {
    self.version_received.then(|| self.version_parser.resource_version())
  }

  pub fn found_new_app(&self) -> bool {
    self.version_received && self.version_parser.found_new_app()
  }

  pub fn force_install(&self) -> bool {
    self.version_received && self.version_parser.force_install()
  }

  pub fn app_url(&self) -> &str {
    if self.version_received { self.version_parser.app_url() } else { "" }
  }

  pub fn current_state(&self) -> Option<PatchState> {
    self.procedure.current()
  }

  pub fn current_state_name(&self) -> &'static str {
    self.procedure.current_name()
  }

  pub fn node_status(&self) -> NodeStatus {
    self.procedure.status()
  }

  pub fn last_failure(&self) -> Option<&str> {
    self.last_failure.as_deref()
  }

  pub fn active_manifest(&self) -> Option<&Manifest> {
    self.active_manifest.as_ref()
  }

  pub fn builtin_manifest(&self) -> &Manifest {
    &self.builtin_manifest
  }

  pub fn cache(&self) -> &CacheIndex {
    &self.cache
  }

  pub fn sandbox(&self) -> &Sandbox {
    &self.sandbox
  }

  pub fn download_list(&self) -> &[DownloadRequest] {
    &self.download_list
  }

  pub fn download_size(&self) -> u64 {
    self.download_list.iter().map(|request| request.size).sum()
  }

  pub fn downloader(&self) -> Option<&BatchDownloader> {
    self.downloader.as_ref()
  }

  pub fn progress(&self) -> &Progress {
    &self.progress
  }

  pub fn pause_handle(&self) -> PauseHandle {
    self.pause_handle.clone()
  }

  pub fn pause(&self) {
    self.pause_handle.pause();
  }

  pub fn resume(&self) {
    self.pause_handle.resume();
  }
}
