use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::pausable::PauseHandle;
use crate::patcher::{Patcher, ProgressCallback};
use crate::structures::{
  CacheIndex, Error, FsFileSize, HttpTransport, Manifest, PatchSettings, ProcedureFsm, Progress, RemoteServerInfo, Sandbox,
  Sha256Checksum, Verifier, VerifyLevel, VersionInformation,
};
use crate::traits::{ChecksumProvider, FileSizeProvider, Transport, VersionParser};

pub struct PatcherBuilder {
  pub(crate) settings: PatchSettings,
  pub(crate) transport: Option<Arc<dyn Transport>>,
  pub(crate) version_parser: Option<Box<dyn VersionParser>>,
  pub(crate) checksum: Arc<dyn ChecksumProvider>,
  pub(crate) file_size: Arc<dyn FileSizeProvider>,
  pub(crate) progress_callback: Option<ProgressCallback>,
}

impl PatcherBuilder {
  pub fn new() -> Self {
    Self {
      settings: PatchSettings::default(),
      transport: None,
      version_parser: None,
      checksum: Arc::new(Sha256Checksum),
      file_size: Arc::new(FsFileSize),
      progress_callback: None,
    }
  }

  pub fn from_settings(settings: PatchSettings) -> Self {
    let mut builder = Self::new();
    builder.settings = settings;
    builder
  }

  pub fn set_app_version(&mut self, app_version: &str) -> &mut Self {
    self.settings.app_version = app_version.to_string();
    self
  }

  pub fn set_builtin_location(&mut self, builtin_location: impl Into<PathBuf>) -> &mut Self {
    self.settings.builtin_location = builtin_location.into();
    self
  }

  pub fn set_sandbox_location(&mut self, sandbox_location: impl Into<PathBuf>) -> &mut Self {
    self.settings.sandbox_location = sandbox_location.into();
    self
  }

  pub fn set_platform(&mut self, platform: &str) -> &mut Self {
    self.settings.platform = platform.to_string();
    self
  }

  pub fn set_server_info(&mut self, server_info: RemoteServerInfo) -> &mut Self {
    self.settings.server_info = Some(server_info);
    self
  }

  pub fn set_web_post_content(&mut self, web_post_content: &str) -> &mut Self {
    self.settings.web_post_content = Some(web_post_content.to_string());
    self
  }

  pub fn set_ignore_resource_version(&mut self, ignore_resource_version: bool) -> &mut Self {
    self.settings.ignore_resource_version = ignore_resource_version;
    self
  }

  pub fn set_clear_cache_when_dirty(&mut self, clear_cache_when_dirty: bool) -> &mut Self {
    self.settings.clear_cache_when_dirty = clear_cache_when_dirty;
    self
  }

  pub fn set_verify_level(&mut self, verify_level: VerifyLevel) -> &mut Self {
    self.settings.verify_level = verify_level;
    self
  }

  pub fn set_auto_download_tags(&mut self, tags: &[&str]) -> &mut Self {
    self.settings.auto_download_tags = tags.iter().map(|tag| tag.to_string()).collect();
    self
  }

  pub fn set_auto_download_builtin_tags(&mut self, auto_download_builtin_tags: bool) -> &mut Self {
    self.settings.auto_download_builtin_tags = auto_download_builtin_tags;
    self
  }

  pub fn set_game_version_request_timeout(&mut self, timeout: Duration) -> &mut Self {
    self.settings.game_version_request_timeout = timeout;
    self
  }

  pub fn set_patch_manifest_request_timeout(&mut self, timeout: Duration) -> &mut Self {
    self.settings.patch_manifest_request_timeout = timeout;
    self
  }

  pub fn set_download_timeout(&mut self, timeout: Duration) -> &mut Self {
    self.settings.download_timeout = timeout;
    self
  }

  pub fn set_max_concurrent_downloads(&mut self, max_concurrent_downloads: usize) -> &mut Self {
    self.settings.max_concurrent_downloads = max_concurrent_downloads;
    self
  }

  pub fn set_max_retries(&mut self, max_retries: u32) -> &mut Self {
    self.settings.max_retries = max_retries;
    self
  }

  pub fn set_transport(&mut self, transport: Arc<dyn Transport>) -> &mut Self {
    self.transport = Some(transport);
    self
  }

  pub fn set_version_parser(&mut self, version_parser: Box<dyn VersionParser>) -> &mut Self {
    self.version_parser = Some(version_parser);
    self
  }

  pub fn set_checksum_provider(&mut self, checksum: Arc<dyn ChecksumProvider>) -> &mut Self {
    self.checksum = checksum;
    self
  }

  pub fn set_file_size_provider(&mut self, file_size: Arc<dyn FileSizeProvider>) -> &mut Self {
    self.file_size = file_size;
    self
  }

  pub fn set_progress_callback(&mut self, callback: impl Fn(&Progress) + Send + Sync + 'static) -> &mut Self {
    self.progress_callback = Some(Arc::new(callback));
    self
  }

  /// Validates the server urls and assembles an uninitialized `Patcher`.
  pub fn build(self) -> Result<Patcher, Error> {
    let server_info = self.settings.server_info.as_ref()
      .ok_or_else(|| Error::Configuration("no server info configured".to_string()))?;
    server_info.validate()?;
    let endpoints = server_info.for_platform(&self.settings.platform).clone();
    let sandbox = Sandbox::new(self.settings.sandbox_location.clone());
    let cache = CacheIndex::load(sandbox.cache_index_path());
    let transport: Arc<dyn Transport> = match self.transport {
      Some(transport) => transport,
      None => Arc::new(HttpTransport::new()),
    };
    let version_parser: Box<dyn VersionParser> = match self.version_parser {
      Some(version_parser) => version_parser,
      None => Box::new(VersionInformation::default()),
    };
    let progress_callback: ProgressCallback = match self.progress_callback {
      Some(progress_callback) => progress_callback,
      None => Arc::new(|_: &Progress| {}),
    };
    Ok(Patcher {
      endpoints,
      transport,
      version_parser,
      verifier: Verifier::with_providers(self.settings.verify_level, self.checksum, self.file_size),
      sandbox,
      cache,
      builtin_manifest: Manifest::new(0, Vec::new())?,
      active_manifest: None,
      remote_manifest_fetched: false,
      version_received: false,
      procedure: ProcedureFsm::new(),
      download_list: Vec::new(),
      downloader: None,
      progress: Progress::new(),
      progress_callback,
      pause_handle: PauseHandle::new(),
      last_failure: None,
      settings: self.settings,
    })
  }
}

impl Default for PatcherBuilder {
  fn default() -> Self {
    Self::new()
  }
}
