use std::collections::HashMap;

use crate::structures::{Error, RemoteServerInfo, ServerEndpoints};

impl ServerEndpoints {
  pub fn new(web_server: &str, cdn_server: &str, cdn_fallback_server: &str) -> Self {
    Self {
      web_server: web_server.to_owned(),
      cdn_server: cdn_server.trim_end_matches('/').to_owned(),
      cdn_fallback_server: cdn_fallback_server.trim_end_matches('/').to_owned(),
    }
  }

  pub fn bundle_url(&self, version: i32, file_name: &str) -> String {
    format!("{}/{}/{}", self.cdn_server, version, file_name)
  }

  pub fn fallback_bundle_url(&self, version: i32, file_name: &str) -> String {
    format!("{}/{}/{}", self.cdn_fallback_server, version, file_name)
  }

  pub(crate) fn validate(&self) -> Result<(), Error> {
    for server in [&self.web_server, &self.cdn_server, &self.cdn_fallback_server] {
      url::Url::parse(server).map_err(|e| Error::Configuration(format!("invalid server url \"{}\": {}", server, e)))?;
    }
    Ok(())
  }
}

impl RemoteServerInfo {
  pub fn new(default: ServerEndpoints) -> Self {
    Self {
      default,
      platforms: HashMap::new(),
    }
  }

  pub fn with_platform(mut self, platform: &str, endpoints: ServerEndpoints) -> Self {
    self.platforms.insert(platform.to_owned(), endpoints);
    self
  }

  /// Endpoints for `platform`, the default entry when it has none of its own.
  pub fn for_platform(&self, platform: &str) -> &ServerEndpoints {
    self.platforms.get(platform).unwrap_or(&self.default)
  }

  pub(crate) fn validate(&self) -> Result<(), Error> {
    self.default.validate()?;
    self.platforms.values().try_for_each(ServerEndpoints::validate)
  }
}
