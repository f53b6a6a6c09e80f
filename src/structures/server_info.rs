use std::collections::HashMap;

/// Servers used by one platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerEndpoints {
  /// Answers the version request
  pub web_server: String,
  pub cdn_server: String,
  pub cdn_fallback_server: String,
}

/// Server endpoints, optionally overridden per platform
#[derive(Debug, Clone)]
pub struct RemoteServerInfo {
  pub(crate) default: ServerEndpoints,
  pub(crate) platforms: HashMap<String, ServerEndpoints>,
}
