use crate::structures::Error;

impl Error {
  /// Whether this error came from the network layer and is worth another attempt.
  pub fn is_network(&self) -> bool {
    matches!(self,
      Self::InvalidUri(_) |
      Self::InvalidHeader(_) |
      Self::HttpError(_) |
      Self::DownloadAsyncError(_) |
      Self::DownloadTimeout(_) |
      Self::InvalidStatus(_, _) |
      Self::Network(_)
    )
  }

  pub(crate) fn persistence(path: impl Into<std::path::PathBuf>, source: std::io::Error) -> Self {
    let path = path.into();
    tracing::error!("Couldn't persist {}: {}", path.display(), source);
    Self::Persistence { path, source }
  }
}

impl std::error::Error for Error {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      Self::InvalidUri(e) => Some(e),
      Self::InvalidHeader(e) => Some(e),
      Self::HttpError(e) => Some(e),
      Self::DownloadAsyncError(e) => Some(e),
      Self::DownloadTimeout(e) => Some(e),
      Self::Persistence { source, .. } => Some(source),
      Self::IoError(e) => Some(e),
      Self::NotUtf8(e) => Some(e),
      Self::JsonError(e) => Some(e),
      Self::JoinError(e) => Some(e),
      _ => None,
    }
  }
}

impl std::fmt::Display for Error {
  fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
    match self {
      Self::InvalidUri(e) => write!(f, "invalid uri: {}", e),
      Self::InvalidHeader(e) => write!(f, "invalid header value: {}", e),
      Self::HttpError(e) => write!(f, "http error: {}", e),
      Self::DownloadAsyncError(e) => write!(f, "download failed: {}", e),
      Self::DownloadTimeout(_) => write!(f, "request timed out"),
      Self::InvalidStatus(url, status) => write!(f, "{} answered with status {}", url, status),
      Self::Network(reason) => write!(f, "network error: {}", reason),
      Self::ManifestParse(reason) => write!(f, "malformed patch manifest: {}", reason),
      Self::DuplicateBundle(name) => write!(f, "bundle \"{}\" is listed more than once in the patch manifest", name),
      Self::VersionParse(reason) => write!(f, "couldn't parse version response: {}", reason),
      Self::IntegrityMismatch(hash) => write!(f, "file {} failed verification", hash),
      Self::UnsupportedOperation { state, operation } => write!(f, "operation {} is not allowed in state {}", operation, state),
      Self::Persistence { path, source } => write!(f, "couldn't write {}: {}", path.display(), source),
      Self::OutOfRetries(what) => write!(f, "out of retries: {}", what),
      Self::Configuration(reason) => write!(f, "invalid configuration: {}", reason),
      Self::IoError(e) => write!(f, "io error: {}", e),
      Self::NotUtf8(e) => write!(f, "response is not valid utf-8: {}", e),
      Self::JsonError(e) => write!(f, "json error: {}", e),
      Self::JoinError(e) => write!(f, "background task failed: {}", e),
      Self::MutexPoisoned(e) => write!(f, "mutex poisoned: {}", e),
    }
  }
}

impl From<download_async::http::uri::InvalidUri> for Error {
  #[track_caller]
  #[inline(always)]
  fn from(error: download_async::http::uri::InvalidUri) -> Self {
    log_error(&error);
    Self::InvalidUri(error)
  }
}

impl From<download_async::http::header::InvalidHeaderValue> for Error {
  #[track_caller]
  #[inline(always)]
  fn from(error: download_async::http::header::InvalidHeaderValue) -> Self {
    log_error(&error);
    Self::InvalidHeader(error)
  }
}

impl From<download_async::http::Error> for Error {
  #[track_caller]
  #[inline(always)]
  fn from(error: download_async::http::Error) -> Self {
    log_error(&error);
    Self::HttpError(error)
  }
}

impl From<download_async::Error> for Error {
  #[track_caller]
  #[inline(always)]
  fn from(error: download_async::Error) -> Self {
    log_error(&error);
    Self::DownloadAsyncError(error)
  }
}

impl From<tokio::time::error::Elapsed> for Error {
  #[track_caller]
  #[inline(always)]
  fn from(error: tokio::time::error::Elapsed) -> Self {
    log_error(&error);
    Self::DownloadTimeout(error)
  }
}

impl From<tokio::task::JoinError> for Error {
  #[track_caller]
  #[inline(always)]
  fn from(error: tokio::task::JoinError) -> Self {
    log_error(&error);
    Self::JoinError(error)
  }
}

impl<T> From<std::sync::PoisonError<T>> for Error {
  #[track_caller]
  #[inline(always)]
  fn from(error: std::sync::PoisonError<T>) -> Self {
    tracing::error!("{}", error);
    Self::MutexPoisoned(error.to_string())
  }
}

impl From<std::io::Error> for Error {
  #[track_caller]
  #[inline(always)]
  fn from(error: std::io::Error) -> Self {
    log_error(&error);
    Self::IoError(error)
  }
}

impl From<std::string::FromUtf8Error> for Error {
  #[track_caller]
  #[inline(always)]
  fn from(error: std::string::FromUtf8Error) -> Self {
    log_error(&error);
    Self::NotUtf8(error)
  }
}

impl From<json::Error> for Error {
  #[track_caller]
  #[inline(always)]
  fn from(error: json::Error) -> Self {
    log_error(&error);
    Self::JsonError(error)
  }
}

#[track_caller]
fn log_error(error: &(impl std::error::Error + ?Sized)) {
  tracing::error!("{:?}", error);
}
