use std::path::PathBuf;

#[derive(Debug)]
pub enum Error {
  // Network related errors, all of these are retryable:
  InvalidUri(download_async::http::uri::InvalidUri),
  InvalidHeader(download_async::http::header::InvalidHeaderValue),
  HttpError(download_async::http::Error),
  DownloadAsyncError(download_async::Error),
  DownloadTimeout(tokio::time::error::Elapsed),
  /// Server answered with a non-success status, first argument is the url
  InvalidStatus(String, u16),
  /// Transport failure reported by a `Transport` implementation
  Network(String),

  /// Malformed manifest document, argument describes what is wrong with it
  ManifestParse(String),
  /// The manifest lists the same bundle name twice
  DuplicateBundle(String),
  /// The version response could not be interpreted by the `VersionParser`
  VersionParse(String),
  /// A downloaded file did not pass verification, argument is the content hash
  IntegrityMismatch(String),
  UnsupportedOperation { state: String, operation: String },
  /// A cache or manifest file could not be written
  Persistence { path: PathBuf, source: std::io::Error },
  OutOfRetries(String),
  /// The builder was given incomplete or invalid settings
  Configuration(String),

  IoError(std::io::Error),
  NotUtf8(std::string::FromUtf8Error),
  JsonError(json::Error),
  JoinError(tokio::task::JoinError),
  MutexPoisoned(String),
}
