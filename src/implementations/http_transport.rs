use std::time::Duration;

use async_trait::async_trait;
use tracing::{instrument, trace};

use crate::structures::{Error, HttpTransport};
use crate::traits::Transport;

impl HttpTransport {
  pub fn new() -> Self {
    Self {
      user_agent: format!("bundle-patcher ({})", env!("CARGO_PKG_VERSION")),
    }
  }

  pub fn with_user_agent(user_agent: &str) -> Self {
    Self {
      user_agent: user_agent.to_owned(),
    }
  }

  async fn fetch(&self, url: &str, body: download_async::Body, timeout: Duration) -> Result<Vec<u8>, Error> {
    let mut downloader = download_async::Downloader::new();
    downloader.use_uri(url.parse::<download_async::http::Uri>()?);
    if let Some(headers) = downloader.headers() {
      headers.append("User-Agent", self.user_agent.parse::<download_async::http::HeaderValue>()?);
    }
    downloader.allow_http();

    let mut buffer = vec![];
    let response = downloader.download(body, &mut buffer);
    let parts = tokio::time::timeout(timeout, response).await??;
    if !parts.status.is_success() {
      return Err(Error::InvalidStatus(url.to_owned(), parts.status.as_u16()));
    }
    trace!("Fetched {} bytes from {}", buffer.len(), url);
    Ok(buffer)
  }
}

impl Default for HttpTransport {
  fn default() -> Self {
    Self::new()
  }
}

#[async_trait]
impl Transport for HttpTransport {
  #[instrument(skip(self))]
  async fn get(&self, url: &str, timeout: Duration) -> Result<Vec<u8>, Error> {
    self.fetch(url, download_async::Body::empty(), timeout).await
  }

  #[instrument(skip(self, body))]
  async fn post(&self, url: &str, body: String, timeout: Duration) -> Result<Vec<u8>, Error> {
    self.fetch(url, download_async::Body::from(body), timeout).await
  }
}
