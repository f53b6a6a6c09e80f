/// `Transport` over `download_async`
#[derive(Debug, Clone)]
pub struct HttpTransport {
  pub(crate) user_agent: String,
}
