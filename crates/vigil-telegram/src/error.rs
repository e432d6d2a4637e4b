//! Error type for `vigil-telegram`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// Transport failure. The URL is stripped because Bot API URLs embed the
  /// bot token.
  #[error("http error: {0}")]
  Http(reqwest::Error),

  /// The Bot API answered `ok: false`.
  #[error("telegram api error: {0}")]
  Telegram(String),

  /// The Vigil API answered with something that is not a JSON reply.
  #[error("unexpected response from {endpoint}: HTTP {status}")]
  UnexpectedResponse { endpoint: &'static str, status: u16 },
}

impl From<reqwest::Error> for Error {
  fn from(e: reqwest::Error) -> Self { Self::Http(e.without_url()) }
}

impl From<Error> for vigil_core::Error {
  fn from(e: Error) -> Self { vigil_core::Error::UpstreamUnreachable(e.to_string()) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
