//! Async client for the Telegram Bot API.

use std::time::Duration;

use reqwest::Client;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::json;
use vigil_core::notify::Notifier;

use crate::{
  Error, Result,
  types::{ApiResponse, Update},
};

pub const DEFAULT_API_URL: &str = "https://api.telegram.org";

/// Connection settings for the Bot API.
#[derive(Debug, Clone)]
pub struct TelegramConfig {
  /// Base URL of the Bot API; overridable for self-hosted servers and tests.
  pub api_url:         String,
  pub token:           String,
  /// Whole-request timeout. Must exceed the long-polling timeout.
  pub request_timeout: Duration,
}

impl TelegramConfig {
  pub fn new(token: impl Into<String>) -> Self {
    Self {
      api_url:         DEFAULT_API_URL.to_owned(),
      token:           token.into(),
      request_timeout: Duration::from_secs(60),
    }
  }
}

/// Async HTTP client for the Telegram Bot API.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct TelegramClient {
  client: Client,
  config: TelegramConfig,
}

impl TelegramClient {
  pub fn new(config: TelegramConfig) -> Result<Self> {
    let client = Client::builder().timeout(config.request_timeout).build()?;
    Ok(Self { client, config })
  }

  fn url(&self, method: &str) -> String {
    format!(
      "{}/bot{}/{}",
      self.config.api_url.trim_end_matches('/'),
      self.config.token,
      method
    )
  }

  async fn call<B, T>(&self, method: &'static str, body: &B) -> Result<T>
  where
    B: Serialize + ?Sized,
    T: DeserializeOwned,
  {
    let resp: ApiResponse<T> = self
      .client
      .post(self.url(method))
      .json(body)
      .send()
      .await?
      .json()
      .await?;

    match (resp.ok, resp.result) {
      (true, Some(result)) => Ok(result),
      _ => Err(Error::Telegram(
        resp
          .description
          .unwrap_or_else(|| format!("{method} returned no result")),
      )),
    }
  }

  /// `sendMessage` — `chat_id` accepts a numeric id or `@channel` name.
  pub async fn send_message(&self, chat_id: &str, text: &str) -> Result<()> {
    let _: serde_json::Value = self
      .call("sendMessage", &json!({ "chat_id": chat_id, "text": text }))
      .await?;
    Ok(())
  }

  /// `setWebhook` — point Telegram at `url` for update delivery.
  pub async fn set_webhook(&self, url: &str) -> Result<()> {
    let _: bool = self.call("setWebhook", &json!({ "url": url })).await?;
    Ok(())
  }

  /// `deleteWebhook` — required before `getUpdates` works again.
  pub async fn delete_webhook(&self) -> Result<()> {
    let _: bool = self.call("deleteWebhook", &json!({})).await?;
    Ok(())
  }

  /// `getUpdates` long poll. Returns after `timeout_secs` with no updates.
  pub async fn get_updates(&self, offset: i64, timeout_secs: u64) -> Result<Vec<Update>> {
    self
      .call(
        "getUpdates",
        &json!({
          "offset": offset,
          "timeout": timeout_secs,
          "allowed_updates": ["message"],
        }),
      )
      .await
  }
}

impl Notifier for TelegramClient {
  type Error = Error;

  async fn send(&self, contact_id: &str, text: &str) -> Result<()> {
    self.send_message(contact_id, text).await
  }
}
