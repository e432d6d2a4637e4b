//! Async HTTP client for the Vigil JSON API, used by the bot to relay
//! `/register` and `/checkin`.

use std::{future::Future, time::Duration};

use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::{Error, Result};

/// The `{status, user_id?, message?}` shape every Vigil endpoint answers with.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ApiReply {
  pub status:  String,
  #[serde(default)]
  pub user_id: Option<String>,
  #[serde(default)]
  pub message: Option<String>,
}

impl ApiReply {
  pub fn is_ok(&self) -> bool { self.status == "ok" }

  /// The server's message, or a placeholder when it sent none.
  pub fn message(&self) -> &str { self.message.as_deref().unwrap_or("unknown error") }
}

/// The two API calls the bot makes on a user's behalf.
pub trait CheckinApi: Send + Sync {
  fn register<'a>(
    &'a self,
    telegram_id: &'a str,
    name: &'a str,
    contact_telegram_id: &'a str,
  ) -> impl Future<Output = Result<ApiReply>> + Send + 'a;

  fn checkin<'a>(
    &'a self,
    telegram_id: &'a str,
  ) -> impl Future<Output = Result<ApiReply>> + Send + 'a;
}

/// HTTP client for the Vigil API.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client:   Client,
  base_url: String,
}

impl ApiClient {
  pub fn new(base_url: impl Into<String>) -> Result<Self> {
    let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
    Ok(Self { client, base_url: base_url.into() })
  }

  fn url(&self, path: &str) -> String {
    format!("{}{}", self.base_url.trim_end_matches('/'), path)
  }

  /// POST `body` and decode the reply whatever the HTTP status; error
  /// replies carry the message the user should see.
  async fn post(&self, endpoint: &'static str, body: serde_json::Value) -> Result<ApiReply> {
    let resp = self.client.post(self.url(endpoint)).json(&body).send().await?;
    let status = resp.status();
    let bytes = resp.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|_| Error::UnexpectedResponse {
      endpoint,
      status: status.as_u16(),
    })
  }
}

impl CheckinApi for ApiClient {
  /// `POST /register`
  async fn register(
    &self,
    telegram_id: &str,
    name: &str,
    contact_telegram_id: &str,
  ) -> Result<ApiReply> {
    self
      .post(
        "/register",
        json!({
          "telegram_id": telegram_id,
          "name": name,
          "contact_telegram_id": contact_telegram_id,
        }),
      )
      .await
  }

  /// `POST /checkin`
  async fn checkin(&self, telegram_id: &str) -> Result<ApiReply> {
    self
      .post("/checkin", json!({ "telegram_id": telegram_id }))
      .await
  }
}
