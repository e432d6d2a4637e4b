//! Process wiring for Vigil: configuration and the composed HTTP router.
//!
//! The router serves the JSON API from [`vigil_api`] plus `POST /webhook`,
//! where Telegram delivers bot updates.

pub mod config;

pub use config::{ConfigError, ServerConfig};

use axum::{
  Json, Router,
  extract::{State, rejection::JsonRejection},
  http::StatusCode,
  routing::post,
};
use serde_json::{Value, json};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use vigil_api::{ApiState, api_router};
use vigil_core::{notify::Notifier, store::Registry};
use vigil_telegram::{Bot, CheckinApi, types::Update};

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full application router.
pub fn router<R, A, M>(api: ApiState<R>, bot: Bot<A, M>) -> Router
where
  R: Registry + 'static,
  A: CheckinApi + 'static,
  M: Notifier + 'static,
{
  Router::new()
    .route("/webhook", post(webhook::<A, M>))
    .with_state(bot)
    .merge(api_router(api))
    .layer(CorsLayer::permissive())
    .layer(TraceLayer::new_for_http())
}

// ─── Webhook ─────────────────────────────────────────────────────────────────

/// `POST /webhook` — Telegram retries non-2xx deliveries, so only a body we
/// cannot read or a reply we cannot send is an error.
async fn webhook<A, M>(
  State(bot): State<Bot<A, M>>,
  payload: Result<Json<Update>, JsonRejection>,
) -> (StatusCode, Json<Value>)
where
  A: CheckinApi + 'static,
  M: Notifier + 'static,
{
  let update = match payload {
    Ok(Json(update)) => update,
    Err(e) => {
      tracing::warn!(error = %e, "unreadable webhook payload");
      return failed();
    }
  };

  let update_id = update.update_id;
  match bot.handle_update(update).await {
    Ok(()) => (StatusCode::OK, Json(json!({ "status": "ok" }))),
    Err(e) => {
      tracing::error!(update_id, error = %e, "webhook update failed");
      failed()
    }
  }
}

fn failed() -> (StatusCode, Json<Value>) {
  (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "status": "error" })))
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use std::sync::{Arc, Mutex};

  use axum::{
    body::Body,
    http::{Request, header},
  };
  use tower::ServiceExt as _;
  use vigil_core::StalenessPolicy;
  use vigil_store_sqlite::SqliteStore;
  use vigil_telegram::ApiReply;

  use super::*;

  struct OkApi;

  impl CheckinApi for OkApi {
    async fn register(
      &self,
      telegram_id: &str,
      _name: &str,
      _contact: &str,
    ) -> vigil_telegram::Result<ApiReply> {
      Ok(ApiReply {
        status:  "ok".into(),
        user_id: Some(telegram_id.into()),
        message: None,
      })
    }

    async fn checkin(&self, _telegram_id: &str) -> vigil_telegram::Result<ApiReply> {
      Ok(ApiReply { status: "ok".into(), user_id: None, message: None })
    }
  }

  #[derive(Debug, thiserror::Error)]
  #[error("chat unreachable")]
  struct Unreachable;

  #[derive(Default)]
  struct Outbox {
    sent: Mutex<Vec<(String, String)>>,
    fail: bool,
  }

  impl Notifier for Outbox {
    type Error = Unreachable;

    async fn send(&self, chat_id: &str, text: &str) -> Result<(), Unreachable> {
      if self.fail {
        return Err(Unreachable);
      }
      self.sent.lock().unwrap().push((chat_id.into(), text.into()));
      Ok(())
    }
  }

  async fn app(outbox: Arc<Outbox>) -> Router {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let api = ApiState::new(Arc::new(store), StalenessPolicy::default());
    router(api, Bot::new(Arc::new(OkApi), outbox))
  }

  async fn post_json(app: Router, uri: &str, body: String) -> (StatusCode, Value) {
    let req = Request::builder()
      .method("POST")
      .uri(uri)
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from(body))
      .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
  }

  fn update(text: &str) -> String {
    json!({
      "update_id": 1,
      "message": {
        "message_id": 1,
        "from": { "id": 347, "first_name": "Alice" },
        "chat": { "id": 347 },
        "text": text,
      }
    })
    .to_string()
  }

  #[tokio::test]
  async fn webhook_replies_in_chat() {
    let outbox = Arc::new(Outbox::default());
    let (status, body) = post_json(app(outbox.clone()).await, "/webhook", update("/checkin")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));
    let sent = outbox.sent.lock().unwrap();
    assert_eq!(sent[0], ("347".to_string(), "✅ Checked in! All good.".to_string()));
  }

  #[tokio::test]
  async fn webhook_ignores_plain_text() {
    let outbox = Arc::new(Outbox::default());
    let (status, _) = post_json(app(outbox.clone()).await, "/webhook", update("hi")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(outbox.sent.lock().unwrap().is_empty());
  }

  #[tokio::test]
  async fn unreadable_webhook_payload_is_500() {
    let outbox = Arc::new(Outbox::default());
    let (status, body) = post_json(app(outbox).await, "/webhook", "{not json".into()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "status": "error" }));
  }

  #[tokio::test]
  async fn undeliverable_reply_is_500() {
    let outbox = Arc::new(Outbox { fail: true, ..Outbox::default() });
    let (status, body) = post_json(app(outbox).await, "/webhook", update("/start")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["status"], "error");
  }

  #[tokio::test]
  async fn api_routes_are_mounted() {
    let outbox = Arc::new(Outbox::default());
    let (status, body) = post_json(
      app(outbox).await,
      "/register",
      json!({ "telegram_id": "u1", "name": "Alice", "contact_telegram_id": "c1" }).to_string(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user_id"], "u1");
  }

  #[tokio::test]
  async fn cors_allows_any_origin() {
    let outbox = Arc::new(Outbox::default());
    let req = Request::builder()
      .uri("/")
      .header(header::ORIGIN, "https://elsewhere.example")
      .body(Body::empty())
      .unwrap();
    let resp = app(outbox).await.oneshot(req).await.unwrap();
    assert_eq!(
      resp.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
      "*"
    );
  }
}
