//! JSON HTTP API for Vigil.
//!
//! Exposes an axum [`Router`] backed by any [`vigil_core::store::Registry`].
//! Transport concerns (CORS, tracing, the bot webhook) are the caller's
//! responsibility.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/` | Service banner |
//! | `POST` | `/register` | Body: `{telegram_id, name, contact_telegram_id}` |
//! | `POST` | `/checkin` | Body: `{telegram_id}` |
//! | `GET`  | `/status/{telegram_id}` | `OK` or `ALARM` |
//!
//! # Mounting
//!
//! ```rust,ignore
//! .merge(vigil_api::api_router(ApiState::new(registry, policy)))
//! ```

pub mod checkins;
pub mod error;
pub mod subjects;

use std::sync::Arc;

use axum::{
  Json, Router,
  routing::{get, post},
};
use serde_json::{Value, json};
use vigil_core::{StalenessPolicy, store::Registry};

pub use error::ApiError;

/// Shared state threaded through all API handlers.
pub struct ApiState<R> {
  pub registry: Arc<R>,
  pub policy:   StalenessPolicy,
}

impl<R> ApiState<R> {
  pub fn new(registry: Arc<R>, policy: StalenessPolicy) -> Self {
    Self { registry, policy }
  }
}

impl<R> Clone for ApiState<R> {
  fn clone(&self) -> Self {
    Self {
      registry: Arc::clone(&self.registry),
      policy:   self.policy,
    }
  }
}

/// Build a fully-materialised API router.
///
/// The returned `Router<()>` can be merged into any parent router regardless
/// of its own state type.
pub fn api_router<R>(state: ApiState<R>) -> Router<()>
where
  R: Registry + 'static,
{
  Router::new()
    .route("/", get(root))
    .route("/register", post(subjects::register::<R>))
    .route("/checkin", post(checkins::checkin::<R>))
    .route("/status/{telegram_id}", get(checkins::status::<R>))
    .with_state(state)
}

/// `GET /`
async fn root() -> Json<Value> {
  Json(json!({ "message": "Vigil check-in API" }))
}

// ─── Integration tests ────────────────────────────────────────────────────────
