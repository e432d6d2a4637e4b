//! Handlers for `POST /checkin` and `GET /status/{telegram_id}`.

use axum::{
  Json,
  extract::{Path, State, rejection::JsonRejection},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use vigil_core::{Error, Status, store::Registry};

use crate::{ApiState, error::ApiError};

// ─── Check-in ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CheckinBody {
  pub telegram_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CheckinReply {
  pub status:  String,
  pub message: String,
}

/// `POST /checkin` — resets the subject's staleness clock to now.
pub async fn checkin<R>(
  State(state): State<ApiState<R>>,
  body: Result<Json<CheckinBody>, JsonRejection>,
) -> Result<Json<CheckinReply>, ApiError>
where
  R: Registry,
{
  let Json(body) = body?;
  let id = body.telegram_id.trim();

  let subject = state
    .registry
    .record_checkin(id, Utc::now())
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| Error::NotFound(id.to_owned()))?;

  tracing::info!(subject_id = %subject.id, "check-in recorded");
  Ok(Json(CheckinReply {
    status:  "ok".into(),
    message: "check-in recorded".into(),
  }))
}

// ─── Status ───────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusReply {
  pub status:              Status,
  pub last_checkin:        Option<DateTime<Utc>>,
  pub contact_telegram_id: Option<String>,
}

/// `GET /status/{telegram_id}` — evaluates staleness at request time.
pub async fn status<R>(
  State(state): State<ApiState<R>>,
  Path(id): Path<String>,
) -> Result<Json<StatusReply>, ApiError>
where
  R: Registry,
{
  let id = id.trim();
  let subject = state
    .registry
    .find(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| Error::NotFound(id.to_owned()))?;

  Ok(Json(StatusReply {
    status:              state.policy.evaluate(Utc::now(), subject.last_checkin_at),
    last_checkin:        subject.last_checkin_at,
    contact_telegram_id: subject.contact_id,
  }))
}
