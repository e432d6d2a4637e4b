//! Handler for `POST /register`.
//!
//! Body: `{"telegram_id": "...", "name": "...", "contact_telegram_id": "..."}`.
//! Registration is create-if-absent; a second registration of the same id is
//! rejected and the stored record is left untouched.

use axum::{
  Json,
  extract::{State, rejection::JsonRejection},
};
use serde::{Deserialize, Serialize};
use vigil_core::{
  Error,
  store::Registry,
  subject::{NewSubject, Registration},
};

use crate::{ApiState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct RegisterBody {
  pub telegram_id:         String,
  pub name:                String,
  #[serde(default)]
  pub contact_telegram_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterReply {
  pub status:  String,
  pub user_id: String,
}

/// `POST /register`
pub async fn register<R>(
  State(state): State<ApiState<R>>,
  body: Result<Json<RegisterBody>, JsonRejection>,
) -> Result<Json<RegisterReply>, ApiError>
where
  R: Registry,
{
  let Json(body) = body?;
  let id = body.telegram_id.trim().to_owned();
  if id.is_empty() {
    return Err(Error::MalformedInput("telegram_id is required".into()).into());
  }

  let input = NewSubject {
    id:           id.clone(),
    display_name: body.name,
    contact_id:   body
      .contact_telegram_id
      .map(|c| c.trim().to_owned())
      .filter(|c| !c.is_empty()),
  };

  match state.registry.create(input).await.map_err(ApiError::store)? {
    Registration::Created(subject) => {
      tracing::info!(subject_id = %subject.id, "subject registered");
      Ok(Json(RegisterReply {
        status:  "ok".into(),
        user_id: subject.id,
      }))
    }
    Registration::AlreadyExists => Err(Error::AlreadyExists(id).into()),
  }
}
