//! The slice of the Telegram Bot API object model that Vigil reads.
//!
//! Unknown fields are ignored; optional fields default to `None` so that any
//! update kind (edited messages, callbacks, ...) deserialises cleanly.

use serde::{Deserialize, Serialize};

/// Response envelope shared by every Bot API method.
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
  pub ok:          bool,
  pub result:      Option<T>,
  pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Update {
  pub update_id: i64,
  #[serde(default)]
  pub message:   Option<Message>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
  pub message_id: i64,
  #[serde(default)]
  pub from:       Option<User>,
  pub chat:       Chat,
  #[serde(default)]
  pub text:       Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
  pub id:         i64,
  #[serde(default)]
  pub first_name: String,
  #[serde(default)]
  pub username:   Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chat {
  pub id: i64,
}
