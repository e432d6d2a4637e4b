//! [`Bot`] — turns chat updates into Vigil API calls and chat replies.
//!
//! Updates arrive either through the HTTP webhook (one [`Bot::handle_update`]
//! per request) or through [`Bot::run_polling`], which long-polls
//! `getUpdates` until stopped.

use std::{future::Future, sync::Arc, time::Duration};

use tokio::sync::watch;
use vigil_core::{Error as DomainError, notify::Notifier};

use crate::{
  Result, TelegramClient,
  api_client::{ApiReply, CheckinApi},
  commands::Command,
  types::Update,
};

/// Long-polling settings for [`Bot::run_polling`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
  /// How long Telegram holds an idle `getUpdates` open.
  pub timeout_secs: u64,
  /// Pause after a failed `getUpdates` before trying again.
  pub backoff:      Duration,
}

impl Default for PollConfig {
  fn default() -> Self {
    Self {
      timeout_secs: 30,
      backoff:      Duration::from_secs(5),
    }
  }
}

/// Anything that yields batches of updates from an offset.
pub trait UpdateSource: Send + Sync {
  fn updates(
    &self,
    offset: i64,
    timeout_secs: u64,
  ) -> impl Future<Output = Result<Vec<Update>>> + Send + '_;
}

impl UpdateSource for TelegramClient {
  async fn updates(&self, offset: i64, timeout_secs: u64) -> Result<Vec<Update>> {
    self.get_updates(offset, timeout_secs).await
  }
}

// ─── Reply texts ─────────────────────────────────────────────────────────────

fn start_text(user_id: &str) -> String {
  format!(
    "Hi! I'm the Vigil check-in bot.\n\n\
     Your Telegram ID: {user_id}\n\n\
     To register, send:\n/register <your_name> <trusted_contact_id>\n\n\
     To confirm you're OK, send:\n/checkin"
  )
}

fn register_text(reply: &ApiReply, user_id: &str) -> String {
  if reply.is_ok() {
    let id = reply.user_id.as_deref().unwrap_or(user_id);
    format!("You are registered!\nYour ID: {id}")
  } else {
    format!("Registration failed: {}", reply.message())
  }
}

fn checkin_text(reply: &ApiReply) -> String {
  if reply.is_ok() {
    "✅ Checked in! All good.".to_owned()
  } else {
    format!("❌ Check-in failed: {}", reply.message())
  }
}

fn unreachable_text(e: crate::Error) -> String {
  match DomainError::from(e) {
    DomainError::UpstreamUnreachable(reason) => format!("Could not reach the server: {reason}"),
    other => other.to_string(),
  }
}

// ─── Bot ─────────────────────────────────────────────────────────────────────

/// Chat front-end. `api` performs registrations and check-ins; `messenger`
/// delivers the replies.
pub struct Bot<A, M> {
  api:       Arc<A>,
  messenger: Arc<M>,
}

impl<A, M> Clone for Bot<A, M> {
  fn clone(&self) -> Self {
    Self {
      api:       Arc::clone(&self.api),
      messenger: Arc::clone(&self.messenger),
    }
  }
}

impl<A, M> Bot<A, M>
where
  A: CheckinApi,
  M: Notifier,
{
  pub fn new(api: Arc<A>, messenger: Arc<M>) -> Self { Self { api, messenger } }

  /// Compute the reply for an update, calling the API where the command
  /// needs it. Returns `(chat_id, text)`, or `None` for updates the bot
  /// ignores.
  pub async fn reply_for(&self, update: &Update) -> Option<(String, String)> {
    let message = update.message.as_ref()?;
    let text = message.text.as_deref()?;
    let chat_id = message.chat.id.to_string();
    let user_id = message
      .from
      .as_ref()
      .map_or(message.chat.id, |u| u.id)
      .to_string();

    let reply = match Command::parse(text) {
      Ok(None) => return None,
      Err(DomainError::MalformedInput(usage)) => usage,
      Err(other) => other.to_string(),
      Ok(Some(Command::Start)) => start_text(&user_id),
      Ok(Some(Command::Register { name, contact_id })) => {
        match self.api.register(&user_id, &name, &contact_id).await {
          Ok(reply) => register_text(&reply, &user_id),
          Err(e) => {
            tracing::warn!(user_id = %user_id, error = %e, "register relay failed");
            unreachable_text(e)
          }
        }
      }
      Ok(Some(Command::Checkin)) => match self.api.checkin(&user_id).await {
        Ok(reply) => checkin_text(&reply),
        Err(e) => {
          tracing::warn!(user_id = %user_id, error = %e, "checkin relay failed");
          unreachable_text(e)
        }
      },
    };

    Some((chat_id, reply))
  }

  /// Handle one update end to end. Fails only if the reply cannot be sent.
  pub async fn handle_update(&self, update: Update) -> Result<(), M::Error> {
    let Some((chat_id, text)) = self.reply_for(&update).await else {
      tracing::debug!(update_id = update.update_id, "ignoring update");
      return Ok(());
    };
    self.messenger.send(&chat_id, &text).await
  }

  /// Long-poll `source` until `stop` flips to `true` or its sender is dropped.
  ///
  /// A failed update is logged and skipped so that it is not redelivered
  /// forever.
  pub async fn run_polling<S>(
    &self,
    source: &S,
    config: PollConfig,
    mut stop: watch::Receiver<bool>,
  ) where
    S: UpdateSource,
  {
    let mut offset = 0_i64;
    tracing::info!(
      timeout_secs = config.timeout_secs,
      backoff = ?config.backoff,
      "bot polling started"
    );

    loop {
      if *stop.borrow() {
        break;
      }

      let batch = tokio::select! {
        batch = source.updates(offset, config.timeout_secs) => batch,
        changed = stop.changed() => {
          if changed.is_err() || *stop.borrow() {
            break;
          }
          continue;
        }
      };

      match batch {
        Ok(updates) => {
          for update in updates {
            offset = offset.max(update.update_id + 1);
            let update_id = update.update_id;
            if let Err(e) = self.handle_update(update).await {
              tracing::warn!(update_id, error = %e, "failed to reply to update");
            }
          }
        }
        Err(e) => {
          tracing::warn!(error = %e, backoff = ?config.backoff, "getUpdates failed");
          tokio::select! {
            _ = tokio::time::sleep(config.backoff) => {}
            changed = stop.changed() => {
              if changed.is_err() || *stop.borrow() {
                break;
              }
            }
          }
        }
      }
    }

    tracing::info!("bot polling stopped");
  }
}
