//! [`SqliteStore`] — the SQLite implementation of [`Registry`].

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension as _;

use vigil_core::{
  store::Registry,
  subject::{NewSubject, Registration, Subject},
};

use crate::{
  Result,
  encode::{RawSubject, SUBJECT_COLUMNS, encode_dt},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A subject registry backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Flip the `enabled` flag. Returns `false` if the subject does not exist.
  pub async fn set_enabled(&self, id: &str, enabled: bool) -> Result<bool> {
    let id = id.to_owned();
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE subjects SET enabled = ?2 WHERE subject_id = ?1",
          rusqlite::params![id, enabled],
        )?)
      })
      .await?;
    Ok(changed > 0)
  }
}

// ─── Registry impl ───────────────────────────────────────────────────────────

impl Registry for SqliteStore {
  type Error = crate::Error;

  async fn create(&self, input: NewSubject) -> Result<Registration> {
    let subject = Subject {
      id:              input.id,
      display_name:    input.display_name,
      contact_id:      input.contact_id,
      last_checkin_at: None,
      enabled:         true,
      registered_at:   Utc::now(),
    };

    let id_str   = subject.id.clone();
    let name     = subject.display_name.clone();
    let contact  = subject.contact_id.clone();
    let at_str   = encode_dt(subject.registered_at);

    // `ON CONFLICT DO NOTHING` makes the existence check and the insert a
    // single statement; an existing row is never touched.
    let inserted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "INSERT INTO subjects (subject_id, display_name, contact_id, registered_at)
           VALUES (?1, ?2, ?3, ?4)
           ON CONFLICT(subject_id) DO NOTHING",
          rusqlite::params![id_str, name, contact, at_str],
        )?)
      })
      .await?;

    if inserted == 0 {
      tracing::debug!(subject_id = %subject.id, "registration rejected: id taken");
      return Ok(Registration::AlreadyExists);
    }

    Ok(Registration::Created(subject))
  }

  async fn find(&self, id: &str) -> Result<Option<Subject>> {
    let id_str = id.to_owned();

    let raw: Option<RawSubject> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {SUBJECT_COLUMNS} FROM subjects WHERE subject_id = ?1"),
            rusqlite::params![id_str],
            RawSubject::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawSubject::into_subject).transpose()
  }

  async fn record_checkin(
    &self,
    id: &str,
    at: DateTime<Utc>,
  ) -> Result<Option<Subject>> {
    let id_str = id.to_owned();
    let at_str = encode_dt(at);

    let raw: Option<RawSubject> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let changed = tx.execute(
          "UPDATE subjects
           SET last_checkin_at = CASE
             WHEN last_checkin_at IS NULL OR last_checkin_at < ?2 THEN ?2
             ELSE last_checkin_at
           END
           WHERE subject_id = ?1",
          rusqlite::params![id_str, at_str],
        )?;

        if changed == 0 {
          return Ok(None);
        }

        let raw = tx
          .query_row(
            &format!("SELECT {SUBJECT_COLUMNS} FROM subjects WHERE subject_id = ?1"),
            rusqlite::params![id_str],
            RawSubject::from_row,
          )
          .optional()?;

        tx.commit()?;
        Ok(raw)
      })
      .await?;

    raw.map(RawSubject::into_subject).transpose()
  }

  async fn list_enabled(&self) -> Result<Vec<Subject>> {
    let raws: Vec<RawSubject> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {SUBJECT_COLUMNS} FROM subjects WHERE enabled = 1 ORDER BY subject_id"
        ))?;
        let rows = stmt
          .query_map([], RawSubject::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    // A row that fails to decode is skipped so the rest stay watchable.
    let subjects = raws
      .into_iter()
      .filter_map(|raw| {
        let subject_id = raw.subject_id.clone();
        match raw.into_subject() {
          Ok(subject) => Some(subject),
          Err(e) => {
            tracing::warn!(subject_id = %subject_id, error = %e, "skipping undecodable subject row");
            None
          }
        }
      })
      .collect();
    Ok(subjects)
  }
}
