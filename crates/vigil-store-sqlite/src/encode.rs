//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 UTC strings
//! (`2026-03-14T12:00:00.000000Z`) so that SQL string comparison orders them
//! chronologically.

use chrono::{DateTime, SecondsFormat, Utc};
use vigil_core::subject::Subject;

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── Raw rows ────────────────────────────────────────────────────────────────

/// Column order used by every `SELECT` in the store.
pub const SUBJECT_COLUMNS: &str =
  "subject_id, display_name, contact_id, last_checkin_at, enabled, registered_at";

/// A `subjects` row as read from SQLite, before timestamp decoding.
#[derive(Debug)]
pub struct RawSubject {
  pub subject_id:      String,
  pub display_name:    String,
  pub contact_id:      Option<String>,
  pub last_checkin_at: Option<String>,
  pub enabled:         bool,
  pub registered_at:   String,
}

impl RawSubject {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      subject_id:      row.get(0)?,
      display_name:    row.get(1)?,
      contact_id:      row.get(2)?,
      last_checkin_at: row.get(3)?,
      enabled:         row.get(4)?,
      registered_at:   row.get(5)?,
    })
  }

  pub fn into_subject(self) -> Result<Subject> {
    Ok(Subject {
      id:              self.subject_id,
      display_name:    self.display_name,
      contact_id:      self.contact_id,
      last_checkin_at: self.last_checkin_at.as_deref().map(decode_dt).transpose()?,
      enabled:         self.enabled,
      registered_at:   decode_dt(&self.registered_at)?,
    })
  }
}
