//! Subject — a person being watched through periodic check-ins.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered subject.
///
/// Created once, mutated only by check-ins, never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
  /// External identifier (the Telegram user id).
  pub id:              String,
  pub display_name:    String,
  /// Who gets alerted. May be absent.
  pub contact_id:      Option<String>,
  /// Absent until the first check-in; only ever moves forward.
  pub last_checkin_at: Option<DateTime<Utc>>,
  pub enabled:         bool,
  pub registered_at:   DateTime<Utc>,
}

impl Subject {
  /// The contact id, if present and non-blank.
  pub fn contact(&self) -> Option<&str> {
    self
      .contact_id
      .as_deref()
      .map(str::trim)
      .filter(|c| !c.is_empty())
  }
}

/// Input to [`crate::store::Registry::create`].
/// `registered_at` is set by the store.
#[derive(Debug, Clone)]
pub struct NewSubject {
  pub id:           String,
  pub display_name: String,
  pub contact_id:   Option<String>,
}

/// Result of a create-if-absent registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
  Created(Subject),
  /// The identifier was taken; the stored record was left untouched.
  AlreadyExists,
}

#[cfg(test)]
mod tests {
  use super::*;

  fn subject(contact_id: Option<&str>) -> Subject {
    Subject {
      id:              "u1".into(),
      display_name:    "Alice".into(),
      contact_id:      contact_id.map(str::to_owned),
      last_checkin_at: None,
      enabled:         true,
      registered_at:   Utc::now(),
    }
  }

  #[test]
  fn blank_contact_counts_as_absent() {
    assert_eq!(subject(None).contact(), None);
    assert_eq!(subject(Some("")).contact(), None);
    assert_eq!(subject(Some("   ")).contact(), None);
    assert_eq!(subject(Some("c1")).contact(), Some("c1"));
  }
}
