//! The `Registry` trait.
//!
//! The trait is implemented by storage backends (e.g. `vigil-store-sqlite`).
//! Higher layers (`vigil-api`, `vigil-watchdog`) depend on this abstraction,
//! not on any concrete backend.

use std::future::Future;

use chrono::{DateTime, Utc};

use crate::subject::{NewSubject, Registration, Subject};

/// Abstraction over the subject registry.
///
/// Every operation touches a single subject, so implementations need no
/// cross-subject locking. `create` and `record_checkin` must each be atomic.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait Registry: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Create the subject unless the id is taken. An existing record is never
  /// overwritten.
  fn create(
    &self,
    input: NewSubject,
  ) -> impl Future<Output = Result<Registration, Self::Error>> + Send + '_;

  /// Retrieve a subject by id. Returns `None` if not found.
  fn find<'a>(
    &'a self,
    id: &'a str,
  ) -> impl Future<Output = Result<Option<Subject>, Self::Error>> + Send + 'a;

  /// Move `last_checkin_at` forward to `at` and return the updated subject.
  ///
  /// Returns `None` (and mutates nothing) if the id is unknown. An `at`
  /// older than the stored value leaves the stored value in place.
  fn record_checkin<'a>(
    &'a self,
    id: &'a str,
    at: DateTime<Utc>,
  ) -> impl Future<Output = Result<Option<Subject>, Self::Error>> + Send + 'a;

  /// All subjects with `enabled = true`.
  ///
  /// A record that cannot be read is left out rather than failing the whole
  /// listing; `Err` is reserved for the backend being unavailable.
  fn list_enabled(
    &self,
  ) -> impl Future<Output = Result<Vec<Subject>, Self::Error>> + Send + '_;
}
