//! Error types for `vigil-core`.
//!
//! These are the domain-level failures every surface (HTTP, chat, watchdog)
//! reports back to its caller. Backend-specific failures live in each
//! backend's own error type.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
  /// Unknown subject identifier on check-in or status lookup.
  #[error("subject not found: {0}")]
  NotFound(String),

  /// A subject with this identifier is already registered.
  #[error("subject already registered: {0}")]
  AlreadyExists(String),

  /// The vigil API or the messaging platform could not be reached.
  #[error("upstream unreachable: {0}")]
  UpstreamUnreachable(String),

  /// A required argument or field was missing.
  #[error("malformed input: {0}")]
  MalformedInput(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
