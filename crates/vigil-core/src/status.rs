//! Staleness evaluation.
//!
//! A subject is `OK` while its last check-in is no older than the threshold,
//! and `ALARM` otherwise. A subject that has never checked in is `ALARM`.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// The production threshold: one day.
pub const DEFAULT_THRESHOLD_SECS: i64 = 24 * 60 * 60;

/// Verdict for a single subject at a single instant.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  Display,
  AsRefStr,
  EnumString,
)]
pub enum Status {
  #[serde(rename = "OK")]
  #[strum(serialize = "OK")]
  Ok,
  #[serde(rename = "ALARM")]
  #[strum(serialize = "ALARM")]
  Alarm,
}

impl Status {
  pub fn is_alarm(self) -> bool { matches!(self, Self::Alarm) }
}

/// Evaluate staleness. `d == threshold` is still `OK`.
pub fn evaluate(
  now: DateTime<Utc>,
  last_checkin_at: Option<DateTime<Utc>>,
  threshold: TimeDelta,
) -> Status {
  match last_checkin_at {
    None => Status::Alarm,
    Some(last) if now - last > threshold => Status::Alarm,
    Some(_) => Status::Ok,
  }
}

/// The fixed threshold shared by the HTTP status endpoint and the watchdog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StalenessPolicy {
  pub threshold: TimeDelta,
}

impl StalenessPolicy {
  pub fn new(threshold: TimeDelta) -> Self { Self { threshold } }

  pub fn evaluate(
    &self,
    now: DateTime<Utc>,
    last_checkin_at: Option<DateTime<Utc>>,
  ) -> Status {
    evaluate(now, last_checkin_at, self.threshold)
  }
}

impl Default for StalenessPolicy {
  fn default() -> Self { Self::new(TimeDelta::seconds(DEFAULT_THRESHOLD_SECS)) }
}
