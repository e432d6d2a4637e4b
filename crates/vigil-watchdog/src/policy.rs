//! When does an `ALARM` verdict turn into a notification?
//!
//! ```text
//!                 ALARM (notify)            ALARM
//!   Quiet ─────────────────────────► Alerted ────► Alerted (suppressed)
//!     ▲                                 │
//!     └────────────── OK ───────────────┘
//! ```
//!
//! Under [`NotifyPolicy::EveryTick`] the tracker is stateless and every
//! `ALARM` verdict notifies. Under [`NotifyPolicy::OncePerEpisode`] only the
//! transition into `Alerted` notifies; an `OK` verdict re-arms the subject.

use std::collections::HashSet;

use serde::Deserialize;
use vigil_core::Status;

/// Repeat-notification policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotifyPolicy {
  /// Notify on every tick while the subject stays in `ALARM`.
  #[default]
  EveryTick,
  /// Notify once when the subject enters `ALARM`; stay quiet until it has
  /// been `OK` again.
  OncePerEpisode,
}

/// Per-subject alert bookkeeping. The single decision point for whether an
/// evaluated subject is notified.
#[derive(Debug, Default)]
pub struct AlertTracker {
  policy:  NotifyPolicy,
  alerted: HashSet<String>,
}

impl AlertTracker {
  pub fn new(policy: NotifyPolicy) -> Self {
    Self { policy, alerted: HashSet::new() }
  }

  pub fn policy(&self) -> NotifyPolicy { self.policy }

  /// Feed one verdict; returns whether the contact should be notified now.
  pub fn should_notify(&mut self, subject_id: &str, status: Status) -> bool {
    match (self.policy, status) {
      (_, Status::Ok) => {
        self.alerted.remove(subject_id);
        false
      }
      (NotifyPolicy::EveryTick, Status::Alarm) => true,
      (NotifyPolicy::OncePerEpisode, Status::Alarm) => {
        !self.alerted.contains(subject_id)
      }
    }
  }

  /// Record a delivered alert. A failed delivery is not recorded, so the
  /// next tick tries again.
  pub fn mark_notified(&mut self, subject_id: &str) {
    if self.policy == NotifyPolicy::OncePerEpisode {
      self.alerted.insert(subject_id.to_owned());
    }
  }

  /// Forget subjects that were not evaluated this tick (e.g. disabled).
  pub fn retain_seen(&mut self, seen: &HashSet<&str>) {
    self.alerted.retain(|id| seen.contains(id.as_str()));
  }
}
