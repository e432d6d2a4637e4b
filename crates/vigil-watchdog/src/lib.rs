//! The Vigil watchdog: a periodic pass over every enabled subject that alerts
//! the subject's contact while the subject is in `ALARM`.
//!
//! The loop never stops on its own. Registry and notifier failures are logged
//! and the next tick proceeds as usual; only the stop signal held by
//! [`WatchdogHandle`] ends it.

mod policy;
mod watchdog;

pub use policy::{AlertTracker, NotifyPolicy};
pub use watchdog::{TickReport, Watchdog, WatchdogConfig, WatchdogHandle, alert_text};
