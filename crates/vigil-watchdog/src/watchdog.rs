//! [`Watchdog`] — the periodic staleness pass — and its stop handle.

use std::{collections::HashSet, sync::Arc, time::Duration};

use chrono::{DateTime, TimeDelta, Utc};
use tokio::{sync::watch, task::JoinHandle};
use vigil_core::{
  StalenessPolicy, notify::Notifier, store::Registry, subject::Subject,
};

use crate::policy::{AlertTracker, NotifyPolicy};

// ─── Configuration ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
pub struct WatchdogConfig {
  /// Sleep between the end of one tick and the start of the next.
  pub interval:       Duration,
  /// Upper bound on a single notification attempt.
  pub notify_timeout: Duration,
  pub policy:         NotifyPolicy,
}

impl Default for WatchdogConfig {
  fn default() -> Self {
    Self {
      interval:       Duration::from_secs(60 * 60),
      notify_timeout: Duration::from_secs(10),
      policy:         NotifyPolicy::default(),
    }
  }
}

// ─── Tick report ─────────────────────────────────────────────────────────────

/// What happened during one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
  /// Enabled subjects evaluated.
  pub evaluated:  usize,
  /// Subjects found in `ALARM`.
  pub alarming:   usize,
  /// Notifications delivered.
  pub notified:   usize,
  /// Notification attempts that errored or timed out.
  pub failed:     usize,
  /// `ALARM` subjects with no usable contact.
  pub no_contact: usize,
  /// `ALARM` subjects silenced by the notify policy.
  pub suppressed: usize,
}

/// Alert text sent to the contact of an alarming subject.
pub fn alert_text(subject: &Subject, threshold: TimeDelta) -> String {
  format!(
    "⚠️ ALARM: {} (id {}) has not checked in for more than {}!",
    subject.display_name,
    subject.id,
    describe(threshold),
  )
}

fn describe(d: TimeDelta) -> String {
  let secs = d.num_seconds();
  let (n, unit) = if secs != 0 && secs % 3600 == 0 {
    (secs / 3600, "hour")
  } else if secs != 0 && secs % 60 == 0 {
    (secs / 60, "minute")
  } else {
    (secs, "second")
  };
  if n == 1 { format!("1 {unit}") } else { format!("{n} {unit}s") }
}

// ─── Watchdog ────────────────────────────────────────────────────────────────

/// Evaluates every enabled subject once per tick and notifies contacts of
/// alarming subjects.
pub struct Watchdog<R, N> {
  registry:  Arc<R>,
  notifier:  Arc<N>,
  staleness: StalenessPolicy,
  config:    WatchdogConfig,
  tracker:   AlertTracker,
}

impl<R, N> Watchdog<R, N>
where
  R: Registry + 'static,
  N: Notifier + 'static,
{
  pub fn new(
    registry: Arc<R>,
    notifier: Arc<N>,
    staleness: StalenessPolicy,
    config: WatchdogConfig,
  ) -> Self {
    Self {
      registry,
      notifier,
      staleness,
      config,
      tracker: AlertTracker::new(config.policy),
    }
  }

  /// Run one evaluation pass as of `now`.
  ///
  /// Only a failure to list subjects is returned; per-subject notification
  /// failures are logged and counted in the report.
  pub async fn tick(&mut self, now: DateTime<Utc>) -> Result<TickReport, R::Error> {
    let subjects = self.registry.list_enabled().await?;
    let mut report = TickReport::default();

    for subject in &subjects {
      if !subject.enabled {
        continue;
      }
      report.evaluated += 1;

      let status = self.staleness.evaluate(now, subject.last_checkin_at);
      let notify = self.tracker.should_notify(&subject.id, status);
      if !status.is_alarm() {
        continue;
      }
      report.alarming += 1;

      if !notify {
        report.suppressed += 1;
        continue;
      }

      let Some(contact) = subject.contact() else {
        tracing::warn!(subject_id = %subject.id, "subject is alarming but has no contact; skipping");
        report.no_contact += 1;
        continue;
      };

      let text = alert_text(subject, self.staleness.threshold);
      let attempt = tokio::time::timeout(
        self.config.notify_timeout,
        self.notifier.send(contact, &text),
      )
      .await;

      match attempt {
        Ok(Ok(())) => {
          tracing::info!(subject_id = %subject.id, contact_id = %contact, "alarm sent");
          self.tracker.mark_notified(&subject.id);
          report.notified += 1;
        }
        Ok(Err(e)) => {
          tracing::warn!(subject_id = %subject.id, contact_id = %contact, error = %e, "alarm delivery failed");
          report.failed += 1;
        }
        Err(_) => {
          tracing::warn!(
            subject_id = %subject.id,
            contact_id = %contact,
            timeout = ?self.config.notify_timeout,
            "alarm delivery timed out"
          );
          report.failed += 1;
        }
      }
    }

    let seen: HashSet<&str> = subjects.iter().map(|s| s.id.as_str()).collect();
    self.tracker.retain_seen(&seen);

    Ok(report)
  }

  /// Tick, sleep, repeat — until `stop` flips to `true` or its sender is
  /// dropped. The signal is observed between ticks and during the sleep.
  pub async fn run(mut self, mut stop: watch::Receiver<bool>) {
    tracing::info!(
      interval = ?self.config.interval,
      threshold_secs = self.staleness.threshold.num_seconds(),
      policy = ?self.tracker.policy(),
      "watchdog started"
    );

    loop {
      if *stop.borrow() {
        break;
      }

      match self.tick(Utc::now()).await {
        Ok(report) => tracing::info!(
          evaluated = report.evaluated,
          alarming = report.alarming,
          notified = report.notified,
          failed = report.failed,
          no_contact = report.no_contact,
          suppressed = report.suppressed,
          "watchdog tick"
        ),
        Err(e) => tracing::error!(error = %e, "watchdog tick failed to list subjects"),
      }

      tokio::select! {
        _ = tokio::time::sleep(self.config.interval) => {}
        changed = stop.changed() => {
          if changed.is_err() || *stop.borrow() {
            break;
          }
        }
      }
    }

    tracing::info!("watchdog stopped");
  }

  /// Spawn [`Self::run`] on the current runtime.
  pub fn spawn(self) -> WatchdogHandle {
    let (stop_tx, stop_rx) = watch::channel(false);
    let task = tokio::spawn(self.run(stop_rx));
    WatchdogHandle { stop_tx, task }
  }
}

// ─── Handle ──────────────────────────────────────────────────────────────────

/// Handle for a spawned watchdog.
///
/// Dropping the handle also stops the loop; call [`Self::stop`] to wait for
/// it to finish.
pub struct WatchdogHandle {
  stop_tx: watch::Sender<bool>,
  task:    JoinHandle<()>,
}

impl WatchdogHandle {
  /// Signal the loop and wait for the in-flight tick (if any) to complete.
  pub async fn stop(self) {
    let _ = self.stop_tx.send(true);
    if let Err(e) = self.task.await {
      tracing::error!(error = %e, "watchdog task panicked");
    }
  }

  pub fn is_finished(&self) -> bool { self.task.is_finished() }
}
