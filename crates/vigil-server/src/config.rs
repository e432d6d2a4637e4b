//! Runtime configuration.
//!
//! Sources, lowest precedence first:
//!
//! 1. built-in defaults
//! 2. the TOML file (`--config`, optional)
//! 3. `VIGIL_*` environment variables, e.g. `VIGIL_PORT=9000`
//! 4. `TELEGRAM_BOT_TOKEN`, which sets `bot_token`

use std::{path::{Path, PathBuf}, time::Duration};

use chrono::TimeDelta;
use config::{Config, Environment, File, Map};
use serde::Deserialize;
use vigil_core::{StalenessPolicy, status::DEFAULT_THRESHOLD_SECS};
use vigil_telegram::{PollConfig, TelegramConfig, client::DEFAULT_API_URL};
use vigil_watchdog::{NotifyPolicy, WatchdogConfig};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
  #[error(transparent)]
  Source(#[from] config::ConfigError),

  #[error("TELEGRAM_BOT_TOKEN is not set")]
  MissingBotToken,

  #[error("invalid configuration: {0}")]
  Invalid(String),
}

/// Runtime server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  pub host:                   String,
  pub port:                   u16,
  pub database_path:          PathBuf,
  /// Where the bot sends `/register` and `/checkin`.
  pub api_base_url:           String,
  pub telegram_api_url:       String,
  pub bot_token:              String,
  /// Watchdog tick interval.
  pub poll_interval_secs:     u64,
  pub threshold_secs:         i64,
  pub notify_timeout_secs:    u64,
  pub notify_policy:          NotifyPolicy,
  /// `getUpdates` long-poll duration in `poll` mode.
  pub long_poll_timeout_secs: u64,
  /// Pause after a failed `getUpdates` in `poll` mode.
  pub poll_backoff_secs:      u64,
  /// Public URL registered by `set-webhook`.
  #[serde(default)]
  pub webhook_url:            Option<String>,
}

impl ServerConfig {
  /// Load from `path` and the process environment.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    Self::from_sources(Some(path), None, std::env::var("TELEGRAM_BOT_TOKEN").ok())
  }

  /// Load from explicit sources. `env` replaces the process environment as
  /// the source of `VIGIL_*` variables when given.
  pub fn from_sources(
    file: Option<&Path>,
    env: Option<Map<String, String>>,
    bot_token: Option<String>,
  ) -> Result<Self, ConfigError> {
    let mut builder = Config::builder()
      .set_default("host", "0.0.0.0")?
      .set_default("port", 8000)?
      .set_default("database_path", "vigil.db")?
      .set_default("api_base_url", "http://127.0.0.1:8000")?
      .set_default("telegram_api_url", DEFAULT_API_URL)?
      .set_default("bot_token", "")?
      .set_default("poll_interval_secs", 60 * 60)?
      .set_default("threshold_secs", DEFAULT_THRESHOLD_SECS)?
      .set_default("notify_timeout_secs", 10)?
      .set_default("notify_policy", "every_tick")?
      .set_default("long_poll_timeout_secs", 30)?
      .set_default("poll_backoff_secs", 5)?;

    if let Some(path) = file {
      builder = builder.add_source(File::from(path).required(false));
    }

    let settings = builder
      .add_source(
        Environment::with_prefix("VIGIL")
          .try_parsing(true)
          .source(env),
      )
      .set_override_option("bot_token", bot_token.filter(|t| !t.trim().is_empty()))?
      .build()?;

    let cfg: Self = settings.try_deserialize()?;
    cfg.validate()?;
    Ok(cfg)
  }

  fn validate(&self) -> Result<(), ConfigError> {
    if self.bot_token.trim().is_empty() {
      return Err(ConfigError::MissingBotToken);
    }
    if self.threshold_secs <= 0 {
      return Err(ConfigError::Invalid("threshold_secs must be positive".into()));
    }
    if self.poll_interval_secs == 0 {
      return Err(ConfigError::Invalid("poll_interval_secs must be positive".into()));
    }
    Ok(())
  }

  pub fn bind_address(&self) -> String { format!("{}:{}", self.host, self.port) }

  pub fn staleness(&self) -> StalenessPolicy {
    StalenessPolicy::new(TimeDelta::seconds(self.threshold_secs))
  }

  pub fn watchdog(&self) -> WatchdogConfig {
    WatchdogConfig {
      interval:       Duration::from_secs(self.poll_interval_secs),
      notify_timeout: Duration::from_secs(self.notify_timeout_secs),
      policy:         self.notify_policy,
    }
  }

  pub fn polling(&self) -> PollConfig {
    PollConfig {
      timeout_secs: self.long_poll_timeout_secs,
      backoff:      Duration::from_secs(self.poll_backoff_secs),
    }
  }

  /// The request timeout is kept above the long-poll duration so that an
  /// idle `getUpdates` is not cut off.
  pub fn telegram(&self) -> TelegramConfig {
    let mut tg = TelegramConfig::new(self.bot_token.clone());
    tg.api_url = self.telegram_api_url.clone();
    tg.request_timeout = tg
      .request_timeout
      .max(Duration::from_secs(self.long_poll_timeout_secs + 10));
    tg
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn env(pairs: &[(&str, &str)]) -> Option<Map<String, String>> {
    Some(
      pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect(),
    )
  }

  #[test]
  fn defaults_apply_when_only_the_token_is_given() {
    let cfg = ServerConfig::from_sources(None, env(&[]), Some("123:abc".into())).unwrap();
    assert_eq!(cfg.bot_token, "123:abc");
    assert_eq!(cfg.bind_address(), "0.0.0.0:8000");
    assert_eq!(cfg.staleness(), StalenessPolicy::default());
    assert_eq!(cfg.watchdog().interval, Duration::from_secs(3600));
    assert_eq!(cfg.watchdog().notify_timeout, Duration::from_secs(10));
    assert_eq!(cfg.notify_policy, NotifyPolicy::EveryTick);
    assert_eq!(cfg.telegram().api_url, DEFAULT_API_URL);
    assert!(cfg.webhook_url.is_none());
    assert_eq!(cfg.polling(), PollConfig::default());
  }

  #[test]
  fn missing_or_blank_token_fails_fast() {
    for token in [None, Some("   ".to_string())] {
      let err = ServerConfig::from_sources(None, env(&[]), token).unwrap_err();
      assert!(matches!(err, ConfigError::MissingBotToken), "{err}");
    }
  }

  #[test]
  fn environment_overrides_defaults() {
    let cfg = ServerConfig::from_sources(
      None,
      env(&[
        ("VIGIL_PORT", "9000"),
        ("VIGIL_POLL_INTERVAL_SECS", "30"),
        ("VIGIL_NOTIFY_POLICY", "once_per_episode"),
        ("VIGIL_BOT_TOKEN", "from-env"),
      ]),
      None,
    )
    .unwrap();
    assert_eq!(cfg.port, 9000);
    assert_eq!(cfg.watchdog().interval, Duration::from_secs(30));
    assert_eq!(cfg.notify_policy, NotifyPolicy::OncePerEpisode);
    assert_eq!(cfg.bot_token, "from-env");
  }

  #[test]
  fn telegram_token_variable_wins_over_vigil_prefix() {
    let cfg = ServerConfig::from_sources(
      None,
      env(&[("VIGIL_BOT_TOKEN", "from-env")]),
      Some("from-telegram-var".into()),
    )
    .unwrap();
    assert_eq!(cfg.bot_token, "from-telegram-var");
  }

  #[test]
  fn file_values_are_read_and_missing_file_is_tolerated() {
    let dir = std::env::temp_dir().join(format!("vigil-config-test-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("config.toml");
    std::fs::write(
      &path,
      "threshold_secs = 120\nwebhook_url = \"https://example.org/webhook\"\n",
    )
    .unwrap();

    let cfg = ServerConfig::from_sources(Some(&path), env(&[]), Some("t".into())).unwrap();
    assert_eq!(cfg.staleness().threshold, TimeDelta::minutes(2));
    assert_eq!(cfg.webhook_url.as_deref(), Some("https://example.org/webhook"));

    let missing = dir.join("absent.toml");
    assert!(ServerConfig::from_sources(Some(&missing), env(&[]), Some("t".into())).is_ok());

    std::fs::remove_dir_all(&dir).ok();
  }

  #[test]
  fn non_positive_threshold_is_rejected() {
    let err = ServerConfig::from_sources(
      None,
      env(&[("VIGIL_THRESHOLD_SECS", "0")]),
      Some("t".into()),
    )
    .unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)), "{err}");
  }

  #[test]
  fn long_poll_keeps_request_timeout_above_it() {
    let cfg = ServerConfig::from_sources(
      None,
      env(&[("VIGIL_LONG_POLL_TIMEOUT_SECS", "120")]),
      Some("t".into()),
    )
    .unwrap();
    assert_eq!(cfg.telegram().request_timeout, Duration::from_secs(130));
  }

  #[test]
  fn poll_backoff_is_configurable() {
    let cfg = ServerConfig::from_sources(
      None,
      env(&[("VIGIL_POLL_BACKOFF_SECS", "1")]),
      Some("t".into()),
    )
    .unwrap();
    assert_eq!(cfg.polling().backoff, Duration::from_secs(1));
  }
}
