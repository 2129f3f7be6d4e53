use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::collections::OrderPolicy;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    #[serde(default, rename = "loop")]
    pub loop_cfg: LoopConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoopConfig {
    /// Target fixed updates per second.
    #[serde(default = "default_update_rate")]
    pub update_rate: u32,
    /// Sleep off the remaining interval when running ahead.
    #[serde(default = "default_sleep_when_idle")]
    pub sleep_when_idle: bool,
    /// Catch-up ticks allowed per iteration. 0 means unbounded.
    #[serde(default)]
    pub max_catch_up_ticks: u32,
    #[serde(default)]
    pub lag_overrun: LagOverrunAction,
    #[serde(default)]
    pub order_policy: OrderPolicy,
}

fn default_update_rate() -> u32 { 30 }
fn default_sleep_when_idle() -> bool { true }

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            update_rate: default_update_rate(),
            sleep_when_idle: default_sleep_when_idle(),
            max_catch_up_ticks: 0,
            lag_overrun: LagOverrunAction::default(),
            order_policy: OrderPolicy::default(),
        }
    }
}

/// What happens when the catch-up cap is hit with backlog left.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LagOverrunAction {
    /// Warn, report to telemetry and discard the backlog.
    #[default]
    Drop,
    /// End the run with `TickError::LagOverrun`.
    Fail,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_rates")]
    pub log_rates: bool,
    #[serde(default = "default_log_period_ms")]
    pub log_period_ms: u32,
}

fn default_log_rates() -> bool { true }
fn default_log_period_ms() -> u32 { 1000 }

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_rates: default_log_rates(),
            log_period_ms: default_log_period_ms(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    ZeroUpdateRate,
    ZeroLogPeriod,
    UnknownFormat(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ZeroUpdateRate => write!(f, "loop.update_rate must be greater than 0"),
            ConfigError::ZeroLogPeriod => write!(f, "telemetry.log_period_ms must be greater than 0"),
            ConfigError::UnknownFormat(ext) => {
                write!(f, "unsupported config format '{ext}' (expected .toml or .json)")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl SchedulerConfig {
    /// Milliseconds per fixed tick.
    #[inline]
    pub fn update_interval_ms(&self) -> f64 {
        1000.0 / f64::from(self.loop_cfg.update_rate.max(1))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.loop_cfg.update_rate == 0 {
            return Err(ConfigError::ZeroUpdateRate);
        }
        if self.telemetry.log_period_ms == 0 {
            return Err(ConfigError::ZeroLogPeriod);
        }
        Ok(())
    }

    pub fn from_toml_str(text: &str) -> anyhow::Result<Self> {
        let cfg: SchedulerConfig = toml::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_json_str(text: &str) -> anyhow::Result<Self> {
        let cfg: SchedulerConfig = serde_json::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Loads `.toml` or `.json` by extension.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();

        match ext.as_str() {
            "toml" => Self::from_toml_str(&text),
            "json" => Self::from_json_str(&text),
            _ => Err(ConfigError::UnknownFormat(ext).into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_yields_defaults() {
        let cfg = SchedulerConfig::from_toml_str("").unwrap();
        assert_eq!(cfg, SchedulerConfig::default());
        assert_eq!(cfg.loop_cfg.update_rate, 30);
        assert!((cfg.update_interval_ms() - 1000.0 / 30.0).abs() < 1e-9);
    }

    #[test]
    fn toml_sections_override_fields() {
        let cfg = SchedulerConfig::from_toml_str(
            r#"
            [loop]
            update_rate = 100
            sleep_when_idle = false
            max_catch_up_ticks = 8
            lag_overrun = "fail"
            order_policy = "legacy"

            [telemetry]
            log_rates = false
            "#,
        )
        .unwrap();

        assert_eq!(cfg.update_interval_ms(), 10.0);
        assert!(!cfg.loop_cfg.sleep_when_idle);
        assert_eq!(cfg.loop_cfg.max_catch_up_ticks, 8);
        assert_eq!(cfg.loop_cfg.lag_overrun, LagOverrunAction::Fail);
        assert_eq!(cfg.loop_cfg.order_policy, OrderPolicy::Legacy);
        assert!(!cfg.telemetry.log_rates);
        assert_eq!(cfg.telemetry.log_period_ms, 1000);
    }

    #[test]
    fn json_is_accepted_too() {
        let cfg = SchedulerConfig::from_json_str(
            r#"{ "loop": { "update_rate": 60, "order_policy": "id_tie_break" } }"#,
        )
        .unwrap();
        assert_eq!(cfg.loop_cfg.update_rate, 60);
        assert!(cfg.loop_cfg.sleep_when_idle);
    }

    #[test]
    fn zero_rate_is_rejected() {
        let err = SchedulerConfig::from_toml_str("[loop]\nupdate_rate = 0\n").unwrap_err();
        assert_eq!(
            err.downcast_ref::<ConfigError>(),
            Some(&ConfigError::ZeroUpdateRate)
        );
    }

    #[test]
    fn load_rejects_unknown_extensions() {
        let path = std::env::temp_dir().join(format!("steadytick-{}.yaml", std::process::id()));
        fs::write(&path, "loop: {}").unwrap();
        let err = SchedulerConfig::load(&path).unwrap_err();
        let _ = fs::remove_file(&path);
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::UnknownFormat(ext)) if ext == "yaml"
        ));
    }
}
