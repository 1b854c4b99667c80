// src/config.rs
use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::aggregator::{self, Aggregator};

pub const ENV_CONFIG_PATH: &str = "WINDOW_CONFIG_PATH";
pub const ENV_WINDOW_MS: &str = "WINDOW_MS";
pub const ENV_REPORT_INTERVAL_MS: &str = "WINDOW_REPORT_INTERVAL_MS";
pub const ENV_BIND_ADDR: &str = "WINDOW_BIND_ADDR";
pub const ENV_AGGREGATORS: &str = "WINDOW_AGGREGATORS";

pub const DEFAULT_CONFIG_PATH: &str = "config/window.toml";

/// Service settings. Every field has a default so a partial TOML file is fine.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub window_ms: u64,
    pub report_interval_ms: u64,
    pub bind_addr: String,
    pub aggregators: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            window_ms: 3_000,
            report_interval_ms: 1_000,
            bind_addr: "0.0.0.0:8081".to_string(),
            aggregators: vec!["average".to_string(), "sum".to_string()],
        }
    }
}

impl Settings {
    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }

    pub fn report_interval(&self) -> Duration {
        Duration::from_millis(self.report_interval_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.window_ms == 0 {
            bail!("window_ms must be positive");
        }
        if self.report_interval_ms == 0 {
            bail!("report_interval_ms must be positive");
        }
        if self.aggregators.is_empty() {
            bail!("at least one aggregator must be configured");
        }
        Ok(())
    }

    /// Resolve configured names to built-in aggregators, keeping their order.
    pub fn build_aggregators(&self) -> Result<Vec<Box<dyn Aggregator>>> {
        self.aggregators
            .iter()
            .map(|name| {
                aggregator::builtin(name).ok_or_else(|| anyhow!("unknown aggregator '{name}'"))
            })
            .collect()
    }

    /// Apply `WINDOW_*` environment overrides on top of file/default values.
    pub fn apply_env(mut self) -> Result<Self> {
        if let Ok(v) = std::env::var(ENV_WINDOW_MS) {
            self.window_ms = v
                .trim()
                .parse()
                .with_context(|| format!("parsing {ENV_WINDOW_MS}='{v}'"))?;
        }
        if let Ok(v) = std::env::var(ENV_REPORT_INTERVAL_MS) {
            self.report_interval_ms = v
                .trim()
                .parse()
                .with_context(|| format!("parsing {ENV_REPORT_INTERVAL_MS}='{v}'"))?;
        }
        if let Ok(v) = std::env::var(ENV_BIND_ADDR) {
            let v = v.trim();
            if !v.is_empty() {
                self.bind_addr = v.to_string();
            }
        }
        if let Ok(v) = std::env::var(ENV_AGGREGATORS) {
            self.aggregators = split_list(&v);
        }
        Ok(self)
    }
}

/// Load settings from an explicit TOML file.
pub fn load_settings_from(path: &Path) -> Result<Settings> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading window settings from {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))
}

/// Load settings using env var + fallbacks, then env overrides:
/// 1) $WINDOW_CONFIG_PATH
/// 2) config/window.toml
/// 3) built-in defaults
pub fn load_settings_default() -> Result<Settings> {
    let base = if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
        let pb = PathBuf::from(p);
        if !pb.exists() {
            return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
        }
        load_settings_from(&pb)?
    } else {
        let default_p = PathBuf::from(DEFAULT_CONFIG_PATH);
        if default_p.exists() {
            load_settings_from(&default_p)?
        } else {
            Settings::default()
        }
    };

    let settings = base.apply_env()?;
    settings.validate()?;
    Ok(settings)
}

fn split_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let s: Settings = toml::from_str("window_ms = 500").unwrap();
        assert_eq!(s.window_ms, 500);
        assert_eq!(s.report_interval_ms, 1_000);
        assert_eq!(s.aggregators, vec!["average", "sum"]);
    }

    #[test]
    fn split_list_trims_and_drops_empty() {
        assert_eq!(split_list(" avg, ,sum ,"), vec!["avg", "sum"]);
    }

    #[test]
    fn validate_rejects_zero_window() {
        let s = Settings {
            window_ms: 0,
            ..Settings::default()
        };
        assert!(s.validate().is_err());
    }

    #[test]
    fn unknown_aggregator_is_an_error() {
        let s = Settings {
            aggregators: vec!["average".into(), "p99".into()],
            ..Settings::default()
        };
        let err = s.build_aggregators().err().unwrap();
        assert!(err.to_string().contains("p99"));
    }
}
