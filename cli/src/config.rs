//! CLI configuration: `legacy-clock.toml` plus `LEGACY_CLOCK_*` overrides.

use anyhow::{Context, Result};
use legacy_clock_core::validation::ValidationPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "legacy-clock.toml";
pub const DEFAULT_STORE_PATH: &str = ".legacy-clock/store.json";

pub const ENV_STORE_PATH: &str = "LEGACY_CLOCK_STORE_PATH";
pub const ENV_STRICT_VALIDATION: &str = "LEGACY_CLOCK_STRICT_VALIDATION";
pub const ENV_LOG_LEVEL: &str = "LEGACY_CLOCK_LOG_LEVEL";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LegacyClockConfig {
    /// JSON file backing the key-value store.
    pub store_path: PathBuf,
    /// Apply the creation form's address and length rules.
    pub strict_validation: bool,
    /// Default `EnvFilter` directive when `RUST_LOG` is unset.
    pub log_level: String,
    pub log_format: LogFormat,
}

impl Default for LegacyClockConfig {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from(DEFAULT_STORE_PATH),
            strict_validation: false,
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}

impl LegacyClockConfig {
    /// Load `explicit`, else `legacy-clock.toml` in the working directory if it
    /// exists, else defaults; then apply environment overrides.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };
        config.apply_env(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml(&raw)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Override fields from the environment. `lookup` is `std::env::var` outside tests.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(ENV_STORE_PATH).filter(|v| !v.trim().is_empty()) {
            self.store_path = PathBuf::from(path);
        }
        if let Some(raw) = lookup(ENV_STRICT_VALIDATION) {
            self.strict_validation = parse_bool(&raw)
                .with_context(|| format!("Invalid {ENV_STRICT_VALIDATION}: {raw:?}"))?;
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL).filter(|v| !v.trim().is_empty()) {
            self.log_level = level;
        }
        Ok(())
    }

    pub fn validation_policy(&self) -> ValidationPolicy {
        if self.strict_validation {
            ValidationPolicy::Strict
        } else {
            ValidationPolicy::Lenient
        }
    }
}

fn parse_bool(raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => anyhow::bail!("expected a boolean, got {other:?}"),
    }
}
