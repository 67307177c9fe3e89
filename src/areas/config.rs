//! Repository configuration (`.gible/config.toml`)
//!
//! Every field has a default, so a missing file or a partial file is valid.
//! A few settings can be overridden from the environment:
//!
//! - `GIBLE_AUTHOR_NAME`, `GIBLE_AUTHOR_EMAIL`: commit author identity
//! - `GIBLE_AUTHOR_DATE`: fixed author timestamp (`%Y-%m-%d %H:%M:%S %z` or RFC 2822)
//! - `GIBLE_LOCK_TIMEOUT_MS`: how long mutating operations wait for the repository lock

use crate::artifacts::objects::commit::Author;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const AUTHOR_NAME_ENV: &str = "GIBLE_AUTHOR_NAME";
pub const AUTHOR_EMAIL_ENV: &str = "GIBLE_AUTHOR_EMAIL";
pub const AUTHOR_DATE_ENV: &str = "GIBLE_AUTHOR_DATE";
pub const LOCK_TIMEOUT_ENV: &str = "GIBLE_LOCK_TIMEOUT_MS";

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub user: UserConfig,
    #[serde(default)]
    pub delta: DeltaConfig,
    #[serde(default)]
    pub lock: LockConfig,
    #[serde(default)]
    pub merge: MergeConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserConfig {
    #[serde(default = "default_user_name")]
    pub name: String,
    #[serde(default = "default_user_email")]
    pub email: String,
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            name: default_user_name(),
            email: default_user_email(),
        }
    }
}

fn default_user_name() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string())
}

fn default_user_email() -> String {
    format!("{}@localhost", default_user_name())
}

/// Limits applied when deciding between a full copy and a patch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeltaConfig {
    /// Maximum number of patches between a blob and its nearest full copy.
    #[serde(default = "default_max_chain_depth")]
    pub max_chain_depth: u32,
    /// Versions whose sizes differ by more than this factor are stored in full.
    #[serde(default = "default_max_size_ratio")]
    pub max_size_ratio: f64,
}

impl Default for DeltaConfig {
    fn default() -> Self {
        Self {
            max_chain_depth: default_max_chain_depth(),
            max_size_ratio: default_max_size_ratio(),
        }
    }
}

const fn default_max_chain_depth() -> u32 {
    8
}

const fn default_max_size_ratio() -> f64 {
    4.0
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LockConfig {
    #[serde(default = "default_lock_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_lock_timeout_ms(),
        }
    }
}

const fn default_lock_timeout_ms() -> u64 {
    5000
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MergeConfig {
    /// Merge text files changed on both sides when their edited regions do not overlap.
    #[serde(default)]
    pub auto_resolve_text: bool,
}

impl Config {
    /// Load the configuration file, falling back to defaults when it does not exist,
    /// then apply environment overrides.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config file {}", path.display()))?;
            Self::parse(&content)
                .with_context(|| format!("failed to parse config file {}", path.display()))?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self).context("failed to serialize config")?;
        std::fs::write(path, content)
            .with_context(|| format!("failed to write config file {}", path.display()))
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(name) = std::env::var(AUTHOR_NAME_ENV) {
            self.user.name = name;
        }
        if let Ok(email) = std::env::var(AUTHOR_EMAIL_ENV) {
            self.user.email = email;
        }
        if let Some(timeout_ms) = std::env::var(LOCK_TIMEOUT_ENV)
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
        {
            self.lock.timeout_ms = timeout_ms;
        }
    }

    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock.timeout_ms)
    }

    /// Author for a new commit, stamped with `GIBLE_AUTHOR_DATE` when set or the current time.
    pub fn author(&self) -> Author {
        let timestamp = std::env::var(AUTHOR_DATE_ENV).ok().and_then(|date| {
            chrono::DateTime::parse_from_rfc2822(&date)
                .or_else(|_| chrono::DateTime::parse_from_str(&date, "%Y-%m-%d %H:%M:%S %z"))
                .ok()
        });

        match timestamp {
            Some(timestamp) => {
                Author::new_with_timestamp(self.user.name.clone(), self.user.email.clone(), timestamp)
            }
            None => Author::new(self.user.name.clone(), self.user.email.clone()),
        }
    }
}
