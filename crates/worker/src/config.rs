use std::path::PathBuf;
use std::time::Duration;

use chrono::NaiveDate;

/// Default rules directory, relative to the working directory.
pub const DEFAULT_RULES_DIR: &str = "rules";

/// Default rule collection.
pub const DEFAULT_COLLECTION: &str = "SUMMER_2025";

const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 5;
const DEFAULT_VALIDATION_CONCURRENCY: usize = 8;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    Missing(&'static str),

    #[error("{var} has invalid value '{value}': {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Sync worker configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub database_url: String,
    pub rules_dir: PathBuf,
    pub rules_collection: String,
    /// Overrides the collection's event date when set.
    pub event_date: Option<NaiveDate>,
    /// Probe photo URLs over HTTP during validation.
    pub live_test: bool,
    pub photo_probe_timeout: Duration,
    /// Upper bound on participants validated at once.
    pub validation_concurrency: usize,
}

impl SyncConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var                    | Default       |
    /// |----------------------------|---------------|
    /// | `DATABASE_URL`             | required      |
    /// | `RULES_DIR`                | `rules`       |
    /// | `RULES_COLLECTION`         | `SUMMER_2025` |
    /// | `SPORTS_FEST_DATE`         | unset         |
    /// | `LIVE_TEST`                | `false`       |
    /// | `PHOTO_PROBE_TIMEOUT_SECS` | `5`           |
    /// | `VALIDATION_CONCURRENCY`   | `8`           |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| get(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let database_url = var("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let event_date = var("SPORTS_FEST_DATE")
            .map(|raw| {
                NaiveDate::parse_from_str(&raw, "%Y-%m-%d").map_err(|e| ConfigError::Invalid {
                    var: "SPORTS_FEST_DATE",
                    value: raw.clone(),
                    reason: e.to_string(),
                })
            })
            .transpose()?;

        let live_test = match var("LIVE_TEST") {
            None => false,
            Some(raw) => match raw.to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" => true,
                "false" | "0" | "no" => false,
                _ => {
                    return Err(ConfigError::Invalid {
                        var: "LIVE_TEST",
                        value: raw,
                        reason: "expected true or false".into(),
                    })
                }
            },
        };

        let timeout_secs = parse_number(
            "PHOTO_PROBE_TIMEOUT_SECS",
            var("PHOTO_PROBE_TIMEOUT_SECS"),
            DEFAULT_PROBE_TIMEOUT_SECS,
        )?;

        let validation_concurrency = parse_number(
            "VALIDATION_CONCURRENCY",
            var("VALIDATION_CONCURRENCY"),
            DEFAULT_VALIDATION_CONCURRENCY,
        )?;
        if validation_concurrency == 0 {
            return Err(ConfigError::Invalid {
                var: "VALIDATION_CONCURRENCY",
                value: "0".into(),
                reason: "must be at least 1".into(),
            });
        }

        Ok(Self {
            database_url,
            rules_dir: var("RULES_DIR")
                .unwrap_or_else(|| DEFAULT_RULES_DIR.into())
                .into(),
            rules_collection: var("RULES_COLLECTION").unwrap_or_else(|| DEFAULT_COLLECTION.into()),
            event_date,
            live_test,
            photo_probe_timeout: Duration::from_secs(timeout_secs),
            validation_concurrency,
        })
    }
}

fn parse_number<T>(var: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(raw) => raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
            var,
            reason: e.to_string(),
            value: raw,
        }),
    }
}
