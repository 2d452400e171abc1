//! Configuration for the release watcher.
//!
//! Settings load from environment variables with sensible defaults; CLI
//! flags override individual fields afterwards.
//!
//! # Environment Variables
//!
//! - `ISOWATCH_INDEX_ENDPOINT`: release index URL - default: UUP Dump `listid.php`
//! - `ISOWATCH_TRACKING_FILE`: ledger path - default: "tracked_releases.json"
//! - `ISOWATCH_REQUEST_TIMEOUT`: timeout in seconds - default: "30"
//! - `ISOWATCH_EDITIONS`: comma-separated SKU codes - default: "1,6"
//! - `ISOWATCH_BUILD_TYPES`: comma-separated trim levels - default: "standard,core,nano"

use crate::matrix::{edition_name, BuildType};
use std::env;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

const DEFAULT_INDEX_ENDPOINT: &str = "https://api.uupdump.net/listid.php";
const DEFAULT_TRACKING_FILE: &str = "tracked_releases.json";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_EDITIONS: &[u8] = &[1, 6];
const DEFAULT_BUILD_TYPES: &[&str] = &["standard", "core", "nano"];

/// Configuration errors. All of these fail the run before any network or
/// ledger activity.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown edition code {0} (known codes: 1=Home, 4=Education, 6=Pro, 7=Pro N)")]
    UnknownEdition(u8),

    #[error("unknown build type '{0}' (known types: standard, core, nano)")]
    UnknownBuildType(String),

    #[error("configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Runtime configuration for a detection run.
#[derive(Debug, Clone)]
pub struct WatchConfig {
    /// Release index query endpoint.
    pub index_endpoint: String,

    /// Path of the persistent release ledger.
    pub tracking_file: PathBuf,

    /// Index request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Edition SKU codes crossed into the matrix, in emission order.
    pub editions: Vec<u8>,

    /// Build types crossed into the matrix, in emission order.
    pub build_types: Vec<String>,
}

impl Default for WatchConfig {
    /// Load from `ISOWATCH_*` environment variables, falling back to
    /// defaults for anything unset or unparseable. `validate()` is where
    /// bad values become hard errors.
    fn default() -> Self {
        let index_endpoint = env::var("ISOWATCH_INDEX_ENDPOINT")
            .unwrap_or_else(|_| DEFAULT_INDEX_ENDPOINT.to_string());

        let tracking_file = env::var("ISOWATCH_TRACKING_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_TRACKING_FILE));

        let request_timeout_secs = env::var("ISOWATCH_REQUEST_TIMEOUT")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);

        let editions = env::var("ISOWATCH_EDITIONS")
            .ok()
            .and_then(|v| parse_code_list(&v))
            .unwrap_or_else(|| DEFAULT_EDITIONS.to_vec());

        let build_types = env::var("ISOWATCH_BUILD_TYPES")
            .ok()
            .map(|v| {
                v.split(',')
                    .map(|part| part.trim().to_string())
                    .filter(|part| !part.is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|list| !list.is_empty())
            .unwrap_or_else(|| {
                DEFAULT_BUILD_TYPES.iter().map(|s| s.to_string()).collect()
            });

        Self {
            index_endpoint,
            tracking_file,
            request_timeout_secs,
            editions,
            build_types,
        }
    }
}

impl WatchConfig {
    /// Validate the configuration. Unknown edition or build-type codes are
    /// rejected here, at startup, never mid-run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.index_endpoint.is_empty() {
            return Err(ConfigError::ValidationFailed(
                "Index endpoint must not be empty".to_string(),
            ));
        }

        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationFailed(
                "Request timeout must be at least 1 second".to_string(),
            ));
        }
        if self.request_timeout_secs > 600 {
            return Err(ConfigError::ValidationFailed(
                "Request timeout cannot exceed 10 minutes".to_string(),
            ));
        }

        if self.editions.is_empty() {
            return Err(ConfigError::ValidationFailed(
                "At least one edition code is required".to_string(),
            ));
        }
        for &code in &self.editions {
            if edition_name(code).is_none() {
                return Err(ConfigError::UnknownEdition(code));
            }
        }

        if self.build_types.is_empty() {
            return Err(ConfigError::ValidationFailed(
                "At least one build type is required".to_string(),
            ));
        }
        for raw in &self.build_types {
            raw.parse::<BuildType>()?;
        }

        Ok(())
    }
}

impl fmt::Display for WatchConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Isowatch Configuration:")?;
        writeln!(f, "  Index Endpoint: {}", self.index_endpoint)?;
        writeln!(f, "  Tracking File: {}", self.tracking_file.display())?;
        writeln!(f, "  Request Timeout: {}s", self.request_timeout_secs)?;
        writeln!(
            f,
            "  Editions: {}",
            self.editions
                .iter()
                .map(|code| code.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        )?;
        writeln!(f, "  Build Types: {}", self.build_types.join(", "))?;
        Ok(())
    }
}

fn parse_code_list(raw: &str) -> Option<Vec<u8>> {
    let codes: Vec<u8> = raw
        .split(',')
        .map(|part| part.trim())
        .filter(|part| !part.is_empty())
        .filter_map(|part| part.parse().ok())
        .collect();

    if codes.is_empty() {
        None
    } else {
        Some(codes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    /// Helper to temporarily set environment variables for testing
    struct EnvGuard {
        key: String,
        old_value: Option<String>,
    }

    impl EnvGuard {
        fn set(key: &str, value: &str) -> Self {
            let old_value = env::var(key).ok();
            env::set_var(key, value);
            Self {
                key: key.to_string(),
                old_value,
            }
        }

        fn unset(key: &str) -> Self {
            let old_value = env::var(key).ok();
            env::remove_var(key);
            Self {
                key: key.to_string(),
                old_value,
            }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            match &self.old_value {
                Some(v) => env::set_var(&self.key, v),
                None => env::remove_var(&self.key),
            }
        }
    }

    #[test]
    #[serial]
    fn test_default_configuration() {
        let _guards = vec![
            EnvGuard::unset("ISOWATCH_INDEX_ENDPOINT"),
            EnvGuard::unset("ISOWATCH_TRACKING_FILE"),
            EnvGuard::unset("ISOWATCH_REQUEST_TIMEOUT"),
            EnvGuard::unset("ISOWATCH_EDITIONS"),
            EnvGuard::unset("ISOWATCH_BUILD_TYPES"),
        ];

        let config = WatchConfig::default();

        assert_eq!(config.index_endpoint, DEFAULT_INDEX_ENDPOINT);
        assert_eq!(config.tracking_file, PathBuf::from(DEFAULT_TRACKING_FILE));
        assert_eq!(config.request_timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
        assert_eq!(config.editions, vec![1, 6]);
        assert_eq!(config.build_types, vec!["standard", "core", "nano"]);
        assert!(config.validate().is_ok());
    }

    #[test]
    #[serial]
    fn test_environment_variable_parsing() {
        let _guards = vec![
            EnvGuard::set("ISOWATCH_INDEX_ENDPOINT", "https://index.invalid/list"),
            EnvGuard::set("ISOWATCH_TRACKING_FILE", "/var/lib/isowatch/ledger.json"),
            EnvGuard::set("ISOWATCH_REQUEST_TIMEOUT", "60"),
            EnvGuard::set("ISOWATCH_EDITIONS", "1, 4, 6"),
            EnvGuard::set("ISOWATCH_BUILD_TYPES", "standard,nano"),
        ];

        let config = WatchConfig::default();

        assert_eq!(config.index_endpoint, "https://index.invalid/list");
        assert_eq!(
            config.tracking_file,
            PathBuf::from("/var/lib/isowatch/ledger.json")
        );
        assert_eq!(config.request_timeout_secs, 60);
        assert_eq!(config.editions, vec![1, 4, 6]);
        assert_eq!(config.build_types, vec!["standard", "nano"]);
    }

    #[test]
    #[serial]
    fn test_garbage_edition_list_falls_back_to_default() {
        let _guards = vec![EnvGuard::set("ISOWATCH_EDITIONS", "a,b")];
        let config = WatchConfig::default();
        assert_eq!(config.editions, vec![1, 6]);
    }

    fn valid_config() -> WatchConfig {
        WatchConfig {
            index_endpoint: DEFAULT_INDEX_ENDPOINT.to_string(),
            tracking_file: PathBuf::from(DEFAULT_TRACKING_FILE),
            request_timeout_secs: 30,
            editions: vec![1, 6],
            build_types: vec!["standard".to_string(), "core".to_string()],
        }
    }

    #[test]
    fn test_validation_rejects_zero_timeout() {
        let mut config = valid_config();
        config.request_timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_unknown_edition() {
        let mut config = valid_config();
        config.editions = vec![1, 9];
        assert!(matches!(
            config.validate(),
            Err(ConfigError::UnknownEdition(9))
        ));
    }

    #[test]
    fn test_validation_rejects_unknown_build_type() {
        let mut config = valid_config();
        config.build_types = vec!["mega".to_string()];
        assert!(matches!(
            config.validate(),
            Err(ConfigError::UnknownBuildType(_))
        ));
    }

    #[test]
    fn test_validation_rejects_empty_editions() {
        let mut config = valid_config();
        config.editions.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_display() {
        let display = format!("{}", valid_config());
        assert!(display.contains("Isowatch Configuration:"));
        assert!(display.contains("Tracking File:"));
    }
}
