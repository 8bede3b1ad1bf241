// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Configuration loading and validation.
//!
//! The config file itself is TOML at the path named by `DATA_SYNC_CONFIG`.
//! Parsing the outer CLI surface and expanding `~` in arbitrary path
//! arguments are out of scope here; this module only covers the config
//! file schema and the paths derived from it.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

const ENV_CONFIG_PATH: &str = "DATA_SYNC_CONFIG";
const ENV_PG_PASSWORD: &str = "PG_PASSWORD";
const ENV_PG_DB_NAME: &str = "PG_DB_NAME";

const MIN_DATA_SYNC_FREQ_SECS: u64 = 60;
const MIN_METRIC_FREQ_HOURS: u64 = 1;

fn default_archive_port() -> u16 {
    22
}
fn default_pg_host() -> String {
    "127.0.0.1".to_string()
}
fn default_pg_port() -> u16 {
    5432
}
fn default_pg_user() -> String {
    "admin".to_string()
}
fn default_data_sync_freq() -> u64 {
    600
}
fn default_metric_freq() -> u64 {
    24
}

/// Raw TOML shape, before validation and path derivation.
#[derive(Debug, Deserialize)]
struct RawConfig {
    archive_host: String,
    archive_user: String,
    archive_dir: String,
    #[serde(default = "default_archive_port")]
    archive_port: u16,
    #[serde(default = "default_pg_host")]
    pg_host: String,
    #[serde(default = "default_pg_port")]
    pg_port: u16,
    #[serde(default = "default_pg_user")]
    pg_user: String,
    pg_password: Option<String>,
    pg_database: Option<String>,
    #[serde(default = "default_data_sync_freq")]
    data_sync_freq: u64,
    #[serde(default = "default_metric_freq")]
    metric_freq: u64,
}

/// Fully loaded and validated daemon configuration, plus the paths derived
/// from the config file's location.
#[derive(Debug, Clone)]
pub struct Config {
    pub archive_host: String,
    pub archive_user: String,
    pub archive_dir: String,
    pub archive_port: u16,
    pub pg_host: String,
    pub pg_port: u16,
    pub pg_user: String,
    pub pg_password: String,
    pub pg_database: String,
    pub data_sync_freq: std::time::Duration,
    pub metric_freq: std::time::Duration,
    /// `<config_dir>/.syncdata_state.json`
    pub state_path: PathBuf,
    /// `<config_dir>/.syncdata.pid`
    pub pid_path: PathBuf,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{ENV_CONFIG_PATH} is not set")]
    MissingEnv,
    #[error("failed to read config file {0}: {1}")]
    Read(PathBuf, std::io::Error),
    #[error("failed to parse config file {0}: {1}")]
    Parse(PathBuf, toml::de::Error),
    #[error("missing required field {0:?}")]
    MissingField(&'static str),
    #[error("{field} must be >= {min}, got {actual}")]
    BelowMinimum { field: &'static str, min: u64, actual: u64 },
}

impl Config {
    /// Load from the path in `DATA_SYNC_CONFIG`.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var(ENV_CONFIG_PATH).map_err(|_| ConfigError::MissingEnv)?;
        Self::load_from(Path::new(&path))
    }

    /// Load from an explicit path — used by `load()` and directly by tests.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Read(path.to_path_buf(), e))?;
        let raw: RawConfig =
            toml::from_str(&text).map_err(|e| ConfigError::Parse(path.to_path_buf(), e))?;
        Self::from_raw(raw, path)
    }

    fn from_raw(raw: RawConfig, config_path: &Path) -> Result<Self, ConfigError> {
        let pg_password = raw
            .pg_password
            .or_else(|| std::env::var(ENV_PG_PASSWORD).ok())
            .ok_or(ConfigError::MissingField("pg_password"))?;
        let pg_database = raw
            .pg_database
            .or_else(|| std::env::var(ENV_PG_DB_NAME).ok())
            .ok_or(ConfigError::MissingField("pg_database"))?;

        if raw.data_sync_freq < MIN_DATA_SYNC_FREQ_SECS {
            return Err(ConfigError::BelowMinimum {
                field: "data_sync_freq",
                min: MIN_DATA_SYNC_FREQ_SECS,
                actual: raw.data_sync_freq,
            });
        }
        if raw.metric_freq < MIN_METRIC_FREQ_HOURS {
            return Err(ConfigError::BelowMinimum {
                field: "metric_freq",
                min: MIN_METRIC_FREQ_HOURS,
                actual: raw.metric_freq,
            });
        }

        let config_dir = config_path.parent().map(Path::to_path_buf).unwrap_or_default();

        Ok(Config {
            archive_host: raw.archive_host,
            archive_user: raw.archive_user,
            archive_dir: raw.archive_dir,
            archive_port: raw.archive_port,
            pg_host: raw.pg_host,
            pg_port: raw.pg_port,
            pg_user: raw.pg_user,
            pg_password,
            pg_database,
            data_sync_freq: std::time::Duration::from_secs(raw.data_sync_freq),
            metric_freq: std::time::Duration::from_secs(raw.metric_freq * 3600),
            state_path: config_dir.join(".syncdata_state.json"),
            pid_path: config_dir.join(".syncdata.pid"),
        })
    }

    /// Connection string suitable for `tokio_postgres::connect`.
    pub fn pg_connection_string(&self) -> String {
        format!(
            "host={} port={} user={} password={} dbname={}",
            self.pg_host, self.pg_port, self.pg_user, self.pg_password, self.pg_database
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    fn write_config(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("config.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(body.as_bytes()).unwrap();
        path
    }

    #[test]
    fn loads_minimal_config_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            dir.path(),
            r#"
            archive_host = "archive.example.com"
            archive_user = "sync"
            archive_dir = "/changes"
            pg_password = "secret"
            pg_database = "app"
            "#,
        );
        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg.archive_port, 22);
        assert_eq!(cfg.pg_host, "127.0.0.1");
        assert_eq!(cfg.pg_port, 5432);
        assert_eq!(cfg.pg_user, "admin");
        assert_eq!(cfg.data_sync_freq, std::time::Duration::from_secs(600));
        assert_eq!(cfg.metric_freq, std::time::Duration::from_secs(24 * 3600));
        assert_eq!(cfg.state_path, dir.path().join(".syncdata_state.json"));
        assert_eq!(cfg.pid_path, dir.path().join(".syncdata.pid"));
    }

    #[test]
    fn rejects_sync_freq_below_minimum() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            dir.path(),
            r#"
            archive_host = "h"
            archive_user = "u"
            archive_dir = "/d"
            pg_password = "p"
            pg_database = "db"
            data_sync_freq = 10
            "#,
        );
        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::BelowMinimum { field: "data_sync_freq", .. }));
    }

    #[test]
    fn rejects_metric_freq_below_minimum() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            dir.path(),
            r#"
            archive_host = "h"
            archive_user = "u"
            archive_dir = "/d"
            pg_password = "p"
            pg_database = "db"
            metric_freq = 0
            "#,
        );
        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::BelowMinimum { field: "metric_freq", .. }));
    }

    #[test]
    #[serial]
    fn missing_pg_password_falls_back_to_env() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            dir.path(),
            r#"
            archive_host = "h"
            archive_user = "u"
            archive_dir = "/d"
            pg_database = "db"
            "#,
        );
        std::env::set_var("PG_PASSWORD", "from-env");
        let cfg = Config::load_from(&path).unwrap();
        std::env::remove_var("PG_PASSWORD");
        assert_eq!(cfg.pg_password, "from-env");
    }

    #[test]
    #[serial]
    fn missing_required_field_without_env_fallback_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            dir.path(),
            r#"
            archive_host = "h"
            archive_user = "u"
            archive_dir = "/d"
            "#,
        );
        std::env::remove_var("PG_PASSWORD");
        std::env::remove_var("PG_DB_NAME");
        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::MissingField("pg_password")));
    }
}
