// ABOUTME: Configuration loading and validation for the kvwatch server.
// ABOUTME: Reads environment variables with sensible defaults and enforces constraints.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("KVWATCH_BIND is not a valid socket address: {0}")]
    InvalidBind(String),

    #[error("unknown storage backend (expected 'memory' or 'file'): {0}")]
    UnknownBackend(String),

    #[error("backup interval must be a positive number of seconds: {0}")]
    InvalidInterval(String),
}

/// Which storage backend serves the key-value data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Memory,
    File,
}

impl FromStr for StorageBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "memory" => Ok(Self::Memory),
            "file" => Ok(Self::File),
            other => Err(ConfigError::UnknownBackend(other.to_string())),
        }
    }
}

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct KvwatchConfig {
    pub bind: SocketAddr,
    pub storage: StorageBackend,
    pub data_path: PathBuf,
    pub backup_interval: Duration,
    pub backup_path: PathBuf,
    pub public_dir: Option<PathBuf>,
}

impl KvwatchConfig {
    /// Load configuration from environment variables with sensible defaults.
    ///
    /// Environment variables:
    /// - KVWATCH_BIND: socket address to bind (default: 127.0.0.1:8080)
    /// - KVWATCH_STORAGE: backend, memory or file (default: memory)
    /// - KVWATCH_DATA_PATH: file backend location (default: ~/.kvwatch/data.json)
    /// - KVWATCH_BACKUP_INTERVAL: seconds between backups (default: 300)
    /// - KVWATCH_BACKUP_PATH: backup destination (default: ~/.kvwatch/backup.json)
    /// - KVWATCH_PUBLIC_DIR: static asset directory served at /public (optional)
    pub fn from_env() -> Result<Self, ConfigError> {
        let home = std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
            .join(".kvwatch");

        let bind_str =
            std::env::var("KVWATCH_BIND").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
        let bind: SocketAddr = bind_str
            .parse()
            .map_err(|_| ConfigError::InvalidBind(bind_str))?;

        let storage = match std::env::var("KVWATCH_STORAGE") {
            Ok(s) => s.parse()?,
            Err(_) => StorageBackend::Memory,
        };

        let data_path = std::env::var("KVWATCH_DATA_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| home.join("data.json"));

        let backup_interval = match std::env::var("KVWATCH_BACKUP_INTERVAL") {
            Ok(s) => Self::interval_from_secs_str(&s)?,
            Err(_) => Duration::from_secs(300),
        };

        let backup_path = std::env::var("KVWATCH_BACKUP_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| home.join("backup.json"));

        let public_dir = std::env::var("KVWATCH_PUBLIC_DIR")
            .ok()
            .filter(|d| !d.is_empty())
            .map(PathBuf::from);

        Ok(Self {
            bind,
            storage,
            data_path,
            backup_interval,
            backup_path,
            public_dir,
        })
    }

    /// Parse and validate a backup interval. Zero or unparseable values are
    /// rejected: the timer requires a positive period.
    pub fn interval_from_secs_str(s: &str) -> Result<Duration, ConfigError> {
        match s.parse::<u64>() {
            Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
            _ => Err(ConfigError::InvalidInterval(s.to_string())),
        }
    }
}
