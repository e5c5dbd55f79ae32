use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::{Result, StoreError};

pub const URL_SCHEME: &str = "memory://";

/// Store connection configuration
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Database name
    pub database: String,

    /// Documents loaded into an empty store at connect time
    pub seed_path: Option<PathBuf>,

    /// Snapshot restored at connect time (takes precedence over the seed when
    /// it exists) and written back on shutdown
    pub snapshot_path: Option<PathBuf>,

    /// Upper bound for the whole connect sequence
    pub connect_timeout: Duration,

    /// Artificial latency before the store becomes ready
    pub connect_delay: Duration,
}

impl ConnectionConfig {
    pub fn new(database: &str) -> Self {
        Self {
            database: database.to_string(),
            seed_path: None,
            snapshot_path: None,
            connect_timeout: Duration::from_secs(30),
            connect_delay: Duration::ZERO,
        }
    }

    pub fn seed_path(mut self, path: impl AsRef<Path>) -> Self {
        self.seed_path = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn snapshot_path(mut self, path: impl AsRef<Path>) -> Self {
        self.snapshot_path = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn connect_delay(mut self, delay: Duration) -> Self {
        self.connect_delay = delay;
        self
    }

    /// Parse from connection string
    ///
    /// Format: `memory://database`
    ///
    /// # Examples
    ///
    /// ```
    /// # use docgate::ConnectionConfig;
    /// let config = ConnectionConfig::from_url("memory://school").unwrap();
    /// assert_eq!(config.database, "school");
    /// ```
    pub fn from_url(url: &str) -> Result<Self> {
        let Some(rest) = url.strip_prefix(URL_SCHEME) else {
            return Err(StoreError::ConnectionError(format!(
                "URL must start with '{URL_SCHEME}'"
            )));
        };

        let database = rest.trim_end_matches('/');
        if database.is_empty() || database.contains('/') {
            return Err(StoreError::ConnectionError(format!(
                "invalid database name in '{url}'"
            )));
        }

        Ok(Self::new(database))
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self::new("docgate")
    }
}
