use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::connection::config::ConnectionConfig;
use crate::core::Result;

/// Server configuration, read from flags with environment fallbacks.
#[derive(Debug, Clone, Parser)]
#[command(name = "docgate")]
#[command(about = "REST gateway over a document store")]
pub struct ServerConfig {
    #[arg(long, env = "DOCGATE_HOST", default_value = "0.0.0.0")]
    pub host: String,

    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// `memory://<database>`
    #[arg(long, env = "DOCGATE_DATABASE_URL", default_value = "memory://docgate")]
    pub database_url: String,

    /// JSON file loaded into the store when no snapshot is found
    #[arg(long, env = "DOCGATE_SEED")]
    pub seed: Option<PathBuf>,

    /// JSON snapshot restored on connect and written on shutdown
    #[arg(long, env = "DOCGATE_SNAPSHOT")]
    pub snapshot: Option<PathBuf>,

    #[arg(long, env = "DOCGATE_CONNECT_DELAY_MS", default_value_t = 0)]
    pub connect_delay_ms: u64,

    #[arg(long, env = "DOCGATE_CONNECT_TIMEOUT_MS", default_value_t = 30_000)]
    pub connect_timeout_ms: u64,
}

impl ServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn connection_config(&self) -> Result<ConnectionConfig> {
        let mut config = ConnectionConfig::from_url(&self.database_url)?
            .connect_delay(Duration::from_millis(self.connect_delay_ms))
            .connect_timeout(Duration::from_millis(self.connect_timeout_ms));
        if let Some(seed) = &self.seed {
            config = config.seed_path(seed);
        }
        if let Some(snapshot) = &self.snapshot {
            config = config.snapshot_path(snapshot);
        }
        Ok(config)
    }
}
