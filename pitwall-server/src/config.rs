//! Server configuration
//!
//! Configuration is an explicit value resolved once at startup and passed
//! down at construction; components never reach for process-global state.

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Directory holding the CSV export files
    pub data_dir: PathBuf,

    /// Socket address to serve the API on
    pub addr: SocketAddr,
}

impl ServerConfig {
    /// Resolve configuration from the environment, with defaults.
    ///
    /// `PITWALL_DATA_DIR` defaults to `./data`; `PITWALL_ADDR` defaults to
    /// `0.0.0.0:9100`.
    pub fn from_env() -> Result<Self> {
        let data_dir = std::env::var("PITWALL_DATA_DIR")
            .unwrap_or_else(|_| "./data".to_string())
            .into();

        let addr = std::env::var("PITWALL_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:9100".to_string())
            .parse()
            .context("parsing PITWALL_ADDR as a socket address")?;

        Ok(Self { data_dir, addr })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        // Only meaningful when the variables are unset, which is the
        // normal test environment.
        if std::env::var("PITWALL_DATA_DIR").is_err() && std::env::var("PITWALL_ADDR").is_err() {
            let config = ServerConfig::from_env().unwrap();
            assert_eq!(config.data_dir, PathBuf::from("./data"));
            assert_eq!(config.addr.port(), 9100);
        }
    }
}
