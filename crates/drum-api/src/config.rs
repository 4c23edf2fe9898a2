use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::path::PathBuf;

const DEFAULT_ADDR: &str = "0.0.0.0:3000";

/// Service settings read from the environment.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// `DRUM_API_ADDR`
    pub addr: SocketAddr,
    /// `DRUM_API_SEED`: JSON or YAML list of drums to preload
    pub seed: Option<PathBuf>,
}

impl ApiConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_vars(
            std::env::var("DRUM_API_ADDR").ok(),
            std::env::var("DRUM_API_SEED").ok(),
        )
    }

    fn from_vars(addr: Option<String>, seed: Option<String>) -> Result<Self> {
        let addr = addr.unwrap_or_else(|| DEFAULT_ADDR.to_string());
        let addr = addr
            .parse()
            .with_context(|| format!("DRUM_API_ADDR is not a socket address: {addr}"))?;

        Ok(Self {
            addr,
            seed: seed.filter(|s| !s.is_empty()).map(PathBuf::from),
        })
    }
}
