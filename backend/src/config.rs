use std::{env, net::SocketAddr, path::PathBuf, time::Duration};

use crate::{directions::DEFAULT_DIRECTIONS_BASE_URL, planner::DEFAULT_DIRECTIONS_TIMEOUT};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_STATIONS_PATH: &str = "backend/data/sample_stations.json";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub stations_path: PathBuf,
    pub directions_base_url: String,
    pub google_maps_api_key: Option<String>,
    pub directions_timeout: Duration,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from any key lookup; unset keys fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bind_raw = lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw
            .parse()
            .map_err(|_| ConfigError::InvalidValue {
                key: "BIND_ADDR",
                value: bind_raw.clone(),
            })?;

        let directions_timeout = match lookup("DIRECTIONS_TIMEOUT_SECS") {
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: "DIRECTIONS_TIMEOUT_SECS",
                        value: raw,
                    });
                }
            },
            None => DEFAULT_DIRECTIONS_TIMEOUT,
        };

        Ok(Self {
            bind_addr,
            stations_path: lookup("STATIONS_JSON")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STATIONS_PATH)),
            directions_base_url: lookup("DIRECTIONS_BASE_URL")
                .unwrap_or_else(|| DEFAULT_DIRECTIONS_BASE_URL.to_string()),
            google_maps_api_key: lookup("GOOGLE_MAPS_API_KEY").filter(|key| !key.is_empty()),
            directions_timeout,
        })
    }
}
