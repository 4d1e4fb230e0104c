//! Configuration for the `memspace-server` network façade (§4.9): listen
//! address/port, log level, and the backing region's name/size for when the
//! façade is wired to a real [`memspace_core::Space`] rather than the
//! bundled in-memory store.

use serde::Deserialize;
use std::path::Path;

#[derive(Deserialize, Debug)]
pub struct FacadeConfig {
    #[serde(default = "defaults::listen_host")]
    pub listen_host: String,

    #[serde(default = "defaults::port")]
    pub port: u16,

    #[serde(default = "defaults::log_level")]
    pub log_level: String,

    #[serde(default = "defaults::region_name")]
    pub region_name: String,

    #[serde(default = "defaults::region_size")]
    pub region_size: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read '{path}'")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config")]
    Parse(#[from] toml::de::Error),
}

mod defaults {
    pub fn listen_host() -> String {
        "127.0.0.1".into()
    }

    pub fn port() -> u16 {
        8686
    }

    pub fn log_level() -> String {
        "info".into()
    }

    pub fn region_name() -> String {
        "/memspace".into()
    }

    pub fn region_size() -> usize {
        1 << 20 // 1 MiB
    }
}

impl FacadeConfig {
    pub fn load(path: impl AsRef<Path> + ToString) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.to_string(),
            source,
        })?;
        let config: FacadeConfig = toml::from_str(&raw)?;
        Ok(config)
    }
}

impl Default for FacadeConfig {
    fn default() -> Self {
        FacadeConfig {
            listen_host: defaults::listen_host(),
            port: defaults::port(),
            log_level: defaults::log_level(),
            region_name: defaults::region_name(),
            region_size: defaults::region_size(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_file_is_empty() {
        let dir = std::env::temp_dir();
        let path = dir.join(format!("memspace_config_test_empty_{}.toml", std::process::id()));
        std::fs::write(&path, "").unwrap();
        let config = FacadeConfig::load(path.to_string_lossy().to_string()).unwrap();
        assert_eq!(config.port, 8686);
        assert_eq!(config.listen_host, "127.0.0.1");
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn overrides_apply() {
        let dir = std::env::temp_dir();
        let path = dir.join(format!("memspace_config_test_override_{}.toml", std::process::id()));
        std::fs::write(&path, "port = 9999\nlog_level = \"debug\"\n").unwrap();
        let config = FacadeConfig::load(path.to_string_lossy().to_string()).unwrap();
        assert_eq!(config.port, 9999);
        assert_eq!(config.log_level, "debug");
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = FacadeConfig::load("/nonexistent/memspace.toml".to_string()).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
