//! Server configuration from the environment.

use mimikyu_core::{ConfigError, GridConfig};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::str::FromStr;

pub const DEFAULT_ADDR: &str = "0.0.0.0:7032";
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    pub grid: GridConfig,
    /// Snapshots buffered per subscriber before it starts lagging.
    pub channel_capacity: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], 7032)),
            grid: GridConfig::default(),
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

impl ServerConfig {
    /// Read `MIMIKYU_ADDR`, `MIMIKYU_ROWS` and `MIMIKYU_COLS`, falling back to
    /// defaults for unset variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let addr = parse_or(&lookup, "MIMIKYU_ADDR", defaults.addr)?;
        let rows = parse_or(&lookup, "MIMIKYU_ROWS", defaults.grid.rows())?;
        let cols = parse_or(&lookup, "MIMIKYU_COLS", defaults.grid.cols())?;

        Ok(Self {
            addr,
            grid: GridConfig::new(rows, cols)?,
            channel_capacity: defaults.channel_capacity,
        })
    }
}

fn parse_or<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(key) {
        Some(value) => value.trim().parse().map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            value,
        }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.addr.to_string(), DEFAULT_ADDR);
    }

    #[test]
    fn test_overrides() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("MIMIKYU_ADDR", "127.0.0.1:9000"),
            ("MIMIKYU_ROWS", "4"),
            ("MIMIKYU_COLS", " 8 "),
        ]))
        .unwrap();
        assert_eq!(config.addr.port(), 9000);
        assert_eq!((config.grid.rows(), config.grid.cols()), (4, 8));
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            ServerConfig::from_lookup(lookup(&[("MIMIKYU_ROWS", "many")])),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            ServerConfig::from_lookup(lookup(&[("MIMIKYU_COLS", "0")])),
            Err(ConfigError::EmptyGrid { .. })
        ));
    }
}
