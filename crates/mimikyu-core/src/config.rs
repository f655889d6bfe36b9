//! Session and grid configuration.

use crate::color::Rgb;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Rows in the reference deployment.
pub const DEFAULT_ROWS: usize = 16;
/// Columns in the reference deployment.
pub const DEFAULT_COLS: usize = 32;
/// WebSocket path the server exposes for the realtime stream.
pub const DEFAULT_ENDPOINT_PATH: &str = "/realtime/draw";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Grid dimensions must be non-zero, got {rows}x{cols}")]
    EmptyGrid { rows: usize, cols: usize },
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    #[error("Unsupported URL scheme: {0}")]
    UnsupportedScheme(String),
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

/// Fixed grid dimensions, both non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "GridDims")]
pub struct GridConfig {
    rows: usize,
    cols: usize,
}

/// Unchecked wire form of [`GridConfig`].
#[derive(Deserialize)]
struct GridDims {
    rows: usize,
    cols: usize,
}

impl TryFrom<GridDims> for GridConfig {
    type Error = ConfigError;

    fn try_from(dims: GridDims) -> Result<Self, Self::Error> {
        Self::new(dims.rows, dims.cols)
    }
}

impl GridConfig {
    pub fn new(rows: usize, cols: usize) -> Result<Self, ConfigError> {
        if rows == 0 || cols == 0 {
            return Err(ConfigError::EmptyGrid { rows, cols });
        }
        Ok(Self { rows, cols })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Total number of cells.
    pub fn cell_count(&self) -> usize {
        self.rows * self.cols
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            rows: DEFAULT_ROWS,
            cols: DEFAULT_COLS,
        }
    }
}

/// Client session configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub grid: GridConfig,
    pub endpoint_path: String,
    /// Color forced on entering erase mode.
    pub erase_color: Rgb,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            grid: GridConfig::default(),
            endpoint_path: DEFAULT_ENDPOINT_PATH.to_string(),
            erase_color: Rgb::ERASE,
        }
    }
}

impl SessionConfig {
    pub fn with_grid(grid: GridConfig) -> Self {
        Self {
            grid,
            ..Self::default()
        }
    }

    /// Derive the WebSocket URL from a page or server base URL.
    ///
    /// `http` becomes `ws` and `https` becomes `wss`; URLs that already use a
    /// WebSocket scheme keep it. The path is replaced with `endpoint_path`.
    pub fn websocket_url(&self, base: &str) -> Result<String, ConfigError> {
        let mut url = Url::parse(base).map_err(|e| ConfigError::InvalidUrl(format!("{}: {}", base, e)))?;

        let scheme = match url.scheme() {
            "http" | "ws" => "ws",
            "https" | "wss" => "wss",
            other => return Err(ConfigError::UnsupportedScheme(other.to_string())),
        };
        url.set_scheme(scheme)
            .map_err(|_| ConfigError::UnsupportedScheme(scheme.to_string()))?;
        url.set_path(&self.endpoint_path);
        url.set_query(None);
        url.set_fragment(None);

        Ok(url.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_deployment() {
        let config = SessionConfig::default();
        assert_eq!((config.grid.rows(), config.grid.cols()), (16, 32));
        assert_eq!(config.endpoint_path, "/realtime/draw");
        assert_eq!(config.erase_color.to_rgb_string(), "rgb(169,177,214)");
    }

    #[test]
    fn test_empty_grid_rejected() {
        assert!(GridConfig::new(0, 4).is_err());
        assert!(GridConfig::new(4, 0).is_err());
        assert_eq!(GridConfig::new(2, 3).map(|g| g.cell_count()).ok(), Some(6));
    }

    #[test]
    fn test_empty_grid_rejected_when_deserializing() {
        assert!(serde_json::from_str::<GridConfig>(r#"{"rows":2,"cols":0}"#).is_err());
        let grid: GridConfig = serde_json::from_str(r#"{"rows":2,"cols":3}"#).unwrap();
        assert_eq!((grid.rows(), grid.cols()), (2, 3));
    }

    #[test]
    fn test_websocket_url_from_page() {
        let config = SessionConfig::default();
        assert_eq!(
            config.websocket_url("http://localhost:7032/index.html?x=1").ok().as_deref(),
            Some("ws://localhost:7032/realtime/draw")
        );
        assert_eq!(
            config.websocket_url("https://board.example.com/").ok().as_deref(),
            Some("wss://board.example.com/realtime/draw")
        );
    }

    #[test]
    fn test_websocket_url_rejects_other_schemes() {
        let config = SessionConfig::default();
        assert!(matches!(
            config.websocket_url("ftp://example.com"),
            Err(ConfigError::UnsupportedScheme(_))
        ));
        assert!(matches!(
            config.websocket_url("not a url"),
            Err(ConfigError::InvalidUrl(_))
        ));
    }
}
