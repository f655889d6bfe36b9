//! Wire messages exchanged with the board server.
//!
//! Client to server: one [`EditCommand`] JSON object per message.
//!
//! ```json
//! { "mode": "Draw", "x": 0, "y": 1, "color": "rgb(255,0,0)" }
//! { "mode": "Clear", "x": 0, "y": 0, "color": "" }
//! ```
//!
//! Server to client: a [`Snapshot`], the whole board as a JSON array of rows of
//! packed colors, with `0` meaning unset.

use crate::color::{MAX_PACKED, Rgb};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced while decoding or validating a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SnapshotError {
    #[error("Invalid snapshot JSON: {0}")]
    InvalidJson(String),
    #[error("Expected {expected} rows, found {found}")]
    RowCount { expected: usize, found: usize },
    #[error("Row {row}: expected {expected} columns, found {found}")]
    ColumnCount {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("Cell ({row}, {col}) holds {value:#x}, which is not a 24-bit color")]
    ColorOutOfRange { row: usize, col: usize, value: u32 },
    #[error("Snapshot received before the session was open")]
    SessionNotOpen,
}

/// Result type for snapshot handling.
pub type SnapshotResult<T> = Result<T, SnapshotError>;

/// Kind of edit carried by a command. Serialized in title case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EditMode {
    Draw,
    Erase,
    Clear,
}

/// A single edit sent from a client to the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditCommand {
    pub mode: EditMode,
    /// Row index.
    pub x: usize,
    /// Column index.
    pub y: usize,
    /// `rgb(r,g,b)` with no spaces; empty for `Clear`.
    pub color: String,
}

impl EditCommand {
    pub fn draw(row: usize, col: usize, color: Rgb) -> Self {
        Self {
            mode: EditMode::Draw,
            x: row,
            y: col,
            color: color.to_rgb_string(),
        }
    }

    /// The color is carried along but the server ignores it.
    pub fn erase(row: usize, col: usize, color: Rgb) -> Self {
        Self {
            mode: EditMode::Erase,
            x: row,
            y: col,
            color: color.to_rgb_string(),
        }
    }

    pub fn clear() -> Self {
        Self {
            mode: EditMode::Clear,
            x: 0,
            y: 0,
            color: String::new(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}

/// Full board contents as packed colors, row-major.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot {
    pub rows: Vec<Vec<u32>>,
}

impl Snapshot {
    pub fn new(rows: Vec<Vec<u32>>) -> Self {
        Self { rows }
    }

    /// An all-unset snapshot.
    pub fn empty(rows: usize, cols: usize) -> Self {
        Self::new(vec![vec![0; cols]; rows])
    }

    /// Decode a snapshot message. Shape is not checked here; see [`Snapshot::validate`].
    pub fn from_json(text: &str) -> SnapshotResult<Self> {
        serde_json::from_str(text).map_err(|e| SnapshotError::InvalidJson(e.to_string()))
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Check the snapshot is exactly `rows` x `cols` of 24-bit colors.
    pub fn validate(&self, rows: usize, cols: usize) -> SnapshotResult<()> {
        if self.rows.len() != rows {
            return Err(SnapshotError::RowCount {
                expected: rows,
                found: self.rows.len(),
            });
        }

        for (r, row) in self.rows.iter().enumerate() {
            if row.len() != cols {
                return Err(SnapshotError::ColumnCount {
                    row: r,
                    expected: cols,
                    found: row.len(),
                });
            }
            if let Some((c, &value)) = row.iter().enumerate().find(|(_, v)| **v > MAX_PACKED) {
                return Err(SnapshotError::ColorOutOfRange { row: r, col: c, value });
            }
        }

        Ok(())
    }
}
