//! The authoritative board.

use mimikyu_core::{ColorParseError, EditCommand, EditMode, GridConfig, Rgb, Snapshot};
use thiserror::Error;

/// Why a command was not applied.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ApplyError {
    #[error("Cell ({x}, {y}) is outside the {rows}x{cols} board")]
    OutOfBounds {
        x: usize,
        y: usize,
        rows: usize,
        cols: usize,
    },
    #[error("Bad color: {0}")]
    Color(#[from] ColorParseError),
}

/// Packed colors, row-major, `0` for unset. Last write wins.
#[derive(Debug, Clone)]
pub struct Board {
    config: GridConfig,
    cells: Vec<Vec<u32>>,
}

impl Board {
    pub fn new(config: GridConfig) -> Self {
        Self {
            config,
            cells: vec![vec![0; config.cols()]; config.rows()],
        }
    }

    pub fn config(&self) -> GridConfig {
        self.config
    }

    /// Apply one client command.
    pub fn apply(&mut self, command: &EditCommand) -> Result<(), ApplyError> {
        match command.mode {
            EditMode::Draw => {
                let color = Rgb::parse_rgb(&command.color)?;
                *self.cell_mut(command.x, command.y)? = color.to_packed();
            }
            EditMode::Erase => {
                *self.cell_mut(command.x, command.y)? = 0;
            }
            EditMode::Clear => self.clear(),
        }
        Ok(())
    }

    fn cell_mut(&mut self, x: usize, y: usize) -> Result<&mut u32, ApplyError> {
        let (rows, cols) = (self.config.rows(), self.config.cols());
        self.cells
            .get_mut(x)
            .and_then(|row| row.get_mut(y))
            .ok_or(ApplyError::OutOfBounds { x, y, rows, cols })
    }

    pub fn clear(&mut self) {
        self.cells.iter_mut().flatten().for_each(|cell| *cell = 0);
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::new(self.cells.clone())
    }
}
