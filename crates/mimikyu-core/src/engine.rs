//! Client-side reconciliation between local gestures and server snapshots.
//!
//! The engine owns the mirrored [`GridState`] together with the current mode,
//! color, and stroke state. Gestures mark cells optimistically and yield the
//! [`EditCommand`] to send; snapshots from the server overwrite the grid
//! wholesale, discarding any local guesses.
//!
//! No I/O happens here. [`crate::session::Session`] wires the engine to a
//! [`crate::sync::SyncChannel`].

use crate::color::Rgb;
use crate::config::{GridConfig, SessionConfig};
use crate::grid::{CellPos, GridState};
use crate::input::{GestureEvent, StrokeState};
use crate::protocol::{EditCommand, EditMode, Snapshot, SnapshotError, SnapshotResult};

/// Painting mode. Exactly one is active per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mode {
    #[default]
    Draw,
    Erase,
}

impl From<Mode> for EditMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Draw => EditMode::Draw,
            Mode::Erase => EditMode::Erase,
        }
    }
}

/// Result of feeding one gesture to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GestureOutcome {
    /// Command to send, if the gesture changed a cell.
    pub command: Option<EditCommand>,
    /// True while a stroke is in progress; the presentation should
    /// suppress text selection.
    pub suppress_selection: bool,
}

/// Mode and stroke state machine over a mirrored grid.
#[derive(Debug, Clone)]
pub struct ReconciliationEngine {
    grid_config: GridConfig,
    erase_color: Rgb,
    /// `None` until the connection is confirmed open.
    grid: Option<GridState>,
    mode: Mode,
    color: Rgb,
    stroke: StrokeState,
}

impl ReconciliationEngine {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            grid_config: config.grid,
            erase_color: config.erase_color,
            grid: None,
            mode: Mode::default(),
            color: Rgb::BLACK,
            stroke: StrokeState::Idle,
        }
    }

    /// Initialize an all-unset grid. Call once the connection is open.
    pub fn open(&mut self) {
        self.grid = Some(GridState::new(self.grid_config));
        self.stroke = StrokeState::Idle;
    }

    /// Discard the grid at session end.
    pub fn close(&mut self) {
        self.grid = None;
        self.stroke = StrokeState::Idle;
    }

    pub fn is_open(&self) -> bool {
        self.grid.is_some()
    }

    pub fn grid(&self) -> Option<&GridState> {
        self.grid.as_ref()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn color(&self) -> Rgb {
        self.color
    }

    pub fn stroke(&self) -> StrokeState {
        self.stroke
    }

    /// Switch mode. Entering erase mode forces the erase color; returning to
    /// draw mode keeps whatever color is current.
    pub fn set_mode(&mut self, mode: Mode) {
        if mode == Mode::Erase {
            self.color = self.erase_color;
        }
        self.mode = mode;
    }

    /// Color picked by the user. Emits nothing and leaves the grid alone.
    pub fn set_color(&mut self, color: Rgb) {
        self.color = color;
    }

    /// Feed one pointer gesture through the stroke state machine.
    pub fn handle_gesture(&mut self, event: GestureEvent) -> GestureOutcome {
        if self.grid.is_none() {
            return GestureOutcome::default();
        }

        let (next, target) = self.stroke.next(event);
        self.stroke = next;

        GestureOutcome {
            command: target.and_then(|cell| self.edit_cell(cell)),
            suppress_selection: next.is_stroking(),
        }
    }

    /// Apply the cell-edit rule once.
    fn edit_cell(&mut self, cell: CellPos) -> Option<EditCommand> {
        let mode = self.mode;
        let color = self.color;
        let grid = self.grid.as_mut()?;
        if !grid.contains(cell) {
            return None;
        }

        match mode {
            Mode::Draw => {
                if grid.is_active(cell) {
                    return None;
                }
                grid.set(cell, Some(color));
                Some(EditCommand::draw(cell.row, cell.col, color))
            }
            Mode::Erase => {
                if !grid.is_active(cell) {
                    return None;
                }
                grid.set(cell, None);
                Some(EditCommand::erase(cell.row, cell.col, color))
            }
        }
    }

    /// Clear the board, independent of mode and color.
    ///
    /// Returns `None` only when the session is not open yet.
    pub fn clear(&mut self) -> Option<EditCommand> {
        let grid = self.grid.as_mut()?;
        grid.clear();
        Some(EditCommand::clear())
    }

    /// Overwrite the grid with a server snapshot.
    ///
    /// A malformed snapshot is rejected and the previous grid kept.
    pub fn apply_snapshot(&mut self, snapshot: &Snapshot) -> SnapshotResult<()> {
        let grid = self.grid.as_mut().ok_or(SnapshotError::SessionNotOpen)?;
        grid.apply_snapshot(snapshot)
    }

    /// Decode and apply a raw snapshot message.
    pub fn apply_snapshot_json(&mut self, text: &str) -> SnapshotResult<()> {
        let snapshot = Snapshot::from_json(text)?;
        self.apply_snapshot(&snapshot)
    }
}
