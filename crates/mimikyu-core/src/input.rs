//! Pointer gestures over grid cells.
//!
//! The presentation layer translates raw toolkit events into [`GestureEvent`]s;
//! nothing here depends on a UI toolkit.

use crate::grid::CellPos;
use serde::{Deserialize, Serialize};

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

impl MouseButton {
    /// Only the primary button paints.
    pub fn is_primary(self) -> bool {
        self == MouseButton::Left
    }
}

/// A pointer event already resolved to a grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureEvent {
    /// Button pressed over a cell.
    Down { cell: CellPos, button: MouseButton },
    /// Pointer entered a cell. `button` is the button the platform reports as
    /// held during the move, if any.
    Enter {
        cell: CellPos,
        button: Option<MouseButton>,
    },
    /// Button released anywhere in the document.
    Up { button: MouseButton },
}

/// Whether the primary button is currently held over the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StrokeState {
    #[default]
    Idle,
    Stroking,
}

impl StrokeState {
    /// Pure transition function.
    ///
    /// Returns the next state and the cell the edit rule should be applied to,
    /// if any. Non-primary buttons never start, continue, or end a stroke.
    /// Every primary press edits its cell, including one that arrives while
    /// already stroking because the matching release was never seen.
    pub fn next(self, event: GestureEvent) -> (StrokeState, Option<CellPos>) {
        match (self, event) {
            (_, GestureEvent::Down { cell, button }) if button.is_primary() => {
                (StrokeState::Stroking, Some(cell))
            }
            (StrokeState::Stroking, GestureEvent::Enter { cell, button }) => match button {
                Some(b) if !b.is_primary() => (self, None),
                _ => (self, Some(cell)),
            },
            (StrokeState::Stroking, GestureEvent::Up { button }) if button.is_primary() => {
                (StrokeState::Idle, None)
            }
            _ => (self, None),
        }
    }

    pub fn is_stroking(self) -> bool {
        self == StrokeState::Stroking
    }
}
