//! Mimikyu Core Library
//!
//! Grid state, wire protocol, and the client-side reconciliation state machine
//! for the Mimikyu shared pixel board.

pub mod color;
pub mod config;
pub mod engine;
pub mod grid;
pub mod input;
pub mod protocol;
pub mod session;
pub mod sync;

pub use color::{ColorParseError, Rgb};
pub use config::{ConfigError, GridConfig, SessionConfig};
pub use engine::{GestureOutcome, Mode, ReconciliationEngine};
pub use grid::{Cell, CellPos, GridState};
pub use input::{GestureEvent, MouseButton, StrokeState};
pub use protocol::{EditCommand, EditMode, Snapshot, SnapshotError};
pub use session::{Session, SessionEvent};
pub use sync::{ChannelError, ConnectionState, MemoryChannel, PlatformSocket, SyncChannel, SyncEvent};
