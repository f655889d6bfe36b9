//! Shared server state.

use crate::board::{ApplyError, Board};
use mimikyu_core::{EditCommand, GridConfig, Snapshot};
use tokio::sync::{Mutex, broadcast};

/// The board plus the broadcast channel its snapshots go out on.
pub struct AppState {
    board: Mutex<Board>,
    tx: broadcast::Sender<Snapshot>,
}

impl AppState {
    pub fn new(grid: GridConfig, channel_capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(channel_capacity.max(1));
        Self {
            board: Mutex::new(Board::new(grid)),
            tx,
        }
    }

    /// Subscribe to future snapshots and read the current one.
    ///
    /// Subscribing under the board lock guarantees no mutation falls between
    /// the returned snapshot and the first broadcast the receiver sees.
    pub async fn subscribe(&self) -> (broadcast::Receiver<Snapshot>, Snapshot) {
        let board = self.board.lock().await;
        let rx = self.tx.subscribe();
        (rx, board.snapshot())
    }

    /// Apply a command and broadcast the resulting snapshot to every
    /// subscriber, the sender included.
    pub async fn apply(&self, command: &EditCommand) -> Result<(), ApplyError> {
        let mut board = self.board.lock().await;
        board.apply(command)?;
        // No subscribers is fine.
        let _ = self.tx.send(board.snapshot());
        Ok(())
    }

    pub async fn snapshot(&self) -> Snapshot {
        self.board.lock().await.snapshot()
    }

    pub async fn clear(&self) {
        self.board.lock().await.clear();
    }
}
