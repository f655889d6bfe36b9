//! One client session: a channel and the engine it feeds.

use crate::color::Rgb;
use crate::config::SessionConfig;
use crate::engine::{GestureOutcome, Mode, ReconciliationEngine};
use crate::grid::GridState;
use crate::input::GestureEvent;
use crate::protocol::{EditCommand, SnapshotError};
use crate::sync::{ChannelResult, ConnectionState, SyncChannel, SyncEvent, log_preview};

/// What happened while pumping the channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Connection confirmed; an empty grid is ready to render.
    Opened,
    /// A snapshot replaced the grid.
    GridUpdated,
    /// A snapshot was malformed; the previous grid is kept.
    SnapshotRejected(SnapshotError),
    /// The connection closed. The session is over.
    Closed,
    /// The transport failed. The session is over.
    Error { message: String },
}

/// Owns a [`SyncChannel`] and a [`ReconciliationEngine`].
///
/// Every call runs to completion before the next; nothing blocks.
pub struct Session<C: SyncChannel> {
    channel: C,
    engine: ReconciliationEngine,
}

impl<C: SyncChannel> Session<C> {
    pub fn new(channel: C, config: &SessionConfig) -> Self {
        Self {
            channel,
            engine: ReconciliationEngine::new(config),
        }
    }

    /// Start connecting. The grid appears once [`SessionEvent::Opened`] is pumped.
    pub fn connect(&mut self, url: &str) -> ChannelResult<()> {
        self.channel.connect(url)
    }

    pub fn disconnect(&mut self) {
        self.channel.disconnect();
        self.engine.close();
    }

    /// Drain channel events into the engine.
    pub fn pump(&mut self) -> Vec<SessionEvent> {
        self.channel
            .poll_events()
            .into_iter()
            .map(|event| self.handle_event(event))
            .collect()
    }

    fn handle_event(&mut self, event: SyncEvent) -> SessionEvent {
        match event {
            SyncEvent::Opened => {
                log::info!("Session open");
                self.engine.open();
                SessionEvent::Opened
            }
            SyncEvent::Message(text) => match self.engine.apply_snapshot_json(&text) {
                Ok(()) => SessionEvent::GridUpdated,
                Err(e) => {
                    log::warn!("Rejected snapshot ({}): {}", e, log_preview(&text));
                    SessionEvent::SnapshotRejected(e)
                }
            },
            SyncEvent::Closed => {
                log::info!("Session closed");
                self.engine.close();
                SessionEvent::Closed
            }
            SyncEvent::Error { message } => {
                log::error!("Session failed: {}", message);
                self.engine.close();
                SessionEvent::Error { message }
            }
        }
    }

    /// Feed a pointer gesture; any resulting command is sent.
    pub fn gesture(&mut self, event: GestureEvent) -> GestureOutcome {
        let outcome = self.engine.handle_gesture(event);
        if let Some(ref command) = outcome.command {
            self.dispatch(command);
        }
        outcome
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.engine.set_mode(mode);
    }

    pub fn set_color(&mut self, color: Rgb) {
        self.engine.set_color(color);
    }

    /// Clear the board locally and on the server.
    pub fn clear(&mut self) {
        if let Some(command) = self.engine.clear() {
            self.dispatch(&command);
        }
    }

    /// Fire-and-forget. A failed send is logged and dropped.
    fn dispatch(&self, command: &EditCommand) {
        if let Err(e) = self.channel.send(command) {
            log::warn!("Dropped {:?} command at ({}, {}): {}", command.mode, command.x, command.y, e);
        }
    }

    pub fn grid(&self) -> Option<&GridState> {
        self.engine.grid()
    }

    pub fn engine(&self) -> &ReconciliationEngine {
        &self.engine
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.channel.state()
    }
}
