//! WebSocket channel to the board server.
//!
//! A [`SyncChannel`] is one connection for one session. It carries
//! [`EditCommand`]s out and raw snapshot messages in, and never reconnects on
//! its own: once it reports [`SyncEvent::Closed`] or [`SyncEvent::Error`] the
//! session is over and the embedding application decides what to do next.
//!
//! Implementations:
//!
//! - [`NativeSocket`]: tungstenite on a background thread (native only)
//! - [`WasmSocket`]: the browser `WebSocket` (wasm32 only)
//! - [`MemoryChannel`]: in-process double for tests and headless use

mod memory;

#[cfg(not(target_arch = "wasm32"))]
mod native;

#[cfg(target_arch = "wasm32")]
mod wasm;

pub use memory::MemoryChannel;

#[cfg(not(target_arch = "wasm32"))]
pub use native::NativeSocket;

#[cfg(target_arch = "wasm32")]
pub use wasm::WasmSocket;

use crate::protocol::EditCommand;
use thiserror::Error;

/// Connection state as observed through polled events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Error,
}

impl ConnectionState {
    /// Track the state implied by an event.
    pub fn observe(&mut self, event: &SyncEvent) {
        match event {
            SyncEvent::Opened => *self = ConnectionState::Connected,
            SyncEvent::Closed => *self = ConnectionState::Disconnected,
            SyncEvent::Error { .. } => *self = ConnectionState::Error,
            SyncEvent::Message(_) => {}
        }
    }
}

/// Events delivered by a channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    /// The connection is confirmed open.
    Opened,
    /// A complete text message, expected to be a snapshot.
    Message(String),
    /// The connection closed.
    Closed,
    /// The transport failed.
    Error { message: String },
}

/// Channel errors.
#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("Already connected")]
    AlreadyConnected,
    #[error("Not connected")]
    NotConnected,
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    #[error("Invalid WebSocket URL scheme: {0}")]
    UnsupportedScheme(String),
    #[error("Failed to create WebSocket: {0}")]
    Create(String),
    #[error("Send failed: {0}")]
    Send(String),
    #[error("Failed to encode command: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Result type for channel operations.
pub type ChannelResult<T> = Result<T, ChannelError>;

/// A single-session, message-based duplex connection.
pub trait SyncChannel {
    /// Start connecting. Readiness is reported later as [`SyncEvent::Opened`].
    fn connect(&mut self, url: &str) -> ChannelResult<()>;

    /// Close the connection.
    fn disconnect(&mut self);

    /// Send one text message. Fire-and-forget.
    fn send_text(&self, text: &str) -> ChannelResult<()>;

    /// Drain pending events without blocking.
    fn poll_events(&mut self) -> Vec<SyncEvent>;

    fn state(&self) -> ConnectionState;

    fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    /// Serialize and send an edit command.
    fn send(&self, command: &EditCommand) -> ChannelResult<()> {
        let json = command.to_json()?;
        self.send_text(&json)
    }
}

/// Platform-specific WebSocket client type.
#[cfg(target_arch = "wasm32")]
pub type PlatformSocket = WasmSocket;

#[cfg(not(target_arch = "wasm32"))]
pub type PlatformSocket = NativeSocket;

/// Cut a message down for log output without splitting a character.
pub(crate) fn log_preview(text: &str) -> &str {
    const MAX: usize = 100;
    match text.char_indices().nth(MAX) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_follows_events() {
        let mut state = ConnectionState::Connecting;
        state.observe(&SyncEvent::Opened);
        assert_eq!(state, ConnectionState::Connected);
        state.observe(&SyncEvent::Message("[]".to_string()));
        assert_eq!(state, ConnectionState::Connected);
        state.observe(&SyncEvent::Error { message: "boom".to_string() });
        assert_eq!(state, ConnectionState::Error);
        state.observe(&SyncEvent::Closed);
        assert_eq!(state, ConnectionState::Disconnected);
    }

    #[test]
    fn test_log_preview_truncates_on_char_boundary() {
        let long = "é".repeat(150);
        assert_eq!(log_preview(&long).chars().count(), 100);
        assert_eq!(log_preview("short"), "short");
    }
}
