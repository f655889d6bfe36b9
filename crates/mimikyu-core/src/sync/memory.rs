//! In-memory channel for testing and headless use.

use super::{ChannelError, ChannelResult, ConnectionState, SyncChannel, SyncEvent};
use crate::protocol::EditCommand;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Default)]
struct Inner {
    url: Option<String>,
    pending: Vec<SyncEvent>,
    sent: Vec<String>,
}

/// A channel whose far end is driven by the caller.
///
/// Clones share the queued traffic, so a test can hand one clone to a session
/// and use another to inject events and inspect what was sent. Connection
/// state is tracked per clone, by whichever one polls.
#[derive(Debug, Clone, Default)]
pub struct MemoryChannel {
    inner: Rc<RefCell<Inner>>,
    state: ConnectionState,
}

impl MemoryChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// URL passed to the last `connect`.
    pub fn url(&self) -> Option<String> {
        self.inner.borrow().url.clone()
    }

    /// Queue an inbound event.
    pub fn push_event(&self, event: SyncEvent) {
        self.inner.borrow_mut().pending.push(event);
    }

    /// Confirm the connection as open.
    pub fn accept(&self) {
        self.push_event(SyncEvent::Opened);
    }

    /// Queue an inbound text message.
    pub fn push_message(&self, text: impl Into<String>) {
        self.push_event(SyncEvent::Message(text.into()));
    }

    /// Drain raw outbound messages.
    pub fn take_sent(&self) -> Vec<String> {
        std::mem::take(&mut self.inner.borrow_mut().sent)
    }

    /// Drain outbound messages, decoded as edit commands.
    pub fn take_sent_commands(&self) -> Vec<EditCommand> {
        self.take_sent()
            .iter()
            .filter_map(|text| EditCommand::from_json(text).ok())
            .collect()
    }
}

impl SyncChannel for MemoryChannel {
    fn connect(&mut self, url: &str) -> ChannelResult<()> {
        if self.state != ConnectionState::Disconnected {
            return Err(ChannelError::AlreadyConnected);
        }
        self.inner.borrow_mut().url = Some(url.to_string());
        self.state = ConnectionState::Connecting;
        Ok(())
    }

    fn disconnect(&mut self) {
        self.state = ConnectionState::Disconnected;
    }

    fn send_text(&self, text: &str) -> ChannelResult<()> {
        if self.state != ConnectionState::Connected {
            return Err(ChannelError::NotConnected);
        }
        self.inner.borrow_mut().sent.push(text.to_string());
        Ok(())
    }

    fn poll_events(&mut self) -> Vec<SyncEvent> {
        let events = std::mem::take(&mut self.inner.borrow_mut().pending);
        for event in &events {
            self.state.observe(event);
        }
        events
    }

    fn state(&self) -> ConnectionState {
        self.state
    }
}
