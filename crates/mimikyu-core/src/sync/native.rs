//! Native WebSocket client.

use super::{ChannelError, ChannelResult, ConnectionState, SyncChannel, SyncEvent, log_preview};
use std::sync::mpsc::{Receiver, Sender, TryRecvError, channel};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tungstenite::{Message, connect};
use url::Url;

/// Commands sent to the WebSocket thread.
enum WsCommand {
    Send(String),
    Close,
}

/// WebSocket client for native platforms.
///
/// Uses a background thread for non-blocking operation.
pub struct NativeSocket {
    state: ConnectionState,
    /// Channel to send commands to the WebSocket thread.
    cmd_tx: Option<Sender<WsCommand>>,
    /// Channel to receive events from the WebSocket thread.
    event_rx: Option<Receiver<SyncEvent>>,
    /// Handle to the WebSocket thread.
    _thread: Option<JoinHandle<()>>,
}

impl NativeSocket {
    /// Create a new disconnected client.
    pub fn new() -> Self {
        Self {
            state: ConnectionState::Disconnected,
            cmd_tx: None,
            event_rx: None,
            _thread: None,
        }
    }
}

impl Default for NativeSocket {
    fn default() -> Self {
        Self::new()
    }
}

impl SyncChannel for NativeSocket {
    fn connect(&mut self, url: &str) -> ChannelResult<()> {
        if self.cmd_tx.is_some() {
            return Err(ChannelError::AlreadyConnected);
        }

        let parsed_url = Url::parse(url).map_err(|e| ChannelError::InvalidUrl(e.to_string()))?;
        if parsed_url.scheme() != "ws" && parsed_url.scheme() != "wss" {
            return Err(ChannelError::UnsupportedScheme(parsed_url.scheme().to_string()));
        }

        self.state = ConnectionState::Connecting;

        let (cmd_tx, cmd_rx) = channel::<WsCommand>();
        let (event_tx, event_rx) = channel::<SyncEvent>();
        let url = url.to_string();

        let handle = thread::spawn(move || run_socket(&url, &cmd_rx, &event_tx));

        self.cmd_tx = Some(cmd_tx);
        self.event_rx = Some(event_rx);
        self._thread = Some(handle);

        Ok(())
    }

    fn disconnect(&mut self) {
        if let Some(tx) = self.cmd_tx.take() {
            let _ = tx.send(WsCommand::Close);
        }
        self.event_rx = None;
        self._thread = None;
        self.state = ConnectionState::Disconnected;
    }

    fn send_text(&self, text: &str) -> ChannelResult<()> {
        if self.state != ConnectionState::Connected {
            return Err(ChannelError::NotConnected);
        }
        match self.cmd_tx {
            Some(ref tx) => tx
                .send(WsCommand::Send(text.to_string()))
                .map_err(|e| ChannelError::Send(e.to_string())),
            None => Err(ChannelError::NotConnected),
        }
    }

    fn poll_events(&mut self) -> Vec<SyncEvent> {
        let mut events = Vec::new();
        if let Some(ref rx) = self.event_rx {
            while let Ok(event) = rx.try_recv() {
                self.state.observe(&event);
                events.push(event);
            }
        }
        events
    }

    fn state(&self) -> ConnectionState {
        self.state
    }
}

impl Drop for NativeSocket {
    fn drop(&mut self) {
        self.disconnect();
    }
}

/// Body of the WebSocket thread. Returns when the socket closes or the
/// owning client goes away.
fn run_socket(url: &str, cmd_rx: &Receiver<WsCommand>, event_tx: &Sender<SyncEvent>) {
    log::info!("WebSocket thread: connecting to {}", url);

    let (mut socket, response) = match connect(url) {
        Ok(pair) => pair,
        Err(e) => {
            log::error!("WebSocket connection failed: {}", e);
            let _ = event_tx.send(SyncEvent::Error {
                message: format!("Connection failed: {}", e),
            });
            return;
        }
    };

    log::info!("WebSocket connected, status: {}", response.status());
    let _ = event_tx.send(SyncEvent::Opened);

    // A short read timeout keeps the loop responsive to outgoing commands.
    match socket.get_mut() {
        tungstenite::stream::MaybeTlsStream::Plain(tcp) => {
            let _ = tcp.set_read_timeout(Some(Duration::from_millis(50)));
            let _ = tcp.set_write_timeout(Some(Duration::from_secs(5)));
        }
        #[allow(unreachable_patterns)]
        _ => {
            log::debug!("TLS or other stream - using default timeout handling");
        }
    }

    loop {
        match cmd_rx.try_recv() {
            Ok(WsCommand::Send(msg)) => {
                log::debug!("WebSocket sending: {}", log_preview(&msg));
                if let Err(e) = socket.send(Message::Text(msg)) {
                    log::error!("WebSocket send error: {}", e);
                    let _ = event_tx.send(SyncEvent::Error {
                        message: format!("Send failed: {}", e),
                    });
                    return;
                }
            }
            Ok(WsCommand::Close) => {
                log::info!("WebSocket close requested");
                let _ = socket.close(None);
                break;
            }
            Err(TryRecvError::Disconnected) => {
                log::info!("WebSocket command channel disconnected");
                break;
            }
            Err(TryRecvError::Empty) => {}
        }

        match socket.read() {
            Ok(Message::Text(txt)) => {
                log::debug!("WebSocket received: {}", log_preview(&txt));
                let _ = event_tx.send(SyncEvent::Message(txt));
            }
            Ok(Message::Ping(data)) => {
                let _ = socket.send(Message::Pong(data));
            }
            Ok(Message::Close(_)) => {
                log::info!("WebSocket received close frame");
                break;
            }
            Ok(_) => {} // Binary and pong carry nothing for us.
            Err(tungstenite::Error::Io(ref e))
                if e.kind() == std::io::ErrorKind::WouldBlock
                    || e.kind() == std::io::ErrorKind::TimedOut =>
            {
                continue;
            }
            Err(e) => {
                log::error!("WebSocket read error: {}", e);
                let _ = event_tx.send(SyncEvent::Error {
                    message: format!("Read failed: {}", e),
                });
                return;
            }
        }
    }

    log::info!("WebSocket thread exiting");
    let _ = event_tx.send(SyncEvent::Closed);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_websocket_scheme() {
        let mut socket = NativeSocket::new();
        assert!(matches!(
            socket.connect("http://localhost:7032/realtime/draw"),
            Err(ChannelError::UnsupportedScheme(_))
        ));
        assert_eq!(socket.state(), ConnectionState::Disconnected);
    }

    #[test]
    fn test_rejects_invalid_url() {
        let mut socket = NativeSocket::new();
        assert!(matches!(socket.connect("not a url"), Err(ChannelError::InvalidUrl(_))));
    }

    #[test]
    fn test_send_before_open_fails() {
        let socket = NativeSocket::new();
        assert!(matches!(socket.send_text("{}"), Err(ChannelError::NotConnected)));
    }

    #[test]
    fn test_connection_refused_reports_error() {
        // Bind then drop to get a port nobody listens on.
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .and_then(|l| l.local_addr())
            .map(|a| a.port())
            .unwrap();

        let mut socket = NativeSocket::new();
        socket.connect(&format!("ws://127.0.0.1:{}/realtime/draw", port)).unwrap();
        assert_eq!(socket.state(), ConnectionState::Connecting);
        assert!(matches!(socket.connect("ws://127.0.0.1:1/"), Err(ChannelError::AlreadyConnected)));

        let deadline = std::time::Instant::now() + Duration::from_secs(5);
        let mut events = Vec::new();
        while events.is_empty() && std::time::Instant::now() < deadline {
            events = socket.poll_events();
            thread::sleep(Duration::from_millis(10));
        }

        assert!(matches!(events.as_slice(), [SyncEvent::Error { .. }]));
        assert_eq!(socket.state(), ConnectionState::Error);
    }
}
