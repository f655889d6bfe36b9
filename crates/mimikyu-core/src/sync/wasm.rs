//! Browser WebSocket client.

use super::{ChannelError, ChannelResult, ConnectionState, SyncChannel, SyncEvent, log_preview};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CloseEvent, ErrorEvent, MessageEvent, WebSocket};

/// WebSocket client for WASM.
///
/// Events are collected by the JS callbacks and must be polled via
/// `poll_events()`.
pub struct WasmSocket {
    ws: Option<WebSocket>,
    state: ConnectionState,
    events: Rc<RefCell<Vec<SyncEvent>>>,
    // Closures must outlive the socket.
    _on_open: Option<Closure<dyn Fn()>>,
    _on_message: Option<Closure<dyn Fn(MessageEvent)>>,
    _on_close: Option<Closure<dyn Fn(CloseEvent)>>,
    _on_error: Option<Closure<dyn Fn(ErrorEvent)>>,
}

impl WasmSocket {
    pub fn new() -> Self {
        Self {
            ws: None,
            state: ConnectionState::Disconnected,
            events: Rc::new(RefCell::new(Vec::new())),
            _on_open: None,
            _on_message: None,
            _on_close: None,
            _on_error: None,
        }
    }
}

impl Default for WasmSocket {
    fn default() -> Self {
        Self::new()
    }
}

impl SyncChannel for WasmSocket {
    fn connect(&mut self, url: &str) -> ChannelResult<()> {
        if self.ws.is_some() {
            return Err(ChannelError::AlreadyConnected);
        }

        let ws = WebSocket::new(url).map_err(|e| ChannelError::Create(format!("{:?}", e)))?;
        self.state = ConnectionState::Connecting;

        let events_open = self.events.clone();
        let on_open = Closure::wrap(Box::new(move || {
            events_open.borrow_mut().push(SyncEvent::Opened);
        }) as Box<dyn Fn()>);
        ws.set_onopen(Some(on_open.as_ref().unchecked_ref()));

        let events_msg = self.events.clone();
        let on_message = Closure::wrap(Box::new(move |e: MessageEvent| {
            if let Ok(txt) = e.data().dyn_into::<js_sys::JsString>() {
                let text: String = txt.into();
                log::debug!("WebSocket received: {}", log_preview(&text));
                events_msg.borrow_mut().push(SyncEvent::Message(text));
            }
        }) as Box<dyn Fn(MessageEvent)>);
        ws.set_onmessage(Some(on_message.as_ref().unchecked_ref()));

        let events_close = self.events.clone();
        let on_close = Closure::wrap(Box::new(move |_e: CloseEvent| {
            events_close.borrow_mut().push(SyncEvent::Closed);
        }) as Box<dyn Fn(CloseEvent)>);
        ws.set_onclose(Some(on_close.as_ref().unchecked_ref()));

        let events_err = self.events.clone();
        let on_error = Closure::wrap(Box::new(move |_e: ErrorEvent| {
            events_err.borrow_mut().push(SyncEvent::Error {
                message: "WebSocket error".to_string(),
            });
        }) as Box<dyn Fn(ErrorEvent)>);
        ws.set_onerror(Some(on_error.as_ref().unchecked_ref()));

        self.ws = Some(ws);
        self._on_open = Some(on_open);
        self._on_message = Some(on_message);
        self._on_close = Some(on_close);
        self._on_error = Some(on_error);

        Ok(())
    }

    fn disconnect(&mut self) {
        if let Some(ws) = self.ws.take() {
            let _ = ws.close();
        }
        self.state = ConnectionState::Disconnected;
        self._on_open = None;
        self._on_message = None;
        self._on_close = None;
        self._on_error = None;
    }

    fn send_text(&self, text: &str) -> ChannelResult<()> {
        match self.ws {
            Some(ref ws) if self.state == ConnectionState::Connected => ws
                .send_with_str(text)
                .map_err(|e| ChannelError::Send(format!("{:?}", e))),
            _ => Err(ChannelError::NotConnected),
        }
    }

    fn poll_events(&mut self) -> Vec<SyncEvent> {
        let events = std::mem::take(&mut *self.events.borrow_mut());
        for event in &events {
            self.state.observe(event);
        }
        events
    }

    fn state(&self) -> ConnectionState {
        self.state
    }
}
