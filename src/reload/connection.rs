//! Per-viewer connection pump.
//!
//! Each upgraded WebSocket is owned by one thread. The socket is switched to
//! non-blocking mode after the handshake, and the thread alternates between
//! draining the viewer's queue and polling the socket for a peer close. Idle
//! connections get a ping every heartbeat.

use std::io::ErrorKind;
use std::net::{Shutdown, TcpStream};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam::channel::{Receiver, RecvTimeoutError};
use tungstenite::protocol::Message;
use tungstenite::{Error as WsError, WebSocket};

use super::channel::{ViewerId, ViewerState};
use super::hub::NotificationHub;
use super::message::ReloadMessage;

/// Longest a peer close can go unnoticed.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// What the last socket poll saw.
enum Peer {
    Open,
    Gone(String),
}

pub struct ViewerConnection {
    id: ViewerId,
    ws: WebSocket<TcpStream>,
    rx: Receiver<ReloadMessage>,
    hub: Arc<NotificationHub>,
    heartbeat: Duration,
    state: ViewerState,
}

impl ViewerConnection {
    pub fn new(
        id: ViewerId,
        ws: WebSocket<TcpStream>,
        rx: Receiver<ReloadMessage>,
        hub: Arc<NotificationHub>,
        heartbeat: Duration,
    ) -> Self {
        Self {
            id,
            ws,
            rx,
            hub,
            heartbeat,
            state: ViewerState::Connecting,
        }
    }

    /// Pump messages until the viewer or the hub goes away.
    pub fn run(mut self) {
        if let Err(e) = self.ws.get_ref().set_nonblocking(true) {
            crate::debug!("live"; "viewer {}: {}", self.id, e);
            self.close();
            return;
        }
        self.transition(ViewerState::Open);

        let mut last_sent = Instant::now();
        loop {
            if let Peer::Gone(reason) = self.poll_peer() {
                crate::debug!("live"; "viewer {} went away: {}", self.id, reason);
                break;
            }

            let frame = match self.rx.recv_timeout(POLL_INTERVAL) {
                Ok(msg) => Message::Text(msg.encode().into()),
                Err(RecvTimeoutError::Timeout) if last_sent.elapsed() >= self.heartbeat => {
                    Message::Ping(Vec::new().into())
                }
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => {
                    // Sender dropped by the hub: unregistered or shutting down.
                    let _ = self.ws.close(None);
                    self.drain_close();
                    break;
                }
            };

            if let Err(e) = self.send(frame) {
                crate::debug!("live"; "viewer {} send failed: {}", self.id, e);
                break;
            }
            last_sent = Instant::now();
        }

        self.close();
    }

    /// Read whatever the peer sent. Client frames are ignored.
    fn poll_peer(&mut self) -> Peer {
        loop {
            match self.ws.read() {
                Ok(Message::Close(_)) => return Peer::Gone("close frame".into()),
                Ok(_) => {}
                Err(WsError::Io(ref e)) if e.kind() == ErrorKind::WouldBlock => return Peer::Open,
                Err(WsError::ConnectionClosed | WsError::AlreadyClosed) => {
                    return Peer::Gone("connection closed".into());
                }
                Err(e) => return Peer::Gone(e.to_string()),
            }
        }
    }

    /// Send a frame, treating a full socket buffer as queued.
    fn send(&mut self, frame: Message) -> Result<(), WsError> {
        match self.ws.send(frame) {
            Err(WsError::Io(ref e)) if e.kind() == ErrorKind::WouldBlock => Ok(()),
            other => other,
        }
    }

    /// Give the peer a moment to answer our close frame.
    fn drain_close(&mut self) {
        let deadline = Instant::now() + POLL_INTERVAL * 4;
        while Instant::now() < deadline {
            if let Peer::Gone(_) = self.poll_peer() {
                return;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
    }

    fn close(mut self) {
        self.transition(ViewerState::Closed);
        self.hub.unregister(self.id);
        let _ = self.ws.flush();
        let _ = self.ws.get_ref().shutdown(Shutdown::Both);
    }

    fn transition(&mut self, next: ViewerState) {
        crate::debug!("live"; "viewer {}: {} -> {}", self.id, self.state.label(), next.label());
        self.state = next;
    }
}
