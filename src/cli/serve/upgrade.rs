//! WebSocket upgrade on the public port.
//!
//! The gateway peeks at each connection's request head without consuming it.
//! Upgrades are completed by tungstenite on the raw stream, so the viewer's
//! pump owns a real socket it can poll for the peer going away.

use std::io;
use std::net::TcpStream;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};

use super::ServeContext;
use crate::reload::channel::ViewerChannel;
use crate::reload::connection::ViewerConnection;

/// Request heads longer than this are never upgrades worth waiting for.
const MAX_HEAD: usize = 8 * 1024;

/// How long a client may take to send its request head.
const HEAD_TIMEOUT: Duration = Duration::from_secs(5);

/// Peek the request head, leaving every byte in the socket.
///
/// Returns a partial head when the peer closes before sending anything,
/// stalls past [`HEAD_TIMEOUT`], or overflows [`MAX_HEAD`].
pub fn peek_head(stream: &TcpStream) -> io::Result<Vec<u8>> {
    stream.set_read_timeout(Some(HEAD_TIMEOUT))?;
    let deadline = Instant::now() + HEAD_TIMEOUT;
    let mut buf = vec![0; MAX_HEAD];

    let len = loop {
        let n = stream.peek(&mut buf)?;
        if n == 0 || n == buf.len() || head_complete(&buf[..n]) || Instant::now() >= deadline {
            break n;
        }
        std::thread::sleep(Duration::from_millis(5));
    };

    stream.set_read_timeout(None)?;
    buf.truncate(len);
    Ok(buf)
}

fn head_complete(head: &[u8]) -> bool {
    head.windows(4).any(|w| w == b"\r\n\r\n")
}

/// Whether the request head asks for a WebSocket upgrade.
pub fn is_websocket_upgrade(head: &[u8]) -> bool {
    let head = String::from_utf8_lossy(head);
    head.split("\r\n")
        .skip(1)
        .take_while(|line| !line.is_empty())
        .filter_map(|line| line.split_once(':'))
        .any(|(name, value)| {
            name.trim().eq_ignore_ascii_case("upgrade")
                && value.split(',').any(|v| v.trim().eq_ignore_ascii_case("websocket"))
        })
}

/// Complete the handshake and register a new viewer with the hub.
pub fn accept_viewer(stream: TcpStream, ctx: &ServeContext) -> Result<()> {
    let ws = match tungstenite::accept(stream) {
        Ok(ws) => ws,
        Err(e) => bail!("websocket handshake failed: {e}"),
    };

    let (channel, rx) = ViewerChannel::new(ctx.live.queue);
    let id = channel.id();
    let connection =
        ViewerConnection::new(id, ws, rx, Arc::clone(&ctx.hub), ctx.live.heartbeat());

    // Register before the pump starts so a broadcast racing the handshake is queued.
    ctx.hub.register(channel);
    crate::debug!("live"; "viewer {} connected ({} open)", id, ctx.hub.len());

    let spawned = std::thread::Builder::new()
        .name(format!("viewer-{id}"))
        .spawn(move || connection.run());

    if let Err(e) = spawned {
        ctx.hub.unregister(id);
        return Err(e).with_context(|| format!("failed to start pump for viewer {id}"));
    }
    Ok(())
}
