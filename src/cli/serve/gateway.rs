//! Public port shared by HTTP and WebSocket.
//!
//! The acceptor owns the listener. Each connection gets a short-lived thread
//! that peeks its request head: upgrades become viewers, everything else is
//! piped to the HTTP server on its loopback address.

use std::io::ErrorKind;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::thread::JoinHandle;
use std::time::Duration;

use anyhow::{Context, Result};

use super::{ServeContext, proxy, upgrade};
use crate::{debug, log};

/// Sleep between polls of the non-blocking listener.
const ACCEPT_POLL: Duration = Duration::from_millis(50);

/// Spawn the acceptor. It exits, dropping the listener, once shutdown starts.
pub fn spawn_acceptor(
    listener: TcpListener,
    upstream: SocketAddr,
    ctx: Arc<ServeContext>,
) -> Result<JoinHandle<()>> {
    listener
        .set_nonblocking(true)
        .context("failed to configure listener")?;

    std::thread::Builder::new()
        .name("mdview-accept".into())
        .spawn(move || accept_loop(&listener, upstream, &ctx))
        .context("failed to start acceptor thread")
}

fn accept_loop(listener: &TcpListener, upstream: SocketAddr, ctx: &Arc<ServeContext>) {
    while !ctx.shutdown.load(Ordering::SeqCst) {
        match listener.accept() {
            Ok((stream, peer)) => {
                let ctx = Arc::clone(ctx);
                let spawned = std::thread::Builder::new()
                    .name("mdview-conn".into())
                    .spawn(move || {
                        if let Err(e) = dispatch(stream, upstream, &ctx) {
                            debug!("serve"; "connection from {}: {:#}", peer, e);
                        }
                    });
                if let Err(e) = spawned {
                    log!("serve"; "failed to start connection thread: {}", e);
                }
            }
            Err(ref e) if e.kind() == ErrorKind::WouldBlock => std::thread::sleep(ACCEPT_POLL),
            Err(e) => {
                log!("serve"; "accept error: {}", e);
                std::thread::sleep(ACCEPT_POLL);
            }
        }
    }
    debug!("serve"; "acceptor stopped");
}

/// Route one connection by its request head.
fn dispatch(stream: TcpStream, upstream: SocketAddr, ctx: &ServeContext) -> Result<()> {
    // Accepted sockets inherit non-blocking mode on some platforms.
    stream.set_nonblocking(false)?;
    let head = upgrade::peek_head(&stream).context("failed to read request head")?;

    if upgrade::is_websocket_upgrade(&head) {
        if ctx.shutdown.load(Ordering::SeqCst) {
            return Ok(());
        }
        return upgrade::accept_viewer(stream, ctx);
    }
    proxy::forward(stream, upstream)
}
