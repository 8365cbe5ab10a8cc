//! Server lifecycle management.

use std::net::{IpAddr, Ipv4Addr, SocketAddr, TcpListener};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::thread::JoinHandle;

use anyhow::{Context, Result};
use tiny_http::Server;

use crate::error::PreviewError;
use crate::log;
use crate::reload::NotificationHub;
use crate::reload::watch::ChangeWatcher;

/// Maximum number of port binding attempts.
const MAX_PORT_RETRIES: u16 = 10;

/// Bind the public port on the specified interface, with automatic port retry.
///
/// Port `0` is a single attempt on an OS-assigned port. The returned address
/// always carries the port actually bound.
pub fn bind_with_retry(
    interface: IpAddr,
    base_port: u16,
) -> Result<(TcpListener, SocketAddr), PreviewError> {
    let attempts = if base_port == 0 { 1 } else { MAX_PORT_RETRIES };
    let mut last_error = None;

    for offset in 0..attempts {
        let Some(port) = base_port.checked_add(offset) else {
            break;
        };
        let addr = SocketAddr::new(interface, port);

        match TcpListener::bind(addr) {
            Ok(listener) => {
                let bound = listener.local_addr().unwrap_or(addr);
                if offset > 0 {
                    log!("serve"; "port {} in use, using {} instead", base_port, bound.port());
                }
                return Ok((listener, bound));
            }
            Err(e) => last_error = Some(e),
        }
    }

    let end = base_port.saturating_add(attempts - 1);
    Err(PreviewError::PortBind {
        addr: if attempts > 1 {
            format!("{interface}:{base_port}-{end}")
        } else {
            SocketAddr::new(interface, base_port).to_string()
        },
        source: last_error.map_or_else(|| "port range exhausted".into(), Into::into),
    })
}

/// Start the HTTP server on a loopback port only the gateway talks to.
pub fn bind_upstream() -> Result<(Server, SocketAddr), PreviewError> {
    let addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 0);
    let server = Server::http(addr).map_err(|source| PreviewError::PortBind {
        addr: addr.to_string(),
        source,
    })?;
    let bound = server.server_addr().to_ip().unwrap_or(addr);
    Ok((server, bound))
}

/// Install the Ctrl+C handler.
///
/// The handler flips `shutdown`, which stops the acceptor, and unblocks the
/// request loop. It holds the server weakly so dropping the last strong
/// handle still releases its port.
pub fn install_shutdown_handler(server: Weak<Server>, shutdown: Arc<AtomicBool>) -> Result<()> {
    ctrlc::set_handler(move || {
        shutdown.store(true, Ordering::SeqCst);
        if let Some(server) = server.upgrade() {
            server.unblock();
        }
    })
    .context("failed to set Ctrl+C handler")
}

/// Tear down in order: watcher, viewers, listening sockets.
pub fn shutdown(
    mut watcher: ChangeWatcher,
    hub: &NotificationHub,
    acceptor: JoinHandle<()>,
    server: Arc<Server>,
) {
    watcher.stop();
    crate::debug!("watch"; "released {}", watcher.target().display());
    let closed = hub.close_all();
    // The acceptor owns the public listener and drops it on exit.
    if acceptor.join().is_err() {
        log!("serve"; "acceptor thread panicked");
    }
    drop(server);
    log!("serve"; "stopped, {} viewer(s) closed", closed);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    const LOCALHOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

    #[test]
    fn test_port_zero_reports_real_port() {
        let (_server, addr) = bind_with_retry(LOCALHOST, 0).unwrap();
        assert_ne!(addr.port(), 0);
    }

    #[test]
    fn test_busy_port_retries_next() {
        let (_first, addr) = bind_with_retry(LOCALHOST, 0).unwrap();
        let (_second, next) = bind_with_retry(LOCALHOST, addr.port()).unwrap();
        assert_ne!(next.port(), addr.port());
    }

    #[test]
    fn test_bind_failure_is_port_bind_error() {
        // TEST-NET-1 is never assigned to a local interface.
        let unroutable = IpAddr::V4(Ipv4Addr::new(192, 0, 2, 1));
        let Err(err) = bind_with_retry(unroutable, 0) else {
            panic!("bind should fail");
        };
        assert!(matches!(err, PreviewError::PortBind { .. }));
        assert!(err.to_string().contains("192.0.2.1"));
    }

    #[test]
    fn test_upstream_is_loopback() {
        let Ok((_server, addr)) = bind_upstream() else {
            panic!("loopback bind should succeed");
        };
        assert!(addr.ip().is_loopback());
        assert_ne!(addr.port(), 0);
    }
}
