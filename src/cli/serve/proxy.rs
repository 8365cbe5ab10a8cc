//! Byte pipe from the public port to the HTTP server.

use std::io;
use std::net::{Shutdown, SocketAddr, TcpStream};

use anyhow::{Context, Result};

/// Pipe `client` to the server at `upstream` until either side closes.
pub fn forward(mut client: TcpStream, upstream: SocketAddr) -> Result<()> {
    let mut server = TcpStream::connect(upstream)
        .with_context(|| format!("failed to reach http server at {upstream}"))?;
    let _ = server.set_nodelay(true);
    let _ = client.set_nodelay(true);

    let mut requests = client.try_clone()?;
    let mut upstream_tx = server.try_clone()?;
    let inbound = std::thread::Builder::new()
        .name("mdview-pipe".into())
        .spawn(move || {
            let _ = io::copy(&mut requests, &mut upstream_tx);
            // Pass the client's half-close on so the server finishes up.
            let _ = upstream_tx.shutdown(Shutdown::Write);
        })
        .context("failed to start pipe thread")?;

    let _ = io::copy(&mut server, &mut client);
    // Server is done with this connection: wake the inbound copy too.
    let _ = client.shutdown(Shutdown::Both);
    let _ = inbound.join();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;

    #[test]
    fn test_forward_round_trip() {
        let upstream = TcpListener::bind("127.0.0.1:0").unwrap();
        let upstream_addr = upstream.local_addr().unwrap();
        let echo = std::thread::spawn(move || {
            let (mut conn, _) = upstream.accept().unwrap();
            let mut buf = [0; 5];
            conn.read_exact(&mut buf).unwrap();
            conn.write_all(b"pong:").unwrap();
            conn.write_all(&buf).unwrap();
            // Dropping closes the upstream side like `Connection: close`.
        });

        let front = TcpListener::bind("127.0.0.1:0").unwrap();
        let front_addr = front.local_addr().unwrap();
        let pipe = std::thread::spawn(move || {
            let (conn, _) = front.accept().unwrap();
            forward(conn, upstream_addr).unwrap();
        });

        let mut client = TcpStream::connect(front_addr).unwrap();
        client.write_all(b"hello").unwrap();
        let mut reply = String::new();
        client.read_to_string(&mut reply).unwrap();
        assert_eq!(reply, "pong:hello");

        echo.join().unwrap();
        pipe.join().unwrap();
    }

    #[test]
    fn test_forward_unreachable_upstream() {
        // Bind then drop so the port is very likely closed.
        let addr = TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap();

        let front = TcpListener::bind("127.0.0.1:0").unwrap();
        let client = TcpStream::connect(front.local_addr().unwrap()).unwrap();
        let (conn, _) = front.accept().unwrap();

        assert!(forward(conn, addr).is_err());
        drop(client);
    }
}
