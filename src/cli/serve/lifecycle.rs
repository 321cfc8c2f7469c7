//! Server lifecycle management.

use std::net::{IpAddr, SocketAddr, TcpListener};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use anyhow::Result;
use tiny_http::Server;

use crate::log;

/// Maximum number of port binding attempts.
const MAX_PORT_RETRIES: u16 = 10;

/// Bind the HTTP server, moving up from `base_port` while ports are taken.
pub fn bind_with_retry(interface: IpAddr, base_port: u16) -> Result<(Server, SocketAddr)> {
    retry_ports(base_port, |port| {
        let addr = SocketAddr::new(interface, port);
        Server::http(addr)
            .map(|server| {
                let addr = server.server_addr().to_ip().unwrap_or(addr);
                (server, addr)
            })
            .map_err(|e| e.to_string())
    })
    .inspect(|(_, addr)| {
        if base_port != 0 && addr.port() != base_port {
            log!("serve"; "port {} in use, using {} instead", base_port, addr.port());
        }
    })
}

/// Bind the notification listener with the same retry policy.
pub fn bind_listener_with_retry(interface: IpAddr, base_port: u16) -> Result<(TcpListener, u16)> {
    retry_ports(base_port, |port| {
        let listener = TcpListener::bind(SocketAddr::new(interface, port)).map_err(|e| e.to_string())?;
        let actual = listener.local_addr().map_err(|e| e.to_string())?.port();
        Ok((listener, actual))
    })
    .inspect(|(_, port)| {
        if base_port != 0 && *port != base_port {
            log!("live"; "port {} in use, using {} instead", base_port, port);
        }
    })
}

fn retry_ports<T>(base_port: u16, mut bind: impl FnMut(u16) -> Result<T, String>) -> Result<T> {
    let mut last_error = String::new();
    let mut last_port = base_port;

    for offset in 0..MAX_PORT_RETRIES {
        last_port = base_port.saturating_add(offset);
        match bind(last_port) {
            Ok(bound) => return Ok(bound),
            Err(e) => last_error = e,
        }
        // Port 0 asks the OS; retrying it is pointless.
        if base_port == 0 {
            break;
        }
    }

    Err(anyhow::anyhow!(
        "Failed to bind after {} attempts (ports {}-{}): {}",
        MAX_PORT_RETRIES,
        base_port,
        last_port,
        last_error
    ))
}

/// Wait for background workers to finish (max 2 seconds).
pub fn wait_for_shutdown(handles: impl IntoIterator<Item = JoinHandle<()>>) {
    let mut pending: Vec<_> = handles.into_iter().collect();

    for _ in 0..40 {
        let (done, rest): (Vec<_>, Vec<_>) = pending.into_iter().partition(JoinHandle::is_finished);
        for handle in done {
            let _ = handle.join();
        }
        pending = rest;
        if pending.is_empty() {
            return;
        }
        thread::sleep(Duration::from_millis(50));
    }
    crate::debug!("serve"; "{} worker(s) still running at exit", pending.len());
}
