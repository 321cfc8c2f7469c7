//! Notification WebSocket server.
//!
//! Live channels connect here; every debounced change in the watched
//! directory is pushed to all of them as a single `update` text frame.

use std::net::{IpAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use anyhow::Result;
use crossbeam::channel::{Receiver, RecvTimeoutError};
use parking_lot::Mutex;
use tungstenite::{Message, WebSocket};

use super::lifecycle::bind_listener_with_retry;

/// Message pushed to clients when modules changed.
pub const UPDATE: &str = "update";

/// Poll interval of the acceptor while idle.
const ACCEPT_POLL: Duration = Duration::from_millis(100);

/// Connected clients, shared between the acceptor and the watcher.
#[derive(Clone, Default)]
pub struct Clients {
    inner: Arc<Mutex<Vec<WebSocket<TcpStream>>>>,
}

impl Clients {
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    fn add(&self, stream: TcpStream) {
        let peer = stream.peer_addr().ok();
        // Handshake blocking, then non-blocking so a stalled client cannot hold the lock.
        match tungstenite::accept(stream) {
            Ok(ws) => {
                let _ = ws.get_ref().set_nonblocking(true);
                self.inner.lock().push(ws);
                crate::debug!("live"; "client connected: {:?}", peer);
            }
            Err(e) => crate::debug!("live"; "handshake failed: {}", e),
        }
    }

    /// Send `text` to every client, dropping the ones that fail.
    ///
    /// Returns the number of clients still connected.
    pub fn broadcast(&self, text: &str) -> usize {
        let mut clients = self.inner.lock();
        if clients.is_empty() {
            crate::debug!("live"; "no clients connected");
            return 0;
        }

        clients.retain_mut(|ws| {
            drain_incoming(ws);
            match ws.send(Message::Text(text.into())) {
                Ok(()) => true,
                Err(tungstenite::Error::Io(e)) if e.kind() == std::io::ErrorKind::WouldBlock => true,
                Err(e) => {
                    crate::debug!("live"; "client disconnected: {}", e);
                    false
                }
            }
        });
        crate::debug!("live"; "broadcast `{}` to {} clients", text, clients.len());
        clients.len()
    }
}

/// Read whatever the client sent so pings get answered and closes noticed.
fn drain_incoming(ws: &mut WebSocket<TcpStream>) {
    while let Ok(message) = ws.read() {
        if message.is_close() {
            break;
        }
    }
}

/// Bound notification server with its acceptor thread.
pub struct NotifyServer {
    port: u16,
    clients: Clients,
    acceptor: JoinHandle<()>,
}

impl NotifyServer {
    /// Bind on `interface`, retrying upward from `base_port`, and start accepting.
    ///
    /// The acceptor exits when `stop` receives or disconnects.
    pub fn start(interface: IpAddr, base_port: u16, stop: Receiver<()>) -> Result<Self> {
        let (listener, port) = bind_listener_with_retry(interface, base_port)?;
        listener.set_nonblocking(true)?;

        let clients = Clients::default();
        let acceptor = {
            let clients = clients.clone();
            thread::spawn(move || accept_loop(&listener, &clients, &stop))
        };

        Ok(Self {
            port,
            clients,
            acceptor,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn clients(&self) -> Clients {
        self.clients.clone()
    }

    pub fn into_handle(self) -> JoinHandle<()> {
        self.acceptor
    }
}

fn accept_loop(listener: &TcpListener, clients: &Clients, stop: &Receiver<()>) {
    loop {
        match listener.accept() {
            Ok((stream, _)) => {
                let _ = stream.set_nonblocking(false);
                clients.add(stream);
                continue;
            }
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {}
            Err(e) => crate::log!("live"; "accept error: {}", e),
        }

        match stop.recv_timeout(ACCEPT_POLL) {
            Err(RecvTimeoutError::Timeout) => {}
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
        }
    }
    crate::debug!("live"; "notify server stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;
    use std::time::Instant;

    fn wait_for(mut condition: impl FnMut() -> bool) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while !condition() {
            assert!(Instant::now() < deadline, "condition not reached");
            thread::sleep(Duration::from_millis(10));
        }
    }

    #[test]
    fn test_broadcast_reaches_connected_clients() {
        let (stop_tx, stop_rx) = crossbeam::channel::bounded::<()>(0);
        let server = NotifyServer::start(IpAddr::V4(Ipv4Addr::LOCALHOST), 0, stop_rx).unwrap();
        let url = format!("ws://127.0.0.1:{}", server.port());

        let (mut first, _) = tungstenite::connect(&url).unwrap();
        let (mut second, _) = tungstenite::connect(&url).unwrap();
        let clients = server.clients();
        wait_for(|| clients.len() == 2);

        assert_eq!(clients.broadcast(UPDATE), 2);
        assert_eq!(first.read().unwrap(), Message::Text(UPDATE.into()));
        assert_eq!(second.read().unwrap(), Message::Text(UPDATE.into()));

        drop(stop_tx);
        server.into_handle().join().unwrap();
    }

    #[test]
    fn test_closed_clients_are_dropped() {
        let (_stop_tx, stop_rx) = crossbeam::channel::bounded::<()>(0);
        let server = NotifyServer::start(IpAddr::V4(Ipv4Addr::LOCALHOST), 0, stop_rx).unwrap();
        let clients = server.clients();

        let (mut client, _) = tungstenite::connect(format!("ws://127.0.0.1:{}", server.port())).unwrap();
        wait_for(|| clients.len() == 1);
        client.close(None).unwrap();
        drop(client);

        wait_for(|| clients.broadcast(UPDATE) == 0);
        assert!(clients.is_empty());
    }
}
