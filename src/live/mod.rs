//! Live Channel
//!
//! Listens on a push-notification WebSocket and turns every inbound message
//! into a reload request.
//!
//! # Architecture
//!
//! ```text
//! notify server --ws--> reader thread --mpsc--> reload task --> ReloadSynchronizer
//!                       (blocking)                (tokio)
//! ```
//!
//! The message body is ignored. A failed connect is reported once and never
//! retried; the caller falls back to startup-only reloads.

use std::net::TcpStream;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tungstenite::protocol::Message;
use tungstenite::stream::MaybeTlsStream;
use tungstenite::WebSocket;

use crate::reload::{ModuleSource, ReloadSynchronizer};
use crate::runtime::EmbeddedRuntime;

/// How often the reader wakes up to check for `stop`.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Notifications buffered between the reader thread and the reload task.
const CHANNEL_CAPACITY: usize = 32;

/// Backoff while the channel is full.
const SEND_RETRY: Duration = Duration::from_millis(10);

type Socket = WebSocket<MaybeTlsStream<TcpStream>>;

#[derive(Debug, Error)]
pub enum LiveError {
    #[error("failed to connect to `{url}`")]
    Connect {
        url: String,
        #[source]
        cause: tungstenite::Error,
    },
}

/// One inbound push message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Text payload, or a size summary for binary frames.
    pub payload: String,
}

/// A connected, not yet listening, push channel.
pub struct LiveChannel {
    socket: Socket,
    url: String,
}

impl LiveChannel {
    /// Open the WebSocket connection. Blocks until the handshake completes.
    pub fn connect(url: &str) -> Result<Self, LiveError> {
        let connect_error = |cause| LiveError::Connect {
            url: url.to_string(),
            cause,
        };

        let (socket, _response) = tungstenite::connect(url).map_err(connect_error)?;
        if let MaybeTlsStream::Plain(stream) = socket.get_ref() {
            stream
                .set_read_timeout(Some(POLL_INTERVAL))
                .map_err(|e| connect_error(tungstenite::Error::Io(e)))?;
        }

        crate::log!("live"; "connected to {}", url);
        Ok(Self {
            socket,
            url: url.to_string(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Start the reader thread. Notifications arrive on the returned receiver
    /// until the socket closes or the handle is stopped.
    pub fn listen(self) -> (LiveHandle, mpsc::Receiver<Notification>) {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let stop = Arc::new(AtomicBool::new(false));

        let reader = thread::spawn({
            let stop = Arc::clone(&stop);
            move || reader_loop(self.socket, &stop, &tx)
        });

        let handle = LiveHandle {
            stop,
            reader: Some(reader),
            task: None,
        };
        (handle, rx)
    }

    /// Listen and trigger `sync.reload()` for every notification.
    ///
    /// Each reload runs on its own task, so a notification arriving mid-pass
    /// is folded into the synchronizer's pending follow-up.
    pub fn spawn<R, S>(self, sync: Arc<ReloadSynchronizer<R, S>>) -> LiveHandle
    where
        R: EmbeddedRuntime,
        S: ModuleSource,
    {
        let (mut handle, mut rx) = self.listen();
        handle.task = Some(tokio::spawn(async move {
            while let Some(notification) = rx.recv().await {
                crate::debug!("live"; "notification: {}", notification.payload);
                let sync = Arc::clone(&sync);
                tokio::spawn(async move {
                    // Failures are logged by the synchronizer.
                    let _ = sync.reload().await;
                });
            }
            crate::debug!("live"; "listener finished");
        }));
        handle
    }
}

/// Running live channel. Dropping it stops the reader like [`LiveHandle::stop`].
pub struct LiveHandle {
    stop: Arc<AtomicBool>,
    reader: Option<thread::JoinHandle<()>>,
    task: Option<tokio::task::JoinHandle<()>>,
}

impl LiveHandle {
    pub fn is_running(&self) -> bool {
        self.reader.as_ref().is_some_and(|r| !r.is_finished())
    }

    /// Close the socket and wait for the reader to exit.
    ///
    /// Blocks the calling thread for up to one poll interval. Async callers
    /// use [`LiveHandle::close`].
    pub fn stop(mut self) {
        self.shutdown();
    }

    /// [`LiveHandle::stop`] with the wait moved onto the blocking pool.
    pub async fn close(self) {
        if let Err(e) = tokio::task::spawn_blocking(move || self.stop()).await {
            crate::log!("live"; "shutdown task failed: {}", e);
        }
    }

    fn shutdown(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(reader) = self.reader.take() {
            let _ = reader.join();
        }
        // The reload task ends once the reader drops its sender.
        self.task.take();
    }
}

impl Drop for LiveHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn reader_loop(mut socket: Socket, stop: &AtomicBool, tx: &mpsc::Sender<Notification>) {
    while !stop.load(Ordering::SeqCst) {
        let payload = match socket.read() {
            Ok(Message::Text(text)) => text.as_str().to_string(),
            Ok(Message::Binary(data)) => format!("<{} bytes>", data.len()),
            Ok(Message::Close(_)) => {
                crate::log!("live"; "server closed the connection");
                break;
            }
            Ok(_) => continue,
            Err(tungstenite::Error::Io(ref e))
                if matches!(
                    e.kind(),
                    std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
                ) =>
            {
                continue;
            }
            Err(tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed) => break,
            Err(e) => {
                crate::log!("live"; "connection lost: {}", e);
                break;
            }
        };

        if !forward(tx, stop, Notification { payload }) {
            break;
        }
    }

    let _ = socket.close(None);
    let _ = socket.flush();
}

/// Queue a notification, waiting while the channel is full.
/// Returns false once the receiver is gone or `stop` is set.
fn forward(tx: &mpsc::Sender<Notification>, stop: &AtomicBool, notification: Notification) -> bool {
    let mut notification = notification;
    loop {
        match tx.try_send(notification) {
            Ok(()) => return true,
            Err(TrySendError::Full(pending)) if !stop.load(Ordering::SeqCst) => {
                notification = pending;
                thread::sleep(SEND_RETRY);
            }
            Err(_) => return false,
        }
    }
}
