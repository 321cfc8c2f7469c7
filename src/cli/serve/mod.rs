//! Development server for module hot reload.
//!
//! Serves `serve.root` over HTTP with caching disabled, watches `serve.watch`
//! and pushes `update` over the notification WebSocket after every debounced
//! burst of changes. Live channels then re-fetch the manifest from the HTTP
//! side.

mod broadcast;
mod lifecycle;
mod path;
mod response;
mod watch;

pub use broadcast::{Clients, NotifyServer, UPDATE};
pub use response::NO_CACHE;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use crossbeam::channel;
use tiny_http::{Method, Request, Server};

use crate::config::BridgeConfig;
use crate::core::{is_shutdown, register_server};
use crate::{debug, log};

/// Run the development server until Ctrl+C.
pub fn serve(config: &BridgeConfig) -> Result<()> {
    let serve = &config.serve;
    let (server, addr) = lifecycle::bind_with_retry(serve.interface, serve.port)?;
    let server = Arc::new(server);
    register_server(Arc::clone(&server));

    // Workers stop when this sender is dropped.
    let (stop_tx, stop_rx) = channel::bounded::<()>(0);
    let notify = NotifyServer::start(serve.interface, serve.ws_port, stop_rx.clone())
        .context("failed to start notify server")?;

    log!("serve"; "http://{}", addr);
    log!("live"; "ws://{}:{}", serve.interface, notify.port());

    let mut workers = Vec::new();
    if serve.watch.is_dir() {
        let clients = notify.clients();
        let watcher = watch::spawn(&serve.watch, serve.debounce(), stop_rx, move |paths| {
            debug!("watch"; "{} path(s) changed", paths.len());
            let sent = clients.broadcast(UPDATE);
            log!("reload"; "{} change(s), notified {} client(s)", paths.len(), sent);
        })
        .with_context(|| format!("failed to watch {}", serve.watch.display()))?;
        log!("watch"; "{}", serve.watch.display());
        workers.push(watcher);
    } else {
        log!("watch"; "{} is not a directory, file watching disabled", serve.watch.display());
    }
    workers.push(notify.into_handle());

    run_request_loop(&server, &serve.root);

    drop(stop_tx);
    lifecycle::wait_for_shutdown(workers);
    Ok(())
}

fn run_request_loop(server: &Server, root: &Path) {
    for request in server.incoming_requests() {
        if let Err(e) = handle_request(request, root) {
            log!("serve"; "request error: {e}");
        }
    }
}

/// Handle a single HTTP request
fn handle_request(request: Request, root: &Path) -> Result<()> {
    if is_shutdown() {
        return response::respond_unavailable(request);
    }

    if !matches!(request.method(), Method::Get | Method::Head) {
        return response::respond_method_not_allowed(request);
    }

    debug!("serve"; "{} {}", request.method(), request.url());
    match path::resolve_path(request.url(), root) {
        Some(file) => response::respond_file(request, &file),
        None => response::respond_not_found(request),
    }
}
