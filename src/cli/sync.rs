//! `sync` command: stage the module manifest into a directory.
//!
//! Runs the reload synchronizer against a [`HeadlessRuntime`] backed by a
//! directory, so the staged tree can be inspected without an interpreter.
//! With `--watch` the live channel stays open and every notification restages.

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use crossbeam::channel::{self, TryRecvError};

use crate::bridge::Bridge;
use crate::config::BridgeConfig;
use crate::logger::WatchStatus;
use crate::reload::synchronizer::error_chain;
use crate::reload::{HttpSource, ReloadError, ReloadOutcome};
use crate::runtime::{DirectoryFs, HeadlessRuntime};
use crate::{debug, log};

const LIVE_POLL: Duration = Duration::from_millis(200);

pub async fn sync(mut config: BridgeConfig, out: &Path, watch: bool) -> Result<()> {
    fs::create_dir_all(out).with_context(|| format!("failed to create {}", out.display()))?;
    let source = HttpSource::new(&config.modules.base_url, config.modules.fetch_timeout())
        .context("invalid modules.base_url")?;
    let runtime = Arc::new(HeadlessRuntime::new(DirectoryFs::new(out)));

    config.live.enabled = watch;
    let live_url = config.live.url.clone();
    let mut bridge = Bridge::new(config, Arc::clone(&runtime), source);

    log!("reload"; "{} -> {}", bridge.config().modules.base_url, out.display());
    let startup = bridge.start().await;
    let mut status = WatchStatus::new();
    report(&mut status, &startup);

    if !watch {
        startup?;
        return Ok(());
    }
    if !bridge.is_live() {
        bail!("live channel unavailable at {}", live_url);
    }

    let (shutdown_tx, shutdown_rx) = channel::bounded::<()>(1);
    crate::core::register_shutdown(shutdown_tx);
    log!("live"; "listening on {}, Ctrl+C to stop", live_url);

    loop {
        match shutdown_rx.try_recv() {
            Ok(()) | Err(TryRecvError::Disconnected) => break,
            Err(TryRecvError::Empty) => {}
        }
        if !bridge.is_live() {
            log!("live"; "channel closed");
            break;
        }
        tokio::time::sleep(LIVE_POLL).await;
    }

    bridge.shutdown().await;
    debug!("reload"; "{} runtime call(s)", runtime.calls());
    Ok(())
}

fn report(status: &mut WatchStatus, outcome: &Result<ReloadOutcome, ReloadError>) {
    match outcome {
        Ok(ReloadOutcome::Completed(report)) => status.success(&format!(
            "staged {} module(s), {} changed, {} bytes",
            report.staged.len(),
            report.changed.len(),
            report.bytes
        )),
        Ok(ReloadOutcome::Queued) => debug!("reload"; "queued behind a running pass"),
        Err(e) => status.error("reload failed", &error_chain(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use tempfile::TempDir;
    use tiny_http::{Response, Server};

    use crate::config::test_parse_config;

    /// Serve every request from `files` until `count` requests were answered.
    fn module_server(
        files: &'static [(&'static str, &'static str)],
        count: usize,
    ) -> (String, thread::JoinHandle<()>) {
        let server = Server::http("127.0.0.1:0").unwrap();
        let base = format!("http://{}/webgpu/", server.server_addr().to_ip().unwrap());
        let handle = thread::spawn(move || {
            for _ in 0..count {
                let request = server.recv().unwrap();
                let path = request.url().trim_start_matches("/webgpu/").to_string();
                let response = match files.iter().find(|(name, _)| *name == path) {
                    Some((_, body)) => Response::from_string(*body),
                    None => Response::from_string("missing").with_status_code(404),
                };
                request.respond(response).unwrap();
            }
        });
        (base, handle)
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_sync_stages_manifest_on_disk() {
        let (base, server) = module_server(
            &[("main.py", "def reload(): pass"), ("shaders/line.wgsl", "@vertex")],
            2,
        );
        let out = TempDir::new().unwrap();
        let mut config = test_parse_config(
            "[modules]\nstaging_dir = \"webgpu\"\nfiles = [\"main.py\", \"shaders/line.wgsl\"]",
        );
        config.modules.base_url = base;

        sync(config, out.path(), false).await.unwrap();

        let staged = out.path().join("webgpu");
        assert_eq!(fs::read_to_string(staged.join("main.py")).unwrap(), "def reload(): pass");
        assert_eq!(fs::read_to_string(staged.join("shaders/line.wgsl")).unwrap(), "@vertex");
        tokio::task::spawn_blocking(move || server.join().unwrap()).await.unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_sync_reports_missing_module() {
        let (base, server) = module_server(&[], 1);
        let out = TempDir::new().unwrap();
        let mut config = test_parse_config("[modules]\nfiles = [\"main.py\"]");
        config.modules.base_url = base;

        let err = sync(config, out.path(), false).await.unwrap_err();
        let reload = err.downcast_ref::<ReloadError>().unwrap();
        assert_eq!(reload.path(), Some("main.py"));
        tokio::task::spawn_blocking(move || server.join().unwrap()).await.unwrap();
    }
}
