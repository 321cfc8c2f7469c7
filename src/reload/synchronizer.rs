//! Reload Synchronizer
//!
//! One reload pass:
//!
//! ```text
//! mkdir(staging_dir) -> for path in manifest { fetch -> mkdir parents -> write_file } -> call(reload_entry)
//! ```
//!
//! Passes never overlap. A request arriving mid-pass marks a single follow-up
//! pass as pending and returns [`ReloadOutcome::Queued`]; the caller driving
//! the current pass runs it once its own pass ends.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::timeout;

use super::error::ReloadError;
use super::source::ModuleSource;
use super::store::ModuleStore;
use crate::runtime::{EmbeddedRuntime, FsError, RuntimeGate, VirtualFs, join_path, parent_path};

/// Timeouts and the entry point invoked after staging.
#[derive(Debug, Clone)]
pub struct ReloadSettings {
    pub reload_entry: String,
    pub fetch_timeout: Duration,
    pub call_timeout: Duration,
}

/// Summary of one completed pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReloadReport {
    /// 1-based pass counter across the synchronizer's lifetime.
    pub pass: u64,
    /// Manifest paths written, in order.
    pub staged: Vec<String>,
    /// Subset of `staged` whose content differed from the previous pass.
    pub changed: Vec<String>,
    pub bytes: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReloadOutcome {
    Completed(ReloadReport),
    /// Folded into the pass already in flight.
    Queued,
}

#[derive(Debug, Default)]
struct Session {
    active: bool,
    pending: bool,
}

/// Ends the session when the driving future is dropped mid-pass.
struct SessionGuard<'a> {
    session: &'a Mutex<Session>,
    finished: bool,
}

impl SessionGuard<'_> {
    /// Consume the pending flag, or close the session if nothing is pending.
    ///
    /// Check and close happen under one lock so a request can't slip in
    /// between and be lost.
    fn take_pending(&mut self) -> bool {
        let mut session = self.session.lock();
        if session.pending {
            session.pending = false;
            return true;
        }
        session.active = false;
        self.finished = true;
        false
    }
}

impl Drop for SessionGuard<'_> {
    fn drop(&mut self) {
        if !self.finished {
            let mut session = self.session.lock();
            if session.pending {
                crate::log!("reload"; "pass cancelled, queued follow-up dropped");
            }
            session.active = false;
            session.pending = false;
        }
    }
}

pub struct ReloadSynchronizer<R, S> {
    runtime: Arc<R>,
    source: S,
    gate: RuntimeGate,
    store: Mutex<ModuleStore>,
    session: Mutex<Session>,
    settings: ReloadSettings,
    passes: AtomicU64,
}

impl<R: EmbeddedRuntime, S: ModuleSource> ReloadSynchronizer<R, S> {
    pub fn new(
        runtime: Arc<R>,
        source: S,
        gate: RuntimeGate,
        store: ModuleStore,
        settings: ReloadSettings,
    ) -> Self {
        Self {
            runtime,
            source,
            gate,
            store: Mutex::new(store),
            session: Mutex::new(Session::default()),
            settings,
            passes: AtomicU64::new(0),
        }
    }

    /// Snapshot of the module cache.
    pub fn store(&self) -> ModuleStore {
        self.store.lock().clone()
    }

    pub fn is_reloading(&self) -> bool {
        self.session.lock().active
    }

    /// Passes started so far.
    pub fn passes(&self) -> u64 {
        self.passes.load(Ordering::SeqCst)
    }

    /// Fetch, stage and reinitialize the module set.
    ///
    /// Returns the outcome of the last pass this call drove. Errors are also
    /// logged, since live-triggered reloads have no caller to report to.
    ///
    /// Dropping the future mid-pass ends the session and discards any
    /// follow-up queued behind it. The next call starts a fresh pass.
    pub async fn reload(&self) -> Result<ReloadOutcome, ReloadError> {
        {
            let mut session = self.session.lock();
            if session.active {
                session.pending = true;
                crate::debug!("reload"; "pass in flight, follow-up queued");
                return Ok(ReloadOutcome::Queued);
            }
            session.active = true;
        }

        let mut guard = SessionGuard {
            session: &self.session,
            finished: false,
        };

        loop {
            let result = self.run_pass().await;
            match &result {
                Ok(report) => crate::log!(
                    "reload";
                    "pass {}: staged {} modules ({} changed, {} bytes)",
                    report.pass,
                    report.staged.len(),
                    report.changed.len(),
                    report.bytes
                ),
                Err(e) => crate::log!("error"; "reload failed: {}", error_chain(e)),
            }

            if !guard.take_pending() {
                return result.map(ReloadOutcome::Completed);
            }
            crate::debug!("reload"; "running queued follow-up pass");
        }
    }

    async fn run_pass(&self) -> Result<ReloadReport, ReloadError> {
        let pass = self.passes.fetch_add(1, Ordering::SeqCst) + 1;
        let (staging_dir, manifest) = {
            let store = self.store.lock();
            (store.staging_dir().to_string(), store.manifest().to_vec())
        };

        let fs = self.runtime.fs();
        ensure_dirs(fs, &staging_dir).map_err(|cause| ReloadError::Stage {
            path: staging_dir.clone(),
            cause,
        })?;

        let mut report = ReloadReport {
            pass,
            ..Default::default()
        };

        for path in &manifest {
            let content = match timeout(self.settings.fetch_timeout, self.source.fetch(path)).await
            {
                Ok(Ok(content)) => content,
                Ok(Err(cause)) => {
                    return Err(ReloadError::Fetch {
                        path: path.clone(),
                        cause,
                    });
                }
                Err(_) => {
                    return Err(ReloadError::Timeout {
                        stage: format!("fetching `{path}`"),
                        path: Some(path.clone()),
                        after: self.settings.fetch_timeout,
                    });
                }
            };

            let staged = join_path(&staging_dir, path);
            let stage_error = |cause| ReloadError::Stage {
                path: path.clone(),
                cause,
            };
            ensure_dirs(fs, parent_path(&staged)).map_err(stage_error)?;
            fs.write_file(&staged, &content).map_err(stage_error)?;

            report.bytes += content.len();
            if self.store.lock().record(path, content) {
                report.changed.push(path.clone());
            }
            report.staged.push(path.clone());
        }

        let entry = &self.settings.reload_entry;
        let _exclusive = self.gate.exclusive().await;
        match timeout(
            self.settings.call_timeout,
            self.runtime.call(entry, Vec::new()),
        )
        .await
        {
            Ok(Ok(())) => Ok(report),
            Ok(Err(e)) => Err(ReloadError::Runtime(e)),
            Err(_) => Err(ReloadError::Timeout {
                stage: format!("calling `{entry}`"),
                path: None,
                after: self.settings.call_timeout,
            }),
        }
    }
}

/// Create `path` and any missing ancestors; existing directories are fine.
fn ensure_dirs(fs: &impl VirtualFs, path: &str) -> Result<(), FsError> {
    let mut dir = String::new();
    for component in path.split('/').filter(|c| !c.is_empty()) {
        dir = join_path(&dir, component);
        match fs.mkdir(&dir) {
            Ok(()) | Err(FsError::AlreadyExists(_)) => {}
            Err(cause) => return Err(cause),
        }
    }
    Ok(())
}

/// `outer: inner: innermost`
pub(crate) fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
