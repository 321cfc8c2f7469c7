//! Directory watcher with debounce.
//!
//! ```text
//! notify → Debouncer (quiet period) → on_change(paths)
//! ```

use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam::channel::{self, Receiver};
use notify::{EventKind, RecursiveMode, Watcher};
use rustc_hash::FxHashSet;

/// Upper bound on a single wait so `stop` is noticed while idle.
const IDLE_WAIT: Duration = Duration::from_millis(500);

/// Collects changed paths until no event arrived for `window`.
pub struct Debouncer {
    window: Duration,
    changes: FxHashSet<PathBuf>,
    last_event: Option<Instant>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            changes: FxHashSet::default(),
            last_event: None,
        }
    }

    pub fn add_event(&mut self, event: &notify::Event) {
        match event.kind {
            EventKind::Create(_) | EventKind::Remove(_) => {}
            // mtime/chmod noise
            EventKind::Modify(notify::event::ModifyKind::Metadata(_)) => return,
            EventKind::Modify(_) => {}
            _ => return,
        }

        for path in event.paths.iter().filter(|p| !is_temp_file(p)) {
            crate::debug!("watch"; "{:?}: {}", event.kind, path.display());
            self.changes.insert(path.clone());
            self.last_event = Some(Instant::now());
        }
    }

    pub fn is_ready(&self) -> bool {
        self.last_event
            .is_some_and(|last| last.elapsed() >= self.window && !self.changes.is_empty())
    }

    /// Take the collected paths, sorted, once the quiet period has passed.
    pub fn take_if_ready(&mut self) -> Option<Vec<PathBuf>> {
        if !self.is_ready() {
            return None;
        }
        self.last_event = None;
        let mut changes: Vec<_> = self.changes.drain().collect();
        changes.sort();
        Some(changes)
    }

    /// Time until the next possible ready point.
    pub fn sleep_duration(&self) -> Duration {
        match self.last_event {
            Some(last) => self
                .window
                .saturating_sub(last.elapsed())
                .max(Duration::from_millis(1)),
            None => IDLE_WAIT,
        }
    }
}

/// Editor artifacts that never count as module changes.
fn is_temp_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    matches!(ext, "bck" | "bak" | "backup" | "swp" | "swo" | "tmp")
        || name.ends_with('~')
        || name.starts_with('.')
}

/// Watch `dir` recursively and call `on_change` after every debounced burst.
///
/// The watcher starts before this returns, so no change made after the call
/// is missed. The thread exits when `stop` receives or disconnects.
pub fn spawn(
    dir: &Path,
    window: Duration,
    stop: Receiver<()>,
    mut on_change: impl FnMut(Vec<PathBuf>) + Send + 'static,
) -> notify::Result<JoinHandle<()>> {
    let (event_tx, event_rx) = channel::unbounded();
    let mut watcher = notify::recommended_watcher(move |res| {
        let _ = event_tx.send(res);
    })?;
    watcher.watch(dir, RecursiveMode::Recursive)?;

    Ok(thread::spawn(move || {
        // Dropping the watcher ends event delivery.
        let _watcher = watcher;
        let mut debouncer = Debouncer::new(window);

        loop {
            channel::select! {
                recv(event_rx) -> msg => match msg {
                    Ok(Ok(event)) => debouncer.add_event(&event),
                    Ok(Err(e)) => crate::log!("watch"; "notify error: {}", e),
                    Err(_) => break,
                },
                recv(stop) -> _ => break,
                default(debouncer.sleep_duration()) => {}
            }

            if let Some(changes) = debouncer.take_if_ready() {
                on_change(changes);
            }
        }
        crate::debug!("watch"; "watcher stopped");
    }))
}
