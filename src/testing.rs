//! In-process fakes for the runtime and module source seams.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use indexmap::IndexMap;
use parking_lot::Mutex;
use serde_json::Value;

use crate::reload::{FetchError, ModuleSource};
use crate::runtime::{EmbeddedRuntime, MemoryFs, RuntimeError};

/// Tracks how many callers are inside a section at once.
#[derive(Debug, Default)]
pub struct Concurrency {
    current: AtomicUsize,
    max: AtomicUsize,
}

impl Concurrency {
    pub fn enter(&self) {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.max.fetch_max(now, Ordering::SeqCst);
    }

    pub fn exit(&self) {
        self.current.fetch_sub(1, Ordering::SeqCst);
    }

    pub fn max(&self) -> usize {
        self.max.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub entry: String,
    pub args: Vec<Value>,
    /// Virtual filesystem contents at the moment of the call.
    pub files: Vec<(String, String)>,
}

#[derive(Debug, Default)]
pub struct FakeRuntime {
    fs: MemoryFs,
    calls: Mutex<Vec<RecordedCall>>,
    delay: Mutex<Duration>,
    failures: AtomicUsize,
    pub concurrency: Concurrency,
}

impl FakeRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(delay: Duration) -> Self {
        let runtime = Self::default();
        *runtime.delay.lock() = delay;
        runtime
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock() = delay;
    }

    /// Make the next `n` calls fail.
    pub fn fail_next(&self, n: usize) {
        self.failures.store(n, Ordering::SeqCst);
    }

    pub fn memory(&self) -> &MemoryFs {
        &self.fs
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    pub fn entries(&self) -> Vec<String> {
        self.calls.lock().iter().map(|c| c.entry.clone()).collect()
    }
}

impl EmbeddedRuntime for FakeRuntime {
    type Fs = MemoryFs;

    fn fs(&self) -> &MemoryFs {
        &self.fs
    }

    async fn call(&self, entry: &str, args: Vec<Value>) -> Result<(), RuntimeError> {
        self.concurrency.enter();
        self.calls.lock().push(RecordedCall {
            entry: entry.to_string(),
            args,
            files: self.fs.files(),
        });

        let delay = *self.delay.lock();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.concurrency.exit();

        let failing = self
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(RuntimeError::Failed {
                entry: entry.to_string(),
                message: "injected failure".into(),
            });
        }
        Ok(())
    }
}

/// Module source backed by a map; missing paths answer 404.
#[derive(Debug, Default)]
pub struct MapSource {
    files: Mutex<IndexMap<String, String>>,
    delay: Duration,
    pub fetches: AtomicUsize,
    pub concurrency: Concurrency,
}

impl MapSource {
    pub fn new<'a>(files: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            files: Mutex::new(
                files
                    .into_iter()
                    .map(|(p, c)| (p.to_string(), c.to_string()))
                    .collect(),
            ),
            ..Default::default()
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn set(&self, path: &str, content: &str) {
        self.files
            .lock()
            .insert(path.to_string(), content.to_string());
    }
}

impl ModuleSource for MapSource {
    async fn fetch(&self, path: &str) -> Result<String, FetchError> {
        self.concurrency.enter();
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let content = self.files.lock().get(path).cloned();
        self.concurrency.exit();
        content.ok_or(FetchError::Status(404))
    }
}

/// Wait (bounded) until `condition` holds.
pub async fn wait_until(mut condition: impl FnMut() -> bool) {
    for _ in 0..500 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
    panic!("condition not reached in time");
}
