use std::sync::Arc;

use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Mutual exclusion between module reinitialization and entry-point calls.
///
/// Draw and user-function calls hold the gate shared; the reload step that
/// re-executes the module graph holds it exclusively. Re-importing modules
/// mid-draw would leave the draw's entry-point references dangling.
#[derive(Debug, Clone, Default)]
pub struct RuntimeGate {
    lock: Arc<RwLock<()>>,
}

impl RuntimeGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn shared(&self) -> RwLockReadGuard<'_, ()> {
        self.lock.read().await
    }

    pub async fn exclusive(&self) -> RwLockWriteGuard<'_, ()> {
        self.lock.write().await
    }

    /// True while a module reinitialization holds the gate.
    pub fn is_reinitializing(&self) -> bool {
        self.lock.try_read().is_err()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_exclusive_blocks_shared() {
        let gate = RuntimeGate::new();

        let exclusive = gate.exclusive().await;
        assert!(gate.is_reinitializing());
        assert!(gate.lock.try_read().is_err());
        drop(exclusive);

        let _a = gate.shared().await;
        let _b = gate.shared().await;
        assert!(!gate.is_reinitializing());
    }
}
