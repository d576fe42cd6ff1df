//! Connection-change callback
//!
//! At most one callback is installed at a time. It is invoked from the
//! background monitor, never while the observer lock is held, so a callback
//! may call back into the interface (including replacing itself).

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, PoisonError, RwLock};

/// Shared connection callback
pub type ConnectionCallback = Arc<dyn Fn() + Send + Sync>;

/// Holder for the connection callback
#[derive(Default)]
pub struct Observer {
    callback: RwLock<Option<ConnectionCallback>>,
}

impl Observer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a callback, replacing any previous one
    pub fn set(&self, callback: ConnectionCallback) {
        *self.callback.write().unwrap_or_else(PoisonError::into_inner) = Some(callback);
    }

    /// Remove the callback
    pub fn clear(&self) {
        self.callback
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }

    pub fn is_set(&self) -> bool {
        self.callback
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Invoke the callback if one is installed
    ///
    /// A panicking callback is logged and otherwise ignored.
    pub fn notify(&self) {
        let callback = self
            .callback
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        if let Some(callback) = callback {
            if catch_unwind(AssertUnwindSafe(|| callback())).is_err() {
                tracing::error!("Connection callback panicked");
            }
        }
    }
}

impl std::fmt::Debug for Observer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observer")
            .field("callback", &self.is_set())
            .finish()
    }
}
