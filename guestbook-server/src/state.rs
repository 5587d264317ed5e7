//! Application state shared across handlers

use std::sync::Arc;

use tokio::sync::{Notify, OnceCell};

use crate::db::VisitorStore;

/// Shared application state
///
/// The store slot starts empty and is filled once by the bootstrap task.
/// Handlers read it without waiting, so requests that arrive before the
/// database is configured are served in degraded mode.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    store: OnceCell<Arc<dyn VisitorStore>>,
    ready: Notify,
}

impl AppState {
    /// State with no store yet
    pub fn new() -> Self {
        Self::from_cell(OnceCell::new())
    }

    /// State with the store already installed
    pub fn with_store(store: Arc<dyn VisitorStore>) -> Self {
        Self::from_cell(OnceCell::new_with(Some(store)))
    }

    fn from_cell(store: OnceCell<Arc<dyn VisitorStore>>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                store,
                ready: Notify::new(),
            }),
        }
    }

    /// Publish the store. Returns `false` if one was already installed;
    /// the existing store is kept.
    pub fn install_store(&self, store: Arc<dyn VisitorStore>) -> bool {
        let installed = self.inner.store.set(store).is_ok();
        if installed {
            self.inner.ready.notify_waiters();
        }
        installed
    }

    /// Current store, if bootstrap has published one
    pub fn store(&self) -> Option<&Arc<dyn VisitorStore>> {
        self.inner.store.get()
    }

    pub fn is_ready(&self) -> bool {
        self.inner.store.initialized()
    }

    /// Wait until a store has been installed.
    pub async fn wait_ready(&self) -> &Arc<dyn VisitorStore> {
        loop {
            // Register before checking so an install in between is not missed
            let notified = self.inner.ready.notified();
            if let Some(store) = self.inner.store.get() {
                return store;
            }
            notified.await;
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
