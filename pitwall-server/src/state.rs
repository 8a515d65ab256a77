//! Application state management

use pitwall_core::store::RecordStore;
use std::sync::Arc;

/// Shared application state
///
/// The store is read-only after startup; handlers fetch owned snapshots
/// from it, so no locking is needed.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }
}
