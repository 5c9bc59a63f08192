use std::sync::Arc;

use crate::{gate::AccessGate, source::RowSource};

/// Immutable per-process state shared by every request.
pub struct AppState {
    pub gate: AccessGate,
    pub source: Arc<dyn RowSource>,
}

impl AppState {
    pub fn new(gate: AccessGate, source: Arc<dyn RowSource>) -> Arc<Self> {
        Arc::new(Self { gate, source })
    }
}
