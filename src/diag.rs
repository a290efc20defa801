//! Lock-free diagnostics counters.
//!
//! Failures the engine recovers from locally (malformed wire lines, failing
//! handlers) are counted here and logged; they never surface to the run
//! loop. Callers poll [`Diagnostics::snapshot`] for visibility.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for failures recovered inside the engine.
#[derive(Debug, Default)]
pub struct Diagnostics {
    decode_errors: AtomicU64,
    handler_failures: AtomicU64,
}

impl Diagnostics {
    pub(crate) fn record_decode_error(&self) {
        self.decode_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_handler_failure(&self) {
        self.handler_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> DiagnosticsSnapshot {
        DiagnosticsSnapshot {
            decode_errors: self.decode_errors.load(Ordering::Relaxed),
            handler_failures: self.handler_failures.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of the [`Diagnostics`] counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiagnosticsSnapshot {
    pub decode_errors: u64,
    pub handler_failures: u64,
}
