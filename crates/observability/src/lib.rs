//! Structured logging setup (spec §4.1 "logged once", ambient stack).

/// Initialize process-wide logging. Safe to call multiple times; subsequent
/// calls become no-ops.
pub fn init() {
    tracing::init();
}

pub mod tracing;

