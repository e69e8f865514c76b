//! Load progress reporting.

/// Trait for receiving load progress updates.
pub trait ImportProgress {
    /// Called after each row of a table is stored.
    fn on_rows(&self, table: &str, rows: u64);

    /// Called when a phase starts (e.g., "Loading persons").
    fn on_phase(&self, message: &str);

    /// Called when the load is complete.
    fn on_complete(&self, message: &str);
}

/// A no-op progress reporter that discards all updates.
pub struct SilentProgress;

impl ImportProgress for SilentProgress {
    fn on_rows(&self, _table: &str, _rows: u64) {}
    fn on_phase(&self, _message: &str) {}
    fn on_complete(&self, _message: &str) {}
}

/// A progress reporter that logs to the `log` crate.
pub struct LogProgress;

impl ImportProgress for LogProgress {
    fn on_rows(&self, table: &str, rows: u64) {
        if rows.is_multiple_of(100_000) {
            log::info!("  [{table}] {rows} rows");
        }
    }

    fn on_phase(&self, message: &str) {
        log::info!("{message}");
    }

    fn on_complete(&self, message: &str) {
        log::info!("{message}");
    }
}
