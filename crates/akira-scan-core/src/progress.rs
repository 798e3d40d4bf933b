/// Trait for reporting scan progress.
///
/// The CLI implements this with indicatif spinners; library and test callers
/// use [`SilentReporter`]. All methods have default no-op implementations.
pub trait ProgressReporter: Send + Sync {
    fn on_scan_start(&self) {}
    fn on_scan_progress(&self, _candidates_found: usize, _current_path: &str) {}
    fn on_scan_complete(&self, _valid_footers: usize, _duration_secs: f64) {}
    fn on_export_complete(&self, _path: &str) {}
}

/// No-op progress reporter for silent operation.
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {}
