use crate::aggregate::{Group, NonceGroups};
use crate::classify::{self, ExploitableGroup};
use crate::config::AppConfig;
use crate::error::Error;
use crate::identity::NonceIdentity;
use crate::progress::ProgressReporter;
use crate::scanner::{self, WalkContext};
use glob::Pattern;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

/// One scan invocation. The engine owns the cancel token and the aggregate;
/// nothing is process-global, so multiple scans in one process never share
/// state.
pub struct ScanEngine {
    config: AppConfig,
    cancel: Arc<AtomicBool>,
}

/// Fixed-shape statistics record, computed once at scan end.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScanStats {
    pub total_entries: usize,
    pub candidate_files: usize,
    pub valid_footers: usize,
    pub extraction_anomalies: usize,
    pub read_errors: usize,
    pub unique_nonces: usize,
    pub exploitable_groups: usize,
    pub max_group_size: usize,
}

/// The finished, immutable result of a scan. Reporting and export read
/// this; nothing mutates it after the scan completes.
#[derive(Debug)]
pub struct ScanResult {
    pub root: PathBuf,
    pub stats: ScanStats,
    pub groups: BTreeMap<NonceIdentity, Group>,
    pub exploitable: Vec<ExploitableGroup>,
    pub scan_duration: Duration,
}

impl ScanEngine {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Shared flag a wrapping service can set to abort a long scan between
    /// files. An aborted scan returns `Error::Cancelled`; a partial
    /// aggregate is never observable.
    pub fn cancel_token(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    /// Run the full nonce-reuse detection pipeline:
    /// 1. Parallel directory walk with footer validation and nonce extraction
    /// 2. Group accumulation keyed on nonce identity
    /// 3. Exploitability classification over the finished aggregate
    pub fn scan(
        &self,
        root: &Path,
        reporter: &dyn ProgressReporter,
    ) -> Result<ScanResult, Error> {
        if !root.is_dir() {
            return Err(Error::InvalidRoot(root.to_path_buf()));
        }
        self.cancel.store(false, Ordering::Relaxed);

        let magics = self.config.magic_bytes();
        if magics.is_empty() {
            return Err(Error::Config(config::ConfigError::Message(
                "no usable magic signatures configured".to_string(),
            )));
        }

        let ignore_patterns: Vec<Pattern> = self
            .config
            .ignore_patterns
            .iter()
            .filter_map(|glob| match Pattern::new(glob) {
                Ok(pattern) => Some(pattern),
                Err(err) => {
                    error!("Invalid glob pattern '{}': {}", glob, err);
                    None
                }
            })
            .collect();

        info!("Scanning {} for encrypted files...", root.display());
        reporter.on_scan_start();
        let scan_start = Instant::now();

        let groups = NonceGroups::new();
        let ctx = WalkContext {
            magics: &magics,
            extensions: &self.config.extensions,
            ignore_patterns: &ignore_patterns,
            cancel: &self.cancel,
            reporter,
        };
        scanner::scan_tree(root, &ctx, &groups)?;
        let scan_duration = scan_start.elapsed();

        let (ordered, counts) = groups.finalize();
        reporter.on_scan_complete(counts.valid_footers, scan_duration.as_secs_f64());
        debug!(
            "Scan completed in {:.2}s — {} entries, {} candidates, {} valid footers, {} anomalies",
            scan_duration.as_secs_f64(),
            counts.total_entries,
            counts.candidate_files,
            counts.valid_footers,
            counts.extraction_anomalies,
        );

        let summary = classify::summarize(&ordered);
        let exploitable = classify::exploitable_groups(&ordered);

        let stats = ScanStats {
            total_entries: counts.total_entries,
            candidate_files: counts.candidate_files,
            valid_footers: counts.valid_footers,
            extraction_anomalies: counts.extraction_anomalies,
            read_errors: counts.read_errors,
            unique_nonces: summary.unique_nonces,
            exploitable_groups: summary.exploitable_groups,
            max_group_size: summary.max_group_size,
        };

        info!(
            "{} unique nonces, {} groups with reuse, largest group {}",
            stats.unique_nonces, stats.exploitable_groups, stats.max_group_size,
        );

        Ok(ScanResult {
            root: root.to_path_buf(),
            stats,
            groups: ordered,
            exploitable,
            scan_duration,
        })
    }
}
