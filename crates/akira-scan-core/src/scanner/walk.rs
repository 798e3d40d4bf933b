use crate::aggregate::{GroupMember, NonceGroups};
use crate::error::Error;
use crate::footer::{self, FooterError, MAGIC_LEN};
use crate::identity::NonceIdentity;
use crate::progress::ProgressReporter;
use glob::Pattern;
use rayon::prelude::*;
use std::fs;
use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{error, warn};

/// Everything the per-file pipeline needs, shared read-only across workers.
pub struct WalkContext<'a> {
    pub magics: &'a [[u8; MAGIC_LEN]],
    pub extensions: &'a [String],
    pub ignore_patterns: &'a [Pattern],
    pub cancel: &'a AtomicBool,
    pub reporter: &'a dyn ProgressReporter,
}

/// Parallel recursive traversal from `root`. Every entry below the root is
/// counted; files matching a configured extension run the footer pipeline
/// and land in `groups`. Permission problems on individual entries are
/// logged and skipped; the tree itself is never modified.
pub fn scan_tree(
    root: &Path,
    ctx: &WalkContext<'_>,
    groups: &NonceGroups,
) -> Result<(), Error> {
    visit_dirs(root, ctx, groups)
}

fn visit_dirs(dir: &Path, ctx: &WalkContext<'_>, groups: &NonceGroups) -> Result<(), Error> {
    if !dir.is_dir() {
        return Ok(());
    }

    if ctx
        .ignore_patterns
        .iter()
        .any(|pattern| pattern.matches_path(dir))
    {
        return Ok(());
    }

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            if err.kind() == io::ErrorKind::PermissionDenied {
                error!(
                    "Access denied reading directory {}: {}",
                    dir.display(),
                    err
                );
                groups.record_read_error();
                return Ok(());
            } else {
                return Err(Error::Io(io::Error::new(
                    err.kind(),
                    format!("Error reading directory {}: {}", dir.display(), err),
                )));
            }
        }
    };

    entries.par_bridge().try_for_each(|entry_result| {
        if ctx.cancel.load(Ordering::Relaxed) {
            return Err(Error::Cancelled);
        }

        let entry = match entry_result {
            Ok(entry) => entry,
            Err(err) => {
                warn!(
                    "Error reading entry in directory {}: {}",
                    dir.display(),
                    err
                );
                groups.record_read_error();
                return Ok(());
            }
        };

        let path = entry.path();
        groups.record_entry();

        let metadata = match fs::metadata(&path) {
            Ok(metadata) => metadata,
            Err(err) => {
                warn!("Error getting metadata for {}: {}", path.display(), err);
                groups.record_read_error();
                return Ok(());
            }
        };

        if metadata.is_dir() {
            visit_dirs(&path, ctx, groups)?;
        } else if !metadata.file_type().is_symlink()
            && !ctx
                .ignore_patterns
                .iter()
                .any(|pattern| pattern.matches_path(&path))
        {
            process_file(&path, metadata.len(), ctx, groups);
        }
        Ok(())
    })?;

    Ok(())
}

/// Extension filter → footer validation → nonce extraction → grouping.
/// Per-file failures never abort the scan; they are logged and counted so
/// the final statistics stay auditable.
fn process_file(path: &Path, size: u64, ctx: &WalkContext<'_>, groups: &NonceGroups) {
    if !matches_extension(path, ctx.extensions) {
        return;
    }
    groups.record_candidate();
    ctx.reporter
        .on_scan_progress(groups.candidate_count(), &path.to_string_lossy());

    match footer::has_valid_footer(path, ctx.magics) {
        Ok(true) => {}
        Ok(false) => return,
        Err(err) => {
            warn!("Cannot read {}: {}", path.display(), err);
            groups.record_read_error();
            return;
        }
    }

    match footer::read_nonce_field(path) {
        Ok(nonce) => {
            let identity = NonceIdentity::of(&nonce);
            groups.insert(
                identity,
                GroupMember {
                    path: path.to_path_buf(),
                    size,
                },
            );
        }
        Err(FooterError::Io(err)) => {
            warn!("Cannot extract nonce from {}: {}", path.display(), err);
            groups.record_read_error();
        }
        Err(err) => {
            warn!("Cannot extract nonce from {}: {}", path.display(), err);
            groups.record_anomaly();
        }
    }
}

fn matches_extension(path: &Path, extensions: &[String]) -> bool {
    match path.extension() {
        Some(ext) => {
            let ext = ext.to_string_lossy();
            extensions.iter().any(|want| want.eq_ignore_ascii_case(&ext))
        }
        None => false,
    }
}
