use crate::engine::{ScanResult, ScanStats};
use crate::error::Error;
use chrono::Utc;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use tracing::info;

pub const SCANNER_NAME: &str = "Akira Nonce Reuse Detector";
pub const SCANNER_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Serialize)]
struct ExportMetadata {
    scanner: &'static str,
    version: &'static str,
    encrypted_path: String,
    timestamp: String,
}

#[derive(Debug, Serialize)]
struct ExploitableEntry {
    file_count: usize,
    files: Vec<String>,
}

/// The machine-readable result document: metadata, the statistics block,
/// the full identity → file-list mapping, and the filtered view of groups
/// with observed reuse. Paths are serialized as originally supplied.
#[derive(Debug, Serialize)]
struct ExportDocument {
    metadata: ExportMetadata,
    statistics: ScanStats,
    nonce_groups: BTreeMap<String, Vec<String>>,
    exploitable_groups: BTreeMap<String, ExploitableEntry>,
}

pub fn write_json(result: &ScanResult, output: &Path) -> Result<(), Error> {
    let document = build_document(result);
    let file = File::create(output)?;
    serde_json::to_writer_pretty(BufWriter::new(file), &document)?;
    info!("Results exported to {}", output.display());
    Ok(())
}

fn build_document(result: &ScanResult) -> ExportDocument {
    let nonce_groups: BTreeMap<String, Vec<String>> = result
        .groups
        .iter()
        .map(|(identity, group)| {
            let files = group
                .members
                .iter()
                .map(|member| member.path.to_string_lossy().into_owned())
                .collect();
            (identity.to_hex(), files)
        })
        .collect();

    let exploitable_groups: BTreeMap<String, ExploitableEntry> = result
        .exploitable
        .iter()
        .map(|group| {
            let files = group
                .members
                .iter()
                .map(|member| member.path.to_string_lossy().into_owned())
                .collect();
            (
                group.identity.to_hex(),
                ExploitableEntry {
                    file_count: group.file_count,
                    files,
                },
            )
        })
        .collect();

    ExportDocument {
        metadata: ExportMetadata {
            scanner: SCANNER_NAME,
            version: SCANNER_VERSION,
            encrypted_path: result.root.to_string_lossy().into_owned(),
            timestamp: Utc::now().to_rfc3339(),
        },
        statistics: result.stats,
        nonce_groups,
        exploitable_groups,
    }
}
