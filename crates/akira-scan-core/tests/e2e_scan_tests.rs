use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use tempfile::tempdir;

use akira_scan_core::export;
use akira_scan_core::footer::{FOOTER_LEN, MAGIC_LEN, NONCE_LEN, NONCE_OFFSET};
use akira_scan_core::{AppConfig, Error, ScanEngine, ScanResult, SilentReporter};

fn footer_bytes(magic: &[u8; MAGIC_LEN], nonce_fill: u8) -> Vec<u8> {
    let mut footer = vec![0u8; FOOTER_LEN as usize];
    footer[..MAGIC_LEN].copy_from_slice(magic);
    for byte in &mut footer[NONCE_OFFSET..NONCE_OFFSET + NONCE_LEN] {
        *byte = nonce_fill;
    }
    footer
}

fn write_encrypted(path: &Path, body_len: usize, magic: &[u8; MAGIC_LEN], nonce_fill: u8) {
    let mut data = vec![0x5Au8; body_len];
    data.extend_from_slice(&footer_bytes(magic, nonce_fill));
    fs::write(path, data).unwrap();
}

/// Temp tree with one reused nonce and two unique ones.
/// Layout:
///   root/
///     finance/
///       ledger.xlsx.akira    nonce 0x11
///       summary.docx.akira   nonce 0x11
///     hr/
///       contract.pdf.akira   nonce 0x11  ← third member of the reuse group
///       photo.png.akira      nonce 0x22
///     notes.txt.akira        nonce 0x33
///     README.txt             plain file, no trailer
///     stub.akira             511 bytes, below the trailer minimum
fn create_test_tree(root: &Path) {
    let finance = root.join("finance");
    let hr = root.join("hr");
    fs::create_dir_all(&finance).unwrap();
    fs::create_dir_all(&hr).unwrap();

    write_encrypted(&finance.join("ledger.xlsx.akira"), 4_096, b"AKIRA!!!", 0x11);
    write_encrypted(&finance.join("summary.docx.akira"), 2_048, b"AKIRA!!!", 0x11);
    write_encrypted(&hr.join("contract.pdf.akira"), 1_024, b"akira!!!", 0x11);
    write_encrypted(&hr.join("photo.png.akira"), 512, b"AKIRA!!!", 0x22);
    write_encrypted(&root.join("notes.txt.akira"), 0, b"AKIRA!!!", 0x33);

    fs::write(root.join("README.txt"), "not encrypted").unwrap();
    fs::write(root.join("stub.akira"), vec![0u8; 511]).unwrap();
}

fn group_path_sets(result: &ScanResult) -> BTreeMap<String, BTreeSet<PathBuf>> {
    result
        .groups
        .iter()
        .map(|(identity, group)| {
            let paths = group.members.iter().map(|m| m.path.clone()).collect();
            (identity.to_hex(), paths)
        })
        .collect()
}

#[test]
fn test_nonce_reuse_detection() {
    let tmp = tempdir().unwrap();
    let root = tmp.path().join("scan_root");
    create_test_tree(&root);

    let engine = ScanEngine::new(AppConfig::default());
    let result = engine.scan(&root, &SilentReporter).unwrap();

    // 7 files + 2 directories below the root
    assert_eq!(result.stats.total_entries, 9);
    // every .akira file, including the 511-byte stub
    assert_eq!(result.stats.candidate_files, 6);
    assert_eq!(result.stats.valid_footers, 5);
    assert_eq!(result.stats.extraction_anomalies, 0);
    assert_eq!(result.stats.read_errors, 0);

    assert_eq!(result.stats.unique_nonces, 3);
    assert_eq!(result.stats.exploitable_groups, 1);
    assert_eq!(result.stats.max_group_size, 3);

    assert_eq!(result.exploitable.len(), 1);
    let reuse = &result.exploitable[0];
    assert_eq!(reuse.file_count, 3);
    let names: BTreeSet<String> = reuse
        .members
        .iter()
        .map(|m| m.path.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    let expected: BTreeSet<String> = [
        "ledger.xlsx.akira",
        "summary.docx.akira",
        "contract.pdf.akira",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    assert_eq!(names, expected);
}

#[test]
fn test_member_sizes_are_recorded() {
    let tmp = tempdir().unwrap();
    let root = tmp.path().join("scan_sizes");
    fs::create_dir_all(&root).unwrap();
    write_encrypted(&root.join("doc.akira"), 4_096, b"AKIRA!!!", 0x01);

    let engine = ScanEngine::new(AppConfig::default());
    let result = engine.scan(&root, &SilentReporter).unwrap();

    let group = result.groups.values().next().unwrap();
    assert_eq!(group.members.len(), 1);
    assert_eq!(group.members[0].size, 4_096 + FOOTER_LEN);
}

#[test]
fn test_empty_directory_yields_zeroed_result() {
    let tmp = tempdir().unwrap();
    let root = tmp.path().join("scan_empty");
    fs::create_dir_all(&root).unwrap();

    let engine = ScanEngine::new(AppConfig::default());
    let result = engine.scan(&root, &SilentReporter).unwrap();

    assert_eq!(result.stats.total_entries, 0);
    assert_eq!(result.stats.candidate_files, 0);
    assert_eq!(result.stats.valid_footers, 0);
    assert_eq!(result.stats.unique_nonces, 0);
    assert_eq!(result.stats.exploitable_groups, 0);
    assert_eq!(result.stats.max_group_size, 0);
    assert!(result.groups.is_empty());
    assert!(result.exploitable.is_empty());
}

#[test]
fn test_rescan_is_idempotent_and_order_independent() {
    let tmp = tempdir().unwrap();
    let root = tmp.path().join("scan_idempotent");
    create_test_tree(&root);

    let engine = ScanEngine::new(AppConfig::default());
    let first = engine.scan(&root, &SilentReporter).unwrap();
    let second = engine.scan(&root, &SilentReporter).unwrap();

    assert_eq!(first.stats, second.stats);
    // Composition is the contract: compare membership as sets, since the
    // parallel walk may hand files to workers in any order.
    assert_eq!(group_path_sets(&first), group_path_sets(&second));
}

#[test]
fn test_magic_case_variants_share_a_group() {
    let tmp = tempdir().unwrap();
    let root = tmp.path().join("scan_variants");
    fs::create_dir_all(&root).unwrap();
    write_encrypted(&root.join("upper.akira"), 64, b"AKIRA!!!", 0x44);
    write_encrypted(&root.join("lower.akira"), 64, b"akira!!!", 0x44);

    let engine = ScanEngine::new(AppConfig::default());
    let result = engine.scan(&root, &SilentReporter).unwrap();

    // Grouping keys on the nonce field alone; the trailer casing is noise.
    assert_eq!(result.stats.unique_nonces, 1);
    assert_eq!(result.stats.exploitable_groups, 1);
    assert_eq!(result.stats.max_group_size, 2);
}

#[test]
fn test_ignore_patterns_exclude_subtrees() {
    let tmp = tempdir().unwrap();
    let root = tmp.path().join("scan_ignore");
    create_test_tree(&root);

    let config = AppConfig {
        ignore_patterns: vec!["**/hr/**".to_string(), "**/hr".to_string()],
        ..AppConfig::default()
    };
    let engine = ScanEngine::new(config);
    let result = engine.scan(&root, &SilentReporter).unwrap();

    // Without hr/: two files share 0x11, notes.txt.akira is alone on 0x33.
    assert_eq!(result.stats.valid_footers, 3);
    assert_eq!(result.stats.unique_nonces, 2);
    assert_eq!(result.stats.exploitable_groups, 1);
    assert_eq!(result.stats.max_group_size, 2);
}

#[test]
fn test_invalid_root_is_fatal() {
    let tmp = tempdir().unwrap();
    let missing = tmp.path().join("does_not_exist");

    let engine = ScanEngine::new(AppConfig::default());
    match engine.scan(&missing, &SilentReporter) {
        Err(Error::InvalidRoot(path)) => assert_eq!(path, missing),
        other => panic!("expected InvalidRoot, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_scan_cancellation() {
    let tmp = tempdir().unwrap();
    let root = tmp.path().join("scan_cancel");
    create_test_tree(&root);

    let engine = ScanEngine::new(AppConfig::default());

    // Cancel from another thread after a tiny delay. scan() resets the
    // token at start, so the cancel must land after it begins.
    let cancel_token = engine.cancel_token();
    let handle = std::thread::spawn(move || {
        std::thread::sleep(std::time::Duration::from_millis(1));
        cancel_token.store(true, std::sync::atomic::Ordering::Relaxed);
    });

    let result = engine.scan(&root, &SilentReporter);
    handle.join().unwrap();

    // A tiny tree may finish before the cancel lands; both outcomes are
    // acceptable, anything else is not.
    match result {
        Ok(_) => {}
        Err(Error::Cancelled) => {}
        Err(other) => panic!("Unexpected error: {:?}", other),
    }
}

#[test]
fn test_export_document_shape() {
    let tmp = tempdir().unwrap();
    let root = tmp.path().join("scan_export");
    create_test_tree(&root);

    let engine = ScanEngine::new(AppConfig::default());
    let result = engine.scan(&root, &SilentReporter).unwrap();

    let out_dir = tempdir().unwrap();
    let out_path = out_dir.path().join("results.json");
    export::write_json(&result, &out_path).unwrap();

    let document: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&out_path).unwrap()).unwrap();

    assert_eq!(
        document["metadata"]["scanner"],
        "Akira Nonce Reuse Detector"
    );
    assert_eq!(
        document["metadata"]["encrypted_path"],
        root.to_string_lossy().into_owned()
    );
    assert!(document["metadata"]["timestamp"].is_string());

    assert_eq!(document["statistics"]["unique_nonces"], 3);
    assert_eq!(document["statistics"]["exploitable_groups"], 1);
    assert_eq!(document["statistics"]["max_group_size"], 3);

    let nonce_groups = document["nonce_groups"].as_object().unwrap();
    assert_eq!(nonce_groups.len(), 3);
    for key in nonce_groups.keys() {
        assert_eq!(key.len(), 64);
        assert!(key.chars().all(|c| c.is_ascii_hexdigit()));
    }

    let exploitable = document["exploitable_groups"].as_object().unwrap();
    assert_eq!(exploitable.len(), 1);
    let entry = exploitable.values().next().unwrap();
    assert_eq!(entry["file_count"], 3);
    assert_eq!(entry["files"].as_array().unwrap().len(), 3);
}
