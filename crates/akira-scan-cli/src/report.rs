use akira_scan_core::ScanResult;
use colored::*;
use indicatif::{HumanBytes, HumanCount};

/// Display caps for the exploitable-group listing; everything beyond them
/// is summarized with a truncation notice. The JSON export always carries
/// the full mapping.
const GROUPS_LISTED: usize = 20;
const MEMBERS_LISTED: usize = 5;

pub fn print_report(result: &ScanResult) {
    let stats = &result.stats;

    println!();
    println!("{}", "=".repeat(80));
    println!("AKIRA RANSOMWARE - NONCE REUSE ANALYSIS REPORT");
    println!("{}", "=".repeat(80));

    println!("\n[STATISTICS]");
    println!("  Total entries scanned:    {}", HumanCount(stats.total_entries as u64));
    println!("  Encrypted candidates:     {}", HumanCount(stats.candidate_files as u64));
    println!("  Valid footers analyzed:   {}", HumanCount(stats.valid_footers as u64));
    println!("  Extraction anomalies:     {}", HumanCount(stats.extraction_anomalies as u64));
    println!("  Read errors:              {}", HumanCount(stats.read_errors as u64));
    println!("  Unique nonces found:      {}", HumanCount(stats.unique_nonces as u64));
    println!("  Exploitable groups (2+):  {}", HumanCount(stats.exploitable_groups as u64));
    println!("  Largest group size:       {}", HumanCount(stats.max_group_size as u64));

    println!("\n[WORKER THREADS]");
    println!("  Estimated worker threads: {}", stats.unique_nonces);
    println!("  (One nonce per worker thread)");

    println!("\n[EXPLOITABLE GROUPS - Nonce Reuse Detected]");
    if result.exploitable.is_empty() {
        println!("  None found. All files encrypted with unique nonces.");
        println!("  XOR attack not possible.");
    } else {
        println!(
            "  {} groups vulnerable to XOR attack:",
            stats.exploitable_groups
        );
        println!();

        for (idx, group) in result.exploitable.iter().take(GROUPS_LISTED).enumerate() {
            let nonce_hex = group.identity.to_hex();
            println!(
                "  Group #{}: {} files (Nonce: {}...)",
                idx + 1,
                group.file_count,
                &nonce_hex[..16]
            );

            for member in group.members.iter().take(MEMBERS_LISTED) {
                let shown = member
                    .path
                    .strip_prefix(&result.root)
                    .unwrap_or(&member.path);
                println!(
                    "    - {} ({})",
                    shown.display(),
                    HumanBytes(member.size)
                );
            }
            if group.file_count > MEMBERS_LISTED {
                println!("    ... and {} more files", group.file_count - MEMBERS_LISTED);
            }
            println!();
        }

        if result.exploitable.len() > GROUPS_LISTED {
            println!(
                "  ... and {} more groups (see JSON export for the full listing)",
                result.exploitable.len() - GROUPS_LISTED
            );
        }
    }

    println!("[RECOVERY RECOMMENDATIONS]");
    if stats.exploitable_groups > 0 {
        println!("  {}", "XOR ATTACK POSSIBLE:".green().bold());
        println!("     1. Identify file types in each group (DOCX, PDF, XLSX, ...)");
        println!("     2. Apply known plaintext attack using file headers:");
        println!("        - PDF:  %PDF-1.");
        println!("        - DOCX: PK\\x03\\x04 (ZIP header)");
        println!("        - PNG:  \\x89PNG\\r\\n\\x1a\\n");
        println!("     3. Use crib dragging for full plaintext recovery");
        println!();
        println!("  {}", "DO NOT PAY RANSOM - Partial recovery possible!".yellow().bold());
    } else {
        println!("  {}", "XOR ATTACK NOT VIABLE:".red().bold());
        println!("     - All files encrypted with unique nonces");
        println!("     - Restore from backups if available");
        println!("     - Check Volume Shadow Copies (VSS)");
    }

    println!("\n{}", "=".repeat(80));
}
