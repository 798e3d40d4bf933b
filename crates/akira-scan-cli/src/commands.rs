use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "akira-scan")]
#[command(about = "Detect nonce reuse across Akira-encrypted files", long_about = None)]
pub struct Cli {
    /// Directory containing encrypted files to analyze
    pub root: PathBuf,

    /// Write a JSON export of the results to this path
    #[arg(long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}
