use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Root path {} is not a directory", .0.display())]
    InvalidRoot(PathBuf),

    #[error("Export error: {0}")]
    Export(#[from] serde_json::Error),

    #[error("Scan cancelled")]
    Cancelled,
}
