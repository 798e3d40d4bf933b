use crate::footer::MAGIC_LEN;
use config::{Config, ConfigError, File as ConfigFile};
use serde::Deserialize;
use tracing::error;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// File extensions (without dot) the ransomware appends to encrypted files.
    pub extensions: Vec<String>,
    /// Accepted 8-byte trailer signatures. Both case variants have been
    /// observed in the wild, so the set is configurable rather than fixed.
    pub magic_signatures: Vec<String>,
    pub ignore_patterns: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["akira".to_string()],
            magic_signatures: vec!["AKIRA!!!".to_string(), "akira!!!".to_string()],
            ignore_patterns: Vec::new(),
        }
    }
}

impl AppConfig {
    /// Compile the configured signatures down to raw byte arrays.
    /// Entries that are not exactly 8 bytes are logged and skipped.
    pub fn magic_bytes(&self) -> Vec<[u8; MAGIC_LEN]> {
        self.magic_signatures
            .iter()
            .filter_map(|sig| match <[u8; MAGIC_LEN]>::try_from(sig.as_bytes()) {
                Ok(magic) => Some(magic),
                Err(_) => {
                    error!(
                        "Ignoring magic signature '{}': must be exactly {} bytes",
                        sig, MAGIC_LEN
                    );
                    None
                }
            })
            .collect()
    }
}

pub fn load_configuration() -> Result<AppConfig, ConfigError> {
    let builder = Config::builder()
        .add_source(ConfigFile::with_name("Config").required(false))
        .build()?;
    builder.try_deserialize::<AppConfig>()
}
