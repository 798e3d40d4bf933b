//! Fixed-layout trailer appended by the encryptor to every file it touches.
//!
//! Layout (offsets relative to footer start, footer = last 512 bytes):
//!   [0x000, 0x008)  magic signature, 8 ASCII bytes
//!   [0x100, 0x200)  RSA-encrypted ChaCha20 nonce, opaque 256 bytes
//!
//! The nonce is encrypted under the attacker's RSA public key and is never
//! decrypted here; it is only compared for byte-identity across files.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;
use thiserror::Error;

pub const FOOTER_LEN: u64 = 512;
pub const MAGIC_LEN: usize = 8;
pub const NONCE_OFFSET: usize = 0x100;
pub const NONCE_LEN: usize = 256;

#[derive(Error, Debug)]
pub enum FooterError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("footer truncated: file holds {actual} of {FOOTER_LEN} bytes")]
    TruncatedFooter { actual: u64 },

    #[error("nonce field short: {actual} of {NONCE_LEN} bytes")]
    ShortNonceField { actual: usize },
}

/// Check whether `path` carries a valid encryption trailer: total size of at
/// least [`FOOTER_LEN`] bytes and one of the accepted magic signatures at the
/// footer start. Files below the minimum size are simply not candidates.
pub fn has_valid_footer(path: &Path, magics: &[[u8; MAGIC_LEN]]) -> io::Result<bool> {
    let mut file = File::open(path)?;
    let size = file.seek(SeekFrom::End(0))?;
    if size < FOOTER_LEN {
        return Ok(false);
    }

    file.seek(SeekFrom::End(-(FOOTER_LEN as i64)))?;
    let mut magic = [0u8; MAGIC_LEN];
    file.read_exact(&mut magic)?;
    Ok(magics.iter().any(|accepted| *accepted == magic))
}

/// Read the raw RSA-encrypted nonce field from the trailer of `path`.
///
/// The footer is re-read in full so a file truncated between validation and
/// extraction (concurrent modification) surfaces as a distinct error instead
/// of a short or padded field.
pub fn read_nonce_field(path: &Path) -> Result<[u8; NONCE_LEN], FooterError> {
    let mut file = File::open(path)?;
    let size = file.seek(SeekFrom::End(0))?;
    if size < FOOTER_LEN {
        return Err(FooterError::TruncatedFooter { actual: size });
    }

    file.seek(SeekFrom::End(-(FOOTER_LEN as i64)))?;
    let mut footer = [0u8; FOOTER_LEN as usize];
    if let Err(err) = file.read_exact(&mut footer) {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            return Err(FooterError::TruncatedFooter { actual: size });
        }
        return Err(FooterError::Io(err));
    }

    let field = &footer[NONCE_OFFSET..];
    if field.len() < NONCE_LEN {
        return Err(FooterError::ShortNonceField { actual: field.len() });
    }

    let mut nonce = [0u8; NONCE_LEN];
    nonce.copy_from_slice(&field[..NONCE_LEN]);
    Ok(nonce)
}
