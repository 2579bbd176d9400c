// SPDX-License-Identifier: AGPL-3.0-or-later
//! `backuppc_pubkey_rsa`: key material of the BackupPC service account

use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD};
use base64::Engine;
use sha2::{Digest, Sha256};
use std::path::Path;
use tracing::warn;

use super::read_source;
use crate::error::{BackuppcError, Result};

/// An OpenSSH public key line: `<algorithm> <base64-key> [comment]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey {
    /// Key type, e.g. `ssh-rsa`
    pub algorithm: String,

    /// Base64 key blob as written in the file
    pub key: String,

    /// Trailing comment, usually `user@host`
    pub comment: Option<String>,
}

impl PublicKey {
    /// Parse public key contents. Needs at least an algorithm and a key.
    pub fn parse(contents: &str) -> Result<Self> {
        let mut tokens = contents.split_whitespace();

        let algorithm = tokens.next().ok_or_else(|| BackuppcError::InvalidPublicKey {
            message: "file is empty".to_string(),
        })?;
        let key = tokens.next().ok_or_else(|| BackuppcError::InvalidPublicKey {
            message: format!("no key material after '{}'", algorithm),
        })?;

        let rest: Vec<&str> = tokens.collect();
        let comment = if rest.is_empty() {
            None
        } else {
            Some(rest.join(" "))
        };

        Ok(Self {
            algorithm: algorithm.to_string(),
            key: key.to_string(),
            comment,
        })
    }

    /// Read and parse a public key file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&contents)
    }

    /// OpenSSH-style fingerprint, `SHA256:<unpadded base64>`
    pub fn fingerprint(&self) -> Result<String> {
        let blob = STANDARD
            .decode(&self.key)
            .map_err(|e| BackuppcError::InvalidPublicKey {
                message: format!("key is not valid base64: {}", e),
            })?;

        let mut hasher = Sha256::new();
        hasher.update(&blob);
        Ok(format!("SHA256:{}", STANDARD_NO_PAD.encode(hasher.finalize())))
    }
}

/// Second whitespace-delimited token of the contents, if there is one
pub fn key_material(contents: &str) -> Option<String> {
    contents.split_whitespace().nth(1).map(str::to_string)
}

/// Read the key file at `path`. `None` if it is missing or has no key token.
pub fn pubkey_fact(path: &Path) -> Option<String> {
    let contents = read_source(path)?;
    let key = key_material(&contents);
    if key.is_none() {
        warn!(path = %path.display(), "Public key file has no key material");
    }
    key
}
