//! Artifact indicators: a SHA-256 over the canonical JSON encoding of a table.
//!
//! Each time an artifact is overwritten its indicator is recomputed, so
//! downstream steps can tell whether the inventory or the partition table
//! actually changed between runs.

use anyhow::{Context, Result};
use serde::Serialize;
use sha2::{Digest, Sha256};

/// Compute SHA-256 over the JSON encoding of `rows` (one line per row) and
/// return the digest as lowercase hex.
pub fn sha256_rows<T: Serialize>(rows: &[T]) -> Result<String> {
    let mut hasher = Sha256::new();
    for row in rows {
        let line = serde_json::to_vec(row).context("encode row for indicator")?;
        hasher.update(&line);
        hasher.update(b"\n");
    }
    Ok(hex::encode(hasher.finalize()))
}
