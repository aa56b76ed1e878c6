//! Serialized content form and content hashing.
//!
//! # Responsibility
//! - Define the byte encoding of a `StyledDocument` (JSON) used for hashing.
//! - Derive the content hash used for history deduplication.
//!
//! # Invariants
//! - Equal documents always encode to equal bytes (field order is fixed by
//!   the type definitions).
//! - The content hash is the lowercase hex SHA-256 of the encoded bytes.

use crate::model::document::StyledDocument;
use log::warn;
use sha2::{Digest, Sha256};

/// Encodes a document into its serialized content bytes.
pub fn encode_document(document: &StyledDocument) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(document)
}

/// Content hash of a document's serialized form.
///
/// An encoding failure hashes the empty byte string.
pub fn content_hash(document: &StyledDocument) -> String {
    let bytes = encode_document(document).unwrap_or_else(|err| {
        warn!("event=content_hash module=codec status=error error={err}");
        Vec::new()
    });
    sha256_hex(&bytes)
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let digest = hasher.finalize();
    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest {
        out.push_str(&format!("{byte:02x}"));
    }
    out
}
