//! JSON array collections stored under one key.
//!
//! # Invariants
//! - A read or decode failure yields an empty collection; there is no
//!   partial recovery of a damaged array.
//! - Writes replace the whole array.

use crate::repo::kv_repo::{KvRepository, RepoResult};
use log::{error, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;

pub(crate) fn load_collection<T, R>(kv: &R, key: &str) -> Vec<T>
where
    T: DeserializeOwned,
    R: KvRepository + ?Sized,
{
    let bytes = match kv.load(key) {
        Ok(Some(bytes)) => bytes,
        Ok(None) => return Vec::new(),
        Err(err) => {
            error!("event=collection_load module=repo status=error key={key} error={err}");
            return Vec::new();
        }
    };

    match serde_json::from_slice(&bytes) {
        Ok(items) => items,
        Err(err) => {
            warn!(
                "event=collection_decode module=repo status=error key={} bytes={} error={}",
                key,
                bytes.len(),
                err
            );
            Vec::new()
        }
    }
}

pub(crate) fn save_collection<T, R>(kv: &R, key: &str, items: &[T]) -> RepoResult<()>
where
    T: Serialize,
    R: KvRepository + ?Sized,
{
    let bytes = serde_json::to_vec(items)?;
    kv.save(key, &bytes)
}
