//! Whole-collection JSON persistence on top of `KvRepository`.

use crate::repo::kv_repo::{KvRepository, StorageError, StorageResult};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Loads the JSON array stored under `key`.
///
/// An absent key yields an empty collection; a present but unparseable
/// value yields `StorageError::Malformed`.
pub fn load_collection<T, R>(repo: &R, key: &str) -> StorageResult<Vec<T>>
where
    T: DeserializeOwned,
    R: KvRepository + ?Sized,
{
    let Some(raw) = repo.get(key)? else {
        return Ok(Vec::new());
    };

    // `null` is what a cleared browser-style entry looks like.
    let parsed: Option<Vec<T>> =
        serde_json::from_str(&raw).map_err(|source| StorageError::Malformed {
            key: key.to_string(),
            source,
        })?;
    Ok(parsed.unwrap_or_default())
}

/// Overwrites the value under `key` with `items` as a JSON array.
pub fn save_collection<T, R>(repo: &R, key: &str, items: &[T]) -> StorageResult<()>
where
    T: Serialize,
    R: KvRepository + ?Sized,
{
    let encoded = serde_json::to_string(items).map_err(|source| StorageError::Serialize {
        key: key.to_string(),
        source,
    })?;
    repo.put(key, &encoded)
}
