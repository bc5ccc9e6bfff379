//! Shared correction snapshots fetched from a collaborator backend.
//!
//! The backend is optional. Any failure here degrades to "no shared
//! corrections"; classification never depends on it succeeding.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::corrections::{CorrectionEntry, CorrectionStore};
use crate::storage::KeyValueStore;

/// Rows requested when the caller passes 0.
pub const DEFAULT_FETCH_LIMIT: u32 = 500;
/// Upper bound on rows per snapshot.
pub const MAX_FETCH_LIMIT: u32 = 2000;

/// One row of a shared snapshot, as stored by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedCorrectionRow {
    #[serde(default)]
    pub normalized_name: String,
    #[serde(rename = "categoria", default)]
    pub category: String,
}

impl SharedCorrectionRow {
    pub fn new(normalized_name: &str, category: &str) -> Self {
        Self {
            normalized_name: normalized_name.to_string(),
            category: category.to_string(),
        }
    }
}

/// A backend holding corrections shared between devices.
pub trait SharedCorrectionSource: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Fetch up to `limit` rows, newest first.
    ///
    /// A backend without correction support returns an empty list, not an error.
    fn fetch(
        &self,
        limit: u32,
    ) -> impl Future<Output = Result<Vec<SharedCorrectionRow>, Self::Error>> + Send;

    /// Insert or update one correction. Returns `false` when unsupported.
    fn upsert(
        &self,
        entry: &CorrectionEntry,
    ) -> impl Future<Output = Result<bool, Self::Error>> + Send;
}

/// Clamp a requested row count to `1..=MAX_FETCH_LIMIT`; 0 means the default.
pub fn clamp_limit(limit: u32) -> u32 {
    if limit == 0 {
        DEFAULT_FETCH_LIMIT
    } else {
        limit.min(MAX_FETCH_LIMIT)
    }
}

/// Fetch a fresh snapshot and install it wholesale.
///
/// On failure the shared tier is emptied and classification carries on with
/// local corrections only. Returns the number of entries installed.
#[tracing::instrument(name = "refresh_shared", skip(store, source))]
pub async fn refresh_shared<S, C>(store: &mut CorrectionStore<S>, source: &C, limit: u32) -> usize
where
    S: KeyValueStore,
    C: SharedCorrectionSource,
{
    match source.fetch(clamp_limit(limit)).await {
        Ok(rows) => {
            store.replace_shared(
                rows.into_iter()
                    .map(|row| (row.normalized_name, row.category)),
            );
        }
        Err(e) => {
            tracing::warn!(error = %e, "Shared corrections unavailable");
            store.replace_shared(std::iter::empty::<(String, String)>());
        }
    }
    store.shared_len()
}

/// Publish a user-confirmed correction to the shared backend.
///
/// Returns `false` if the input is not a valid correction, the backend lacks
/// support, or the request fails (logged).
pub async fn share_correction<C>(
    source: &C,
    raw_name: &str,
    raw_category: &str,
    collaborator: &str,
) -> bool
where
    C: SharedCorrectionSource,
{
    let Some(entry) = CorrectionEntry::new(raw_name, raw_category, collaborator) else {
        return false;
    };

    match source.upsert(&entry).await {
        Ok(stored) => stored,
        Err(e) => {
            tracing::warn!(error = %e, name = %entry.normalized_name, "Failed to share correction");
            false
        }
    }
}
