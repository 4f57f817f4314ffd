//! Pagination over filtered listings
//!
//! Listing tools fetch the full collection, filter it, then window the
//! filtered result. Filtering happens before windowing so page boundaries
//! are stable with respect to the filter. There is no caching: every call
//! re-fetches, so pages reflect remote state at call time and an entity
//! created or deleted between two page fetches may shift offsets.

use crate::error::{OpenHabError, Result};
use serde::Serialize;

/// A bounded window over a filtered collection
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    /// Entities in the window, in the remote system's native order
    pub items: Vec<T>,
    /// Size of the whole filtered collection
    pub total: usize,
    /// Requested offset
    pub offset: usize,
    /// Effective limit after clamping
    pub limit: usize,
}

impl<T> Page<T> {
    /// Whether entities exist past this window
    pub fn has_more(&self) -> bool {
        self.offset + self.items.len() < self.total
    }
}

/// Window an already-filtered listing.
///
/// `limit` must be positive; values above `max_limit` are clamped. An
/// offset at or past the end of the collection yields an empty page that
/// still reports the true total.
pub fn paginate<T>(entries: Vec<T>, offset: usize, limit: usize, max_limit: usize) -> Result<Page<T>> {
    if limit == 0 {
        return Err(OpenHabError::invalid_input("limit must be greater than zero"));
    }
    let limit = limit.min(max_limit);
    let total = entries.len();

    let items: Vec<T> = entries
        .into_iter()
        .skip(offset)
        .take(limit)
        .collect();

    Ok(Page {
        items,
        total,
        offset,
        limit,
    })
}
