//! Cursor-based pagination parameters for list endpoints.
//!
//! Cursors are opaque: whatever the ledger returned as `nextCursor` is passed
//! back to it unchanged.

use serde::{Deserialize, Serialize};

/// Default page size when `limit` is not specified.
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Maximum allowed page size; the ledger serves at most this many per page.
pub const MAX_PAGE_SIZE: u32 = 50;

/// Common pagination parameters accepted by list endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaginationParams {
    /// Cursor from a previous response's `nextCursor`.
    pub cursor: Option<String>,
    /// Number of items per page (default 50, max 50).
    pub limit: Option<u32>,
}

impl PaginationParams {
    /// Resolve effective page size, clamped to [1, MAX_PAGE_SIZE].
    pub fn effective_limit(&self) -> u32 {
        self.limit
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE)
    }

    /// The cursor, treating an empty string as absent.
    pub fn cursor(&self) -> Option<String> {
        self.cursor.clone().filter(|c| !c.is_empty())
    }
}

/// Pagination metadata included in list responses.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    pub has_next_page: bool,
    /// Cursor to pass for the next page, or `null` on the last page.
    pub next_cursor: Option<String>,
}
