//! Pagination metadata for list endpoints.

use serde::{Deserialize, Serialize};

use crate::content_type::ContentType;

/// Page position of a list response.
///
/// Serialized as JSON, typically into a response header or a `bytes` field
/// of the response message.
///
/// ```
/// use prate_core::Pagination;
///
/// let page = Pagination::new(2, 20, 45);
/// assert_eq!(page.pages, 3);
/// assert!(page.has_next);
///
/// let json = page.to_json().unwrap();
/// assert_eq!(Pagination::from_json(&json).unwrap(), page);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// Current page, starting at 1.
    pub page: i32,
    /// Items on each page.
    pub item_count: i8,
    /// Items across all pages.
    pub total_items: i32,
    /// Number of pages.
    pub pages: i32,
    /// True if a page follows this one.
    pub has_next: bool,
}

impl Pagination {
    /// Computes the page count and `has_next` from the totals.
    #[must_use]
    pub fn new(page: i32, item_count: i8, total_items: i32) -> Self {
        let per_page = i32::from(item_count.max(1));
        let total = total_items.max(0);
        let pages = total / per_page + i32::from(total % per_page != 0);
        Self {
            page,
            item_count,
            total_items,
            pages,
            has_next: page < pages,
        }
    }

    /// Serializes to JSON bytes.
    pub fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Parses JSON bytes.
    pub fn from_json(src: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(src)
    }

    /// Content type of the serialized form.
    #[must_use]
    pub const fn content_type(&self) -> ContentType {
        ContentType::JSON
    }
}
