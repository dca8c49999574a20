//! Paginated response envelope

use serde::{Deserialize, Serialize};

/// One page of results.
///
/// Only `content` matters to the client; a missing list decodes as empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Items on this page
    #[serde(default = "Vec::new")]
    pub content: Vec<T>,
    /// Total number of items across all pages
    #[serde(default)]
    pub total_elements: Option<u64>,
    /// Total number of pages
    #[serde(default)]
    pub total_pages: Option<u32>,
    /// Zero-based page index
    #[serde(default)]
    pub number: Option<u32>,
    /// Requested page size
    #[serde(default)]
    pub size: Option<u32>,
    /// Whether this is the last page
    #[serde(default)]
    pub last: Option<bool>,
}

impl<T> Page<T> {
    /// Take the items, dropping the paging metadata
    pub fn into_content(self) -> Vec<T> {
        self.content
    }
}
