use serde::{Deserialize, Serialize};

/// Pagination metadata reported by the server for the last list fetch.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageMeta {
    pub current_page: usize,
    pub last_page: usize,
    pub total: usize,
    pub per_page: usize,
}

impl Default for PageMeta {
    fn default() -> Self {
        Self {
            current_page: 1,
            last_page: 0,
            total: 0,
            per_page: crate::domain::filter::DEFAULT_PER_PAGE,
        }
    }
}

impl PageMeta {
    /// Metadata for an unpaginated result set shown as one page.
    pub fn single_page(total: usize) -> Self {
        Self {
            current_page: 1,
            last_page: usize::from(total > 0),
            total,
            per_page: total,
        }
    }

    pub fn has_next_page(&self) -> bool {
        self.current_page < self.last_page
    }

    pub fn has_prev_page(&self) -> bool {
        self.current_page > 1
    }
}
