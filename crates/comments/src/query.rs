//! Board query state: pagination, sort order, and search filter.

use std::fmt;
use std::str::FromStr;

use kiosk_core::error::CoreError;

/// Comments per page. The size is fixed; only the page number moves.
pub const PAGE_SIZE: u32 = 5;

/// Sort order applied to comment dates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    /// Oldest first (backend default).
    #[default]
    Asc,
    /// Newest first.
    Desc,
}

impl SortOrder {
    /// Wire form of the order.
    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(CoreError::Validation(format!(
                "sort order must be 'asc' or 'desc', got '{other}'"
            ))),
        }
    }
}

/// The query state the board carries between reloads.
///
/// Mutated only through the transition methods below; every list request
/// sends the whole state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardQuery {
    /// 1-based page number.
    pub page: u32,
    /// Page size sent as `limit`.
    pub page_size: u32,
    /// Date sort order.
    pub sort: SortOrder,
    /// Search filter; empty means unfiltered.
    pub search: String,
}

impl Default for BoardQuery {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: PAGE_SIZE,
            sort: SortOrder::default(),
            search: String::new(),
        }
    }
}

impl BoardQuery {
    /// Set the search filter (trimmed) and jump back to the first page.
    pub fn set_search(&mut self, text: &str) {
        self.search = text.trim().to_string();
        self.page = 1;
    }

    /// Change the sort order. The current page is kept.
    pub fn set_sort(&mut self, sort: SortOrder) {
        self.sort = sort;
    }

    /// Advance one page. The client knows no upper bound; a page past the
    /// end simply loads empty.
    pub fn next_page(&mut self) {
        self.page = self.page.saturating_add(1);
    }

    /// Step back one page, clamped at page 1.
    ///
    /// Returns `true` if the page actually changed.
    pub fn prev_page(&mut self) -> bool {
        if self.page > 1 {
            self.page -= 1;
            true
        } else {
            false
        }
    }
}

// ---------- Tests ----------
