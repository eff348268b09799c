//! Page buttons rendered under paginated tables.
//!
//! Page numbers are `Some(n)`, ellipsis markers are `None`.

use serde::{Deserialize, Serialize};

use crate::domain::page::PageMeta;

/// Buttons shown on regular screens, ellipses and pinned ends included.
pub const DEFAULT_MAX_VISIBLE: usize = 7;

/// Buttons shown on narrow screens.
pub const COMPACT_MAX_VISIBLE: usize = 3;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Viewport {
    Compact,
    #[default]
    Regular,
}

impl Viewport {
    pub fn max_visible(self) -> usize {
        match self {
            Self::Compact => COMPACT_MAX_VISIBLE,
            Self::Regular => DEFAULT_MAX_VISIBLE,
        }
    }

    /// `"compact"` selects the narrow layout, anything else the regular one.
    pub fn from_param(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("compact") {
            Self::Compact
        } else {
            Self::Regular
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PageRange {
    pub pages: Vec<Option<usize>>,
    /// Page 1 is shown apart from the window around the current page.
    pub first_pinned: bool,
    /// The last page is shown apart from the window around the current page.
    pub last_pinned: bool,
}

/// Pushes what stands between two shown pages: nothing, the single hidden
/// page itself, or an ellipsis.
fn push_gap(pages: &mut Vec<Option<usize>>, after: usize, before: usize) {
    match before.saturating_sub(after) {
        0 | 1 => {}
        2 => pages.push(Some(after + 1)),
        _ => pages.push(None),
    }
}

/// Computes the page buttons around `current_page`.
///
/// `max_visible` below 3 is treated as 3. An out-of-range `current_page` is
/// clamped into `1..=total_pages`. The current page is always part of the
/// result when `total_pages > 0`.
pub fn page_range(current_page: usize, total_pages: usize, max_visible: usize) -> PageRange {
    let max_visible = max_visible.max(COMPACT_MAX_VISIBLE);

    if total_pages <= max_visible {
        return PageRange {
            pages: (1..=total_pages).map(Some).collect(),
            first_pinned: false,
            last_pinned: false,
        };
    }

    let current_page = current_page.clamp(1, total_pages);
    let side_pages = (max_visible - 3) / 2;

    let (run_start, run_end) = if current_page <= side_pages + 2 {
        (2, (max_visible - 2).max(current_page))
    } else if current_page + side_pages + 1 >= total_pages {
        ((total_pages + 3 - max_visible).min(current_page), total_pages - 1)
    } else {
        let half = side_pages.saturating_sub(1);
        (current_page - half, current_page + half)
    };

    let shown = std::iter::once(1)
        .chain(run_start..=run_end)
        .chain(std::iter::once(total_pages));

    let mut pages = Vec::with_capacity(max_visible + 2);
    let mut previous = None;
    for page in shown {
        if let Some(previous) = previous {
            push_gap(&mut pages, previous, page);
        }
        pages.push(Some(page));
        previous = Some(page);
    }

    PageRange {
        pages,
        first_pinned: true,
        last_pinned: true,
    }
}

/// [`page_range`] with the button budget of the given viewport.
pub fn page_range_for(current_page: usize, total_pages: usize, viewport: Viewport) -> PageRange {
    page_range(current_page, total_pages, viewport.max_visible())
}

#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub pages: Vec<Option<usize>>,
    pub page: usize,
    pub total_pages: usize,
    pub total: usize,
    pub has_next: bool,
    pub has_prev: bool,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, meta: &PageMeta, viewport: Viewport) -> Self {
        let current_page = if meta.current_page == 0 {
            1
        } else {
            meta.current_page
        };

        let pages = page_range_for(current_page, meta.last_page, viewport).pages;

        Self {
            items,
            pages,
            page: current_page,
            total_pages: meta.last_page,
            total: meta.total,
            has_next: meta.has_next_page(),
            has_prev: meta.has_prev_page(),
        }
    }
}
