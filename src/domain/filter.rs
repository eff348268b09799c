//! User-editable filters driving the meetings list.
//!
//! Each field has a "no constraint" value: an empty search, [`TypeFilter::Unset`]
//! or [`TypeFilter::All`], [`LocationFilter::All`] and missing dates. Only
//! fields holding something else are turned into request parameters.

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::types::{MeetingType, TypeConstraintError};

/// Sentinel value meaning "no constraint" in selectors.
pub const ALL_SENTINEL: &str = "all";

/// Rows requested per page when the selector was never touched.
pub const DEFAULT_PER_PAGE: usize = 10;

/// Page sizes offered by the page-size selector.
pub const PER_PAGE_OPTIONS: [usize; 4] = [10, 25, 50, 100];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TypeFilter {
    #[default]
    Unset,
    All,
    Only(MeetingType),
}

impl TypeFilter {
    /// Parses a selector value: `""` is unset, `"all"` is the sentinel.
    pub fn from_param(value: &str) -> Result<Self, TypeConstraintError> {
        let value = value.trim();
        if value.is_empty() {
            Ok(Self::Unset)
        } else if value.eq_ignore_ascii_case(ALL_SENTINEL) {
            Ok(Self::All)
        } else {
            value.parse().map(Self::Only)
        }
    }

    /// The selected meeting type, if it constrains the list.
    pub fn selected(self) -> Option<MeetingType> {
        match self {
            Self::Only(meeting_type) => Some(meeting_type),
            Self::Unset | Self::All => None,
        }
    }

    /// Value echoed back into the selector.
    pub fn as_param(self) -> &'static str {
        match self {
            Self::Unset => "",
            Self::All => ALL_SENTINEL,
            Self::Only(meeting_type) => meeting_type.as_str(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum LocationFilter {
    #[default]
    All,
    Named(String),
}

impl LocationFilter {
    /// Parses a selector value; empty input and `"all"` both mean no constraint.
    pub fn from_param(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() || value.eq_ignore_ascii_case(ALL_SENTINEL) {
            Self::All
        } else {
            Self::Named(value.to_string())
        }
    }

    /// Trimmed location label, if it constrains the list.
    pub fn selected(&self) -> Option<&str> {
        match self {
            Self::All => None,
            Self::Named(name) => Some(name.trim()).filter(|name| !name.is_empty()),
        }
    }

    pub fn as_param(&self) -> &str {
        match self {
            Self::All => ALL_SENTINEL,
            Self::Named(name) => name.as_str(),
        }
    }
}

/// Current values of every filter control on the meetings page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilterState {
    pub search: String,
    pub meeting_type: TypeFilter,
    pub location: LocationFilter,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub per_page: usize,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            search: String::new(),
            meeting_type: TypeFilter::Unset,
            location: LocationFilter::All,
            start_date: None,
            end_date: None,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl FilterState {
    /// Trimmed search text, if any.
    pub fn search_term(&self) -> Option<&str> {
        Some(self.search.trim()).filter(|term| !term.is_empty())
    }

    /// True when at least one filter deviates from its default.
    ///
    /// The page size is not a filter and never counts.
    pub fn has_active_filters(&self) -> bool {
        self.search_term().is_some()
            || self.meeting_type.selected().is_some()
            || self.location.selected().is_some()
            || self.start_date.is_some()
            || self.end_date.is_some()
    }

    /// Every field back at its documented default.
    #[must_use]
    pub fn cleared() -> Self {
        Self::default()
    }
}

/// Serializable snapshot of the filters for templates and JSON.
#[derive(Debug, Serialize)]
pub struct FilterView {
    pub search: String,
    pub meeting_type: &'static str,
    pub location: String,
    pub start_date: String,
    pub end_date: String,
    pub per_page: usize,
    pub active: bool,
}

impl From<&FilterState> for FilterView {
    fn from(filters: &FilterState) -> Self {
        let format_date = |date: Option<NaiveDate>| {
            date.map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default()
        };
        Self {
            search: filters.search.clone(),
            meeting_type: filters.meeting_type.as_param(),
            location: filters.location.as_param().to_string(),
            start_date: format_date(filters.start_date),
            end_date: format_date(filters.end_date),
            per_page: filters.per_page,
            active: filters.has_active_filters(),
        }
    }
}
