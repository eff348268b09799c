//! Translation of [`FilterState`] into REST query parameters.

use chrono::NaiveDate;

use crate::domain::filter::FilterState;
use crate::domain::meeting::Meeting;
use crate::domain::types::MeetingType;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Which list endpoint a query must be sent to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MeetingEndpoint {
    /// `GET /meetings`, paginated.
    List,
    /// `GET /calendar`, bounded by a date range, not paginated.
    Calendar,
}

/// Date constraint of a query; the variants cannot be combined.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DateFilter {
    #[default]
    None,
    /// Only one end of the range was filled in.
    Single(NaiveDate),
    Range {
        start: NaiveDate,
        end: NaiveDate,
    },
}

impl DateFilter {
    /// Builds the date constraint; a reversed range is swapped.
    pub fn from_bounds(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        match (start, end) {
            (Some(start), Some(end)) if end < start => Self::Range {
                start: end,
                end: start,
            },
            (Some(start), Some(end)) => Self::Range { start, end },
            (Some(date), None) | (None, Some(date)) => Self::Single(date),
            (None, None) => Self::None,
        }
    }
}

/// Normalized request parameters; absent fields mean "no filter".
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MeetingQueryParams {
    pub topic: Option<String>,
    pub meeting_type: Option<MeetingType>,
    pub location: Option<String>,
    pub date: DateFilter,
    pub per_page: usize,
}

impl MeetingQueryParams {
    pub fn from_filters(filters: &FilterState) -> Self {
        Self {
            topic: filters.search_term().map(str::to_string),
            meeting_type: filters.meeting_type.selected(),
            location: filters.location.selected().map(str::to_string),
            date: DateFilter::from_bounds(filters.start_date, filters.end_date),
            per_page: filters.per_page,
        }
    }

    pub fn endpoint(&self) -> MeetingEndpoint {
        match self.date {
            DateFilter::Range { .. } => MeetingEndpoint::Calendar,
            DateFilter::None | DateFilter::Single(_) => MeetingEndpoint::List,
        }
    }

    /// Wire `(key, value)` pairs, without the page number.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(topic) = &self.topic {
            pairs.push(("topic", topic.clone()));
        }
        if let Some(meeting_type) = self.meeting_type {
            pairs.push(("type", meeting_type.as_str().to_string()));
        }
        if let Some(location) = &self.location {
            pairs.push(("location", location.clone()));
        }
        match self.date {
            DateFilter::None => {}
            DateFilter::Single(date) => {
                pairs.push(("start_time", date.format(DATE_FORMAT).to_string()));
            }
            DateFilter::Range { start, end } => {
                pairs.push(("start_date", start.format(DATE_FORMAT).to_string()));
                pairs.push(("end_date", end.format(DATE_FORMAT).to_string()));
            }
        }
        pairs.push(("per_page", self.per_page.to_string()));
        pairs
    }

    /// Applies the non-date constraints locally.
    ///
    /// The calendar endpoint only accepts the date pair, so its results are
    /// narrowed here.
    pub fn matches(&self, meeting: &Meeting) -> bool {
        let topic_ok = self.topic.as_ref().is_none_or(|topic| {
            meeting
                .topic
                .to_lowercase()
                .contains(&topic.to_lowercase())
        });
        let type_ok = self
            .meeting_type
            .is_none_or(|meeting_type| meeting.meeting_type == meeting_type);
        let location_ok = self.location.as_ref().is_none_or(|location| {
            meeting
                .location
                .as_deref()
                .is_some_and(|l| l.trim().eq_ignore_ascii_case(location))
        });
        topic_ok && type_ok && location_ok
    }
}
