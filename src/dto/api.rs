//! DTOs exposed by the console JSON endpoints.

use serde::Serialize;

use crate::domain::filter::FilterView;
use crate::domain::meeting::Meeting;
use crate::pagination::Paginated;

/// Body returned by `/api/v1/meetings`.
#[derive(Serialize)]
pub struct MeetingsResponse {
    pub meetings: Paginated<Meeting>,
    pub filters: FilterView,
    /// `true` when the result came from the date-range endpoint.
    pub calendar: bool,
}
