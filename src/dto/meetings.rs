use crate::domain::filter::FilterState;
use crate::domain::location::Location;
use crate::domain::meeting::Meeting;
use crate::domain::query::MeetingEndpoint;
use crate::pagination::{Paginated, Viewport};

/// Data required to render the meetings list.
pub struct MeetingsPageData {
    /// Page of meetings with the page buttons to render.
    pub meetings: Paginated<Meeting>,
    /// Filters echoed back into the controls.
    pub filters: FilterState,
    /// Choices for the location selector.
    pub locations: Vec<Location>,
    /// Endpoint the list was loaded from.
    pub endpoint: MeetingEndpoint,
    pub viewport: Viewport,
}
