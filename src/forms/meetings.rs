use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use validator::{Validate, ValidationError};

use crate::domain::filter::{DEFAULT_PER_PAGE, FilterState, LocationFilter, TypeFilter};
use crate::domain::meeting::NewMeeting;
use crate::domain::types::{LocationName, MeetingLink, MeetingTopic, MeetingType, ParticipantEmail};
use crate::forms::FormError;
use crate::pagination::Viewport;

/// Query string of the meetings list; every control arrives as text.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct MeetingFiltersQuery {
    pub search: String,
    #[serde(rename = "type")]
    pub meeting_type: String,
    pub location: String,
    pub start_date: String,
    pub end_date: String,
    pub per_page: String,
    pub page: Option<usize>,
    pub viewport: String,
}

impl MeetingFiltersQuery {
    pub fn page(&self) -> usize {
        self.page.unwrap_or(1).max(1)
    }

    pub fn viewport(&self) -> Viewport {
        Viewport::from_param(&self.viewport)
    }
}

fn parse_date(value: &str) -> Result<Option<NaiveDate>, FormError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| FormError::InvalidDate(value.to_string()))
}

fn parse_per_page(value: &str) -> Result<usize, FormError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(DEFAULT_PER_PAGE);
    }
    match value.parse::<usize>() {
        Ok(per_page) if per_page > 0 => Ok(per_page),
        _ => Err(FormError::InvalidPerPage(value.to_string())),
    }
}

impl TryFrom<&MeetingFiltersQuery> for FilterState {
    type Error = FormError;

    fn try_from(query: &MeetingFiltersQuery) -> Result<Self, Self::Error> {
        Ok(Self {
            search: query.search.clone(),
            meeting_type: TypeFilter::from_param(&query.meeting_type)
                .map_err(|_| FormError::InvalidMeetingType)?,
            location: LocationFilter::from_param(&query.location),
            start_date: parse_date(&query.start_date)?,
            end_date: parse_date(&query.end_date)?,
            per_page: parse_per_page(&query.per_page)?,
        })
    }
}

#[derive(Debug, Deserialize, Validate)]
#[validate(schema(function = "validate_meeting_requirements"))]
/// Form data for creating or updating a meeting.
pub struct MeetingForm {
    #[validate(length(min = 1, max = 200))]
    pub topic: String,
    #[serde(default)]
    pub description: String,
    /// `online`, `offline` or `hybrid`.
    #[serde(rename = "type")]
    pub meeting_type: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub meeting_link: String,
    /// Value of a `datetime-local` input.
    pub start_time: String,
    /// Duration in minutes.
    #[validate(range(min = 1, max = 1440))]
    pub duration: u32,
    /// Participant emails separated by commas or new lines.
    #[serde(default)]
    pub participants: String,
}

/// Online meetings need a link, offline ones a location, hybrid ones both.
fn validate_meeting_requirements(form: &MeetingForm) -> Result<(), ValidationError> {
    let meeting_type: MeetingType = form
        .meeting_type
        .parse()
        .map_err(|_| ValidationError::new("unknown_meeting_type"))?;

    if meeting_type.requires_link() && MeetingLink::new(form.meeting_link.as_str()).is_err() {
        return Err(ValidationError::new("meeting_link_required"));
    }
    if meeting_type.requires_location() && form.location.trim().is_empty() {
        return Err(ValidationError::new("location_required"));
    }
    Ok(())
}

fn parse_start_time(value: &str) -> Result<NaiveDateTime, FormError> {
    let value = value.trim();
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S"))
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S"))
        .map_err(|_| FormError::InvalidDate(value.to_string()))
}

fn parse_participants(value: &str) -> Result<Vec<ParticipantEmail>, FormError> {
    let mut emails = Vec::new();
    for raw in value
        .split([',', ';', '\n'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
    {
        let email =
            ParticipantEmail::new(raw).map_err(|_| FormError::InvalidEmail(raw.to_string()))?;
        if !emails.contains(&email) {
            emails.push(email);
        }
    }
    Ok(emails)
}

impl TryFrom<MeetingForm> for NewMeeting {
    type Error = FormError;

    fn try_from(form: MeetingForm) -> Result<Self, Self::Error> {
        form.validate()?;

        let meeting_type: MeetingType = form
            .meeting_type
            .parse()
            .map_err(|_| FormError::InvalidMeetingType)?;
        let topic = MeetingTopic::new(form.topic).map_err(|_| FormError::InvalidTopic)?;

        let location = if meeting_type.requires_location() {
            Some(LocationName::new(form.location).map_err(|_| FormError::InvalidLocation)?)
        } else {
            LocationName::new(form.location).ok()
        };
        let meeting_link = if form.meeting_link.trim().is_empty() {
            None
        } else {
            Some(MeetingLink::new(form.meeting_link).map_err(|_| FormError::InvalidUrl)?)
        };

        Ok(NewMeeting::new(
            topic,
            Some(form.description),
            meeting_type,
            location,
            meeting_link,
            parse_start_time(&form.start_time)?,
            form.duration,
            parse_participants(&form.participants)?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::query::MeetingQueryParams;

    fn form(meeting_type: &str, location: &str, link: &str) -> MeetingForm {
        MeetingForm {
            topic: "Quarterly review".to_string(),
            description: String::new(),
            meeting_type: meeting_type.to_string(),
            location: location.to_string(),
            meeting_link: link.to_string(),
            start_time: "2024-07-01T14:30".to_string(),
            duration: 60,
            participants: "a@example.com, B@example.com\nb@example.com".to_string(),
        }
    }

    #[test]
    fn filter_query_with_sentinels_builds_no_filters() {
        let query: MeetingFiltersQuery = serde_html_form::from_str(
            "search=&type=all&location=all&start_date=&end_date=&per_page=25",
        )
        .unwrap();

        let filters = FilterState::try_from(&query).unwrap();
        let keys: Vec<_> = MeetingQueryParams::from_filters(&filters)
            .to_pairs()
            .into_iter()
            .map(|(key, _)| key)
            .collect();

        assert!(!filters.has_active_filters());
        assert_eq!(keys, vec!["per_page"]);
        assert_eq!(filters.per_page, 25);
    }

    #[test]
    fn filter_query_parses_values() {
        let query: MeetingFiltersQuery = serde_html_form::from_str(
            "search=sync&type=online&location=HQ&start_date=2024-05-01&page=3&viewport=compact",
        )
        .unwrap();

        let filters = FilterState::try_from(&query).unwrap();

        assert_eq!(filters.meeting_type, TypeFilter::Only(MeetingType::Online));
        assert_eq!(filters.location.selected(), Some("HQ"));
        assert_eq!(filters.start_date, NaiveDate::from_ymd_opt(2024, 5, 1));
        assert_eq!(filters.per_page, DEFAULT_PER_PAGE);
        assert_eq!(query.page(), 3);
        assert_eq!(query.viewport(), Viewport::Compact);
    }

    #[test]
    fn filter_query_rejects_garbage() {
        let bad_type = MeetingFiltersQuery {
            meeting_type: "webinar".into(),
            ..Default::default()
        };
        assert!(matches!(
            FilterState::try_from(&bad_type),
            Err(FormError::InvalidMeetingType)
        ));

        let bad_date = MeetingFiltersQuery {
            end_date: "01/05/2024".into(),
            ..Default::default()
        };
        assert!(matches!(
            FilterState::try_from(&bad_date),
            Err(FormError::InvalidDate(_))
        ));

        let bad_size = MeetingFiltersQuery {
            per_page: "0".into(),
            ..Default::default()
        };
        assert!(matches!(
            FilterState::try_from(&bad_size),
            Err(FormError::InvalidPerPage(_))
        ));
    }

    #[test]
    fn online_meeting_requires_link() {
        assert!(form("online", "", "").validate().is_err());
        assert!(form("online", "", "https://meet.example.com/x").validate().is_ok());
    }

    #[test]
    fn offline_meeting_requires_location() {
        assert!(form("offline", "  ", "").validate().is_err());
        assert!(form("offline", "Room 4", "").validate().is_ok());
    }

    #[test]
    fn hybrid_meeting_requires_both() {
        assert!(form("hybrid", "Room 4", "").validate().is_err());
        assert!(form("hybrid", "", "https://meet.example.com/x").validate().is_err());
        assert!(
            form("hybrid", "Room 4", "https://meet.example.com/x")
                .validate()
                .is_ok()
        );
    }

    #[test]
    fn unknown_type_fails_validation() {
        assert!(form("webinar", "Room 4", "https://meet.example.com/x").validate().is_err());
    }

    #[test]
    fn converts_into_new_meeting() {
        let meeting = NewMeeting::try_from(form("offline", " Room 4 ", "")).unwrap();

        assert_eq!(meeting.meeting_type, MeetingType::Offline);
        assert_eq!(meeting.location.as_ref().map(|l| l.as_str()), Some("Room 4"));
        assert_eq!(meeting.meeting_link, None);
        assert_eq!(meeting.description, None);
        assert_eq!(
            meeting.start_time.format("%Y-%m-%d %H:%M").to_string(),
            "2024-07-01 14:30"
        );
        let emails: Vec<_> = meeting.participants.iter().map(|e| e.as_str()).collect();
        assert_eq!(emails, vec!["a@example.com", "b@example.com"]);
    }

    #[test]
    fn bad_participant_email_is_reported() {
        let mut data = form("offline", "Room 4", "");
        data.participants = "ok@example.com, nope".to_string();

        assert!(matches!(
            NewMeeting::try_from(data),
            Err(FormError::InvalidEmail(email)) if email == "nope"
        ));
    }
}
