use crate::domain::filter::FilterState;
use crate::domain::meeting::{Meeting, NewMeeting};
use crate::domain::query::MeetingQueryParams;
use crate::domain::types::MeetingId;
use crate::dto::meetings::MeetingsPageData;
use crate::forms::meetings::{MeetingFiltersQuery, MeetingForm};
use crate::pagination::Paginated;
use crate::repository::{LocationReader, MeetingListQuery, MeetingReader, MeetingWriter};
use crate::services::{ServiceError, ServiceResult};

/// Loads one page of meetings for the list view.
///
/// A failure to load the location choices only empties the dropdown.
pub async fn load_meetings_page<R>(
    repo: &R,
    query: &MeetingFiltersQuery,
) -> ServiceResult<MeetingsPageData>
where
    R: MeetingReader + LocationReader + ?Sized,
{
    let filters = FilterState::try_from(query).map_err(|err| {
        log::error!("Failed to parse meeting filters: {err}");
        ServiceError::from(err)
    })?;
    let viewport = query.viewport();

    let list_query =
        MeetingListQuery::new(MeetingQueryParams::from_filters(&filters)).page(query.page());
    let endpoint = list_query.endpoint();

    let page = repo.list_meetings(&list_query).await.map_err(|err| {
        log::error!("Failed to list meetings: {err}");
        err
    })?;

    let locations = repo.list_locations().await.unwrap_or_else(|err| {
        log::warn!("Failed to list locations: {err}");
        Vec::new()
    });

    Ok(MeetingsPageData {
        meetings: Paginated::new(page.meetings, &page.meta, viewport),
        filters,
        locations,
        endpoint,
        viewport,
    })
}

pub async fn load_meeting<R>(repo: &R, meeting_id: i32) -> ServiceResult<Meeting>
where
    R: MeetingReader + ?Sized,
{
    let meeting_id = MeetingId::new(meeting_id)?;

    match repo.get_meeting(meeting_id).await {
        Ok(Some(meeting)) => Ok(meeting),
        Ok(None) => Err(ServiceError::NotFound),
        Err(err) => {
            log::error!("Failed to get meeting {meeting_id}: {err}");
            Err(err.into())
        }
    }
}

/// Validates the form and schedules a new meeting.
pub async fn create_meeting<R>(repo: &R, form: MeetingForm) -> ServiceResult<Meeting>
where
    R: MeetingWriter + ?Sized,
{
    let new_meeting = NewMeeting::try_from(form).map_err(|err| {
        log::error!("Failed to validate meeting form: {err}");
        ServiceError::from(err)
    })?;

    repo.create_meeting(&new_meeting).await.map_err(|err| {
        log::error!("Failed to create meeting: {err}");
        err.into()
    })
}

pub async fn update_meeting<R>(
    repo: &R,
    meeting_id: i32,
    form: MeetingForm,
) -> ServiceResult<Meeting>
where
    R: MeetingWriter + ?Sized,
{
    let meeting_id = MeetingId::new(meeting_id)?;
    let updates = NewMeeting::try_from(form).map_err(|err| {
        log::error!("Failed to validate meeting form: {err}");
        ServiceError::from(err)
    })?;

    repo.update_meeting(meeting_id, &updates)
        .await
        .map_err(|err| {
            log::error!("Failed to update meeting {meeting_id}: {err}");
            err.into()
        })
}

pub async fn delete_meeting<R>(repo: &R, meeting_id: i32) -> ServiceResult<()>
where
    R: MeetingWriter + ?Sized,
{
    let meeting_id = MeetingId::new(meeting_id)?;

    repo.delete_meeting(meeting_id).await.map_err(|err| {
        log::error!("Failed to delete meeting {meeting_id}: {err}");
        err.into()
    })
}

#[cfg(all(test, feature = "test-mocks"))]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::domain::location::Location;
    use crate::domain::page::PageMeta;
    use crate::domain::query::MeetingEndpoint;
    use crate::domain::types::{LocationId, MeetingType};
    use crate::repository::MeetingPage;
    use crate::repository::errors::RepositoryError;
    use crate::repository::mock::MockRepository;
    use crate::store::ErrorKind;

    fn sample_meeting(id: i32) -> Meeting {
        Meeting {
            id: MeetingId::new(id).unwrap(),
            topic: format!("Meeting {id}"),
            description: None,
            meeting_type: MeetingType::Online,
            location: None,
            meeting_link: Some("https://meet.example.com/abc".to_string()),
            start_time: NaiveDate::from_ymd_opt(2024, 6, 3)
                .unwrap()
                .and_hms_opt(10, 0, 0)
                .unwrap(),
            duration_minutes: Some(30),
            participants: vec![],
        }
    }

    fn online_form() -> MeetingForm {
        MeetingForm {
            topic: "Standup".to_string(),
            description: String::new(),
            meeting_type: "online".to_string(),
            location: String::new(),
            meeting_link: "https://meet.example.com/abc".to_string(),
            start_time: "2024-06-03T10:00".to_string(),
            duration: 30,
            participants: String::new(),
        }
    }

    #[tokio::test]
    async fn page_is_loaded_with_normalized_params() {
        let mut repo = MockRepository::new();
        repo.expect_list_meetings()
            .withf(|query| {
                query.page == 4
                    && query.params.topic.as_deref() == Some("sync")
                    && query.params.meeting_type.is_none()
                    && query.params.location.is_none()
            })
            .returning(|query| {
                Ok(MeetingPage {
                    meetings: vec![sample_meeting(1)],
                    meta: PageMeta {
                        current_page: query.page,
                        last_page: 20,
                        total: 200,
                        per_page: 10,
                    },
                })
            });
        repo.expect_list_locations().returning(|| {
            Ok(vec![Location {
                id: LocationId::new(1).unwrap(),
                name: "HQ".to_string(),
                address: None,
            }])
        });

        let query: MeetingFiltersQuery =
            serde_html_form::from_str("search=+sync+&type=all&location=all&page=4").unwrap();
        let data = load_meetings_page(&repo, &query).await.unwrap();

        assert_eq!(data.endpoint, MeetingEndpoint::List);
        assert_eq!(data.meetings.page, 4);
        assert_eq!(
            data.meetings.pages,
            vec![Some(1), Some(2), Some(3), Some(4), Some(5), None, Some(20)]
        );
        assert_eq!(data.locations.len(), 1);
        assert!(data.filters.has_active_filters());
    }

    #[tokio::test]
    async fn location_failure_does_not_hide_meetings() {
        let mut repo = MockRepository::new();
        repo.expect_list_meetings().returning(|_| {
            Ok(MeetingPage {
                meetings: vec![sample_meeting(1)],
                meta: PageMeta::single_page(1),
            })
        });
        repo.expect_list_locations()
            .returning(|| Err(RepositoryError::Server(503)));

        let data = load_meetings_page(&repo, &MeetingFiltersQuery::default())
            .await
            .unwrap();

        assert_eq!(data.meetings.items.len(), 1);
        assert!(data.locations.is_empty());
    }

    #[tokio::test]
    async fn list_failure_is_classified() {
        let mut repo = MockRepository::new();
        repo.expect_list_meetings()
            .returning(|_| Err(RepositoryError::Permission));
        repo.expect_list_locations().never();

        let err = load_meetings_page(&repo, &MeetingFiltersQuery::default())
            .await
            .unwrap_err();

        let state = err.error_state();
        assert_eq!(state.kind, ErrorKind::Permission);
        assert!(!state.retryable);
    }

    #[tokio::test]
    async fn invalid_filter_never_reaches_repository() {
        let mut repo = MockRepository::new();
        repo.expect_list_meetings().never();

        let query = MeetingFiltersQuery {
            start_date: "yesterday".into(),
            ..Default::default()
        };
        let err = load_meetings_page(&repo, &query).await.unwrap_err();

        assert!(matches!(err, ServiceError::Form(_)));
    }

    #[tokio::test]
    async fn missing_meeting_is_not_found() {
        let mut repo = MockRepository::new();
        repo.expect_get_meeting().returning(|_| Ok(None));

        assert!(matches!(
            load_meeting(&repo, 7).await,
            Err(ServiceError::NotFound)
        ));
    }

    #[tokio::test]
    async fn non_positive_id_is_rejected() {
        let repo = MockRepository::new();

        assert!(matches!(
            load_meeting(&repo, 0).await,
            Err(ServiceError::TypeConstraint(_))
        ));
    }

    #[tokio::test]
    async fn create_sends_validated_payload() {
        let mut repo = MockRepository::new();
        repo.expect_create_meeting()
            .withf(|meeting| {
                meeting.meeting_type == MeetingType::Online && meeting.topic.as_str() == "Standup"
            })
            .returning(|_| Ok(sample_meeting(9)));

        let meeting = create_meeting(&repo, online_form()).await.unwrap();

        assert_eq!(i32::from(meeting.id), 9);
    }

    #[tokio::test]
    async fn create_with_invalid_form_skips_repository() {
        let mut repo = MockRepository::new();
        repo.expect_create_meeting().never();

        let mut form = online_form();
        form.meeting_link = String::new();

        assert!(matches!(
            create_meeting(&repo, form).await,
            Err(ServiceError::Form(_))
        ));
    }

    #[tokio::test]
    async fn update_propagates_validation_error() {
        let mut repo = MockRepository::new();
        repo.expect_update_meeting()
            .returning(|_, _| Err(RepositoryError::Validation("Start time is in the past".into())));

        let err = update_meeting(&repo, 3, online_form()).await.unwrap_err();
        let state = err.error_state();

        assert_eq!(state.kind, ErrorKind::Validation);
        assert_eq!(state.message, "Start time is in the past");
    }

    #[tokio::test]
    async fn delete_passes_id() {
        let mut repo = MockRepository::new();
        repo.expect_delete_meeting()
            .withf(|id| i32::from(*id) == 5)
            .returning(|_| Ok(()));

        assert!(delete_meeting(&repo, 5).await.is_ok());
    }
}
