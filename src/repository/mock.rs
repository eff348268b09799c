//! Mock repository implementations for isolating services in tests.

use async_trait::async_trait;
use mockall::mock;

use crate::domain::location::Location;
use crate::domain::meeting::{Meeting, NewMeeting};
use crate::domain::types::MeetingId;
use crate::repository::errors::RepositoryResult;
use crate::repository::{
    LocationReader, MeetingListQuery, MeetingPage, MeetingReader, MeetingWriter,
};

mock! {
    pub Repository {}

    #[async_trait]
    impl MeetingReader for Repository {
        async fn list_meetings(&self, query: &MeetingListQuery) -> RepositoryResult<MeetingPage>;
        async fn get_meeting(&self, id: MeetingId) -> RepositoryResult<Option<Meeting>>;
    }

    #[async_trait]
    impl MeetingWriter for Repository {
        async fn create_meeting(&self, meeting: &NewMeeting) -> RepositoryResult<Meeting>;
        async fn update_meeting(
            &self,
            id: MeetingId,
            meeting: &NewMeeting,
        ) -> RepositoryResult<Meeting>;
        async fn delete_meeting(&self, id: MeetingId) -> RepositoryResult<()>;
    }

    #[async_trait]
    impl LocationReader for Repository {
        async fn list_locations(&self) -> RepositoryResult<Vec<Location>>;
    }
}
