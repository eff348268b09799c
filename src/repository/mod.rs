use async_trait::async_trait;

use crate::{
    domain::{
        location::Location,
        meeting::{Meeting, NewMeeting},
        page::PageMeta,
        query::{MeetingEndpoint, MeetingQueryParams},
        types::MeetingId,
    },
    repository::errors::RepositoryResult,
};

pub mod errors;
pub mod http;
#[cfg(feature = "test-mocks")]
pub mod mock;

pub use http::HttpRepository;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeetingListQuery {
    pub params: MeetingQueryParams,
    pub page: usize,
}

impl MeetingListQuery {
    pub fn new(params: MeetingQueryParams) -> Self {
        Self { params, page: 1 }
    }

    pub fn page(mut self, page: usize) -> Self {
        self.page = page.max(1);
        self
    }

    pub fn endpoint(&self) -> MeetingEndpoint {
        self.params.endpoint()
    }
}

/// One page of meetings with the server's pagination metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct MeetingPage {
    pub meetings: Vec<Meeting>,
    pub meta: PageMeta,
}

#[async_trait]
pub trait MeetingReader {
    async fn list_meetings(&self, query: &MeetingListQuery) -> RepositoryResult<MeetingPage>;
    async fn get_meeting(&self, id: MeetingId) -> RepositoryResult<Option<Meeting>>;
}

#[async_trait]
pub trait MeetingWriter {
    async fn create_meeting(&self, meeting: &NewMeeting) -> RepositoryResult<Meeting>;
    async fn update_meeting(&self, id: MeetingId, meeting: &NewMeeting)
    -> RepositoryResult<Meeting>;
    async fn delete_meeting(&self, id: MeetingId) -> RepositoryResult<()>;
}

#[async_trait]
pub trait LocationReader {
    async fn list_locations(&self) -> RepositoryResult<Vec<Location>>;
}
