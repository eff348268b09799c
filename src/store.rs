//! List-fetching store for the meetings table.
//!
//! All state changes go through [`ListState::reduce`]. Fetches are tagged
//! with increasing request ids and only the most recently issued one may
//! update the visible list.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::NaiveDate;
use serde::Serialize;
use tokio::sync::watch;

use crate::domain::filter::{FilterState, LocationFilter, TypeFilter};
use crate::domain::meeting::Meeting;
use crate::domain::page::PageMeta;
use crate::domain::query::MeetingQueryParams;
use crate::repository::errors::RepositoryError;
use crate::repository::{MeetingListQuery, MeetingPage, MeetingReader};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    Permission,
    NotFound,
    Network,
    Server,
    Unexpected,
}

/// Error shown to the user in place of the list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ErrorState {
    pub kind: ErrorKind,
    pub message: String,
    pub retryable: bool,
}

impl From<&RepositoryError> for ErrorState {
    fn from(err: &RepositoryError) -> Self {
        let (kind, message) = match err {
            RepositoryError::Validation(message) => (ErrorKind::Validation, message.clone()),
            RepositoryError::Permission => (
                ErrorKind::Permission,
                "You do not have permission to view these meetings.".to_string(),
            ),
            RepositoryError::NotFound => (
                ErrorKind::NotFound,
                "The requested meetings were not found.".to_string(),
            ),
            RepositoryError::Network(_) => (
                ErrorKind::Network,
                "Could not reach the server. Check your connection.".to_string(),
            ),
            RepositoryError::Server(_) => (
                ErrorKind::Server,
                "The server failed to load meetings.".to_string(),
            ),
            RepositoryError::Unexpected(_) => (
                ErrorKind::Unexpected,
                "Something went wrong while loading meetings.".to_string(),
            ),
        };
        Self {
            kind,
            message,
            retryable: err.is_retryable(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ListAction {
    SetSearch(String),
    SetMeetingType(TypeFilter),
    SetLocation(LocationFilter),
    SetStartDate(Option<NaiveDate>),
    SetEndDate(Option<NaiveDate>),
    SetPerPage(usize),
    ClearFilters,
    GoToPage(usize),
    FetchStarted { request_id: u64, page: usize },
    FetchSucceeded { request_id: u64, page: MeetingPage },
    FetchFailed { request_id: u64, error: ErrorState },
    Reset,
}

impl ListAction {
    /// Edits of a filter control; one that changes a value restarts pagination.
    pub fn is_filter_edit(&self) -> bool {
        matches!(
            self,
            Self::SetSearch(_)
                | Self::SetMeetingType(_)
                | Self::SetLocation(_)
                | Self::SetStartDate(_)
                | Self::SetEndDate(_)
                | Self::SetPerPage(_)
        )
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ListState {
    pub filters: FilterState,
    pub pagination: PageMeta,
    pub meetings: Vec<Meeting>,
    pub loading: bool,
    pub error: Option<ErrorState>,
    /// Page asked for by the next or in-flight fetch.
    pub requested_page: usize,
    /// Id of the most recently issued fetch.
    pub latest_request: u64,
}

impl Default for ListState {
    fn default() -> Self {
        Self {
            filters: FilterState::default(),
            pagination: PageMeta::default(),
            meetings: Vec::new(),
            loading: false,
            error: None,
            requested_page: 1,
            latest_request: 0,
        }
    }
}

impl ListState {
    #[must_use]
    pub fn reduce(mut self, action: ListAction) -> Self {
        let previous = action.is_filter_edit().then(|| self.filters.clone());
        match action {
            ListAction::SetSearch(search) => self.filters.search = search,
            ListAction::SetMeetingType(meeting_type) => self.filters.meeting_type = meeting_type,
            ListAction::SetLocation(location) => self.filters.location = location,
            ListAction::SetStartDate(date) => self.filters.start_date = date,
            ListAction::SetEndDate(date) => self.filters.end_date = date,
            ListAction::SetPerPage(per_page) => self.filters.per_page = per_page.max(1),
            ListAction::ClearFilters => {
                self.filters = FilterState::cleared();
                self.requested_page = 1;
            }
            ListAction::GoToPage(page) => self.requested_page = page.max(1),
            ListAction::FetchStarted { request_id, page } => {
                if request_id > self.latest_request {
                    self.latest_request = request_id;
                    self.requested_page = page.max(1);
                    self.loading = true;
                    self.error = None;
                }
            }
            ListAction::FetchSucceeded { request_id, page } => {
                if request_id == self.latest_request {
                    self.meetings = page.meetings;
                    self.pagination = page.meta;
                    self.loading = false;
                    self.error = None;
                }
            }
            ListAction::FetchFailed { request_id, error } => {
                if request_id == self.latest_request {
                    self.loading = false;
                    self.error = Some(error);
                }
            }
            ListAction::Reset => return Self::default(),
        }
        if previous.is_some_and(|previous| previous != self.filters) {
            self.requested_page = 1;
        }
        self
    }
}

/// Shared list state driven by filter edits and page requests.
///
/// Every change is published to [`MeetingListStore::subscribe`] receivers.
pub struct MeetingListStore<R> {
    repo: Arc<R>,
    state: watch::Sender<ListState>,
    next_request: AtomicU64,
}

impl<R> MeetingListStore<R>
where
    R: MeetingReader + Send + Sync + 'static,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self::with_filters(repo, FilterState::default())
    }

    pub fn with_filters(repo: Arc<R>, filters: FilterState) -> Self {
        let (state, _) = watch::channel(ListState {
            filters,
            ..ListState::default()
        });
        Self {
            repo,
            state,
            next_request: AtomicU64::new(0),
        }
    }

    /// Applies `action` and reports whether it changed the filters.
    pub fn dispatch(&self, action: ListAction) -> bool {
        let mut filters_changed = false;
        self.state.send_modify(|state| {
            let previous = state.filters.clone();
            *state = std::mem::take(state).reduce(action);
            filters_changed = state.filters != previous;
        });
        filters_changed
    }

    pub fn snapshot(&self) -> ListState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ListState> {
        self.state.subscribe()
    }

    /// Loads `page` with the current filters.
    ///
    /// Returns `false` when a newer fetch was issued meanwhile and this
    /// response was discarded.
    pub async fn fetch(&self, page: usize) -> bool {
        let request_id = self.next_request.fetch_add(1, Ordering::SeqCst) + 1;

        let mut query = None;
        self.state.send_modify(|state| {
            *state = std::mem::take(state).reduce(ListAction::FetchStarted { request_id, page });
            query = Some(
                MeetingListQuery::new(MeetingQueryParams::from_filters(&state.filters)).page(page),
            );
        });
        let Some(query) = query else {
            return false;
        };

        let action = match self.repo.list_meetings(&query).await {
            Ok(page) => ListAction::FetchSucceeded { request_id, page },
            Err(err) => {
                log::error!("Failed to load meetings: {err}");
                ListAction::FetchFailed {
                    request_id,
                    error: ErrorState::from(&err),
                }
            }
        };

        let mut applied = false;
        self.state.send_modify(|state| {
            applied = state.latest_request == request_id;
            *state = std::mem::take(state).reduce(action);
        });
        if !applied {
            log::debug!("Discarding stale meetings response {request_id}");
        }
        applied
    }

    /// Resets every filter and reloads page 1 right away.
    pub async fn clear_filters(&self) -> bool {
        self.dispatch(ListAction::ClearFilters);
        self.fetch(1).await
    }

    /// Loads another page of the current results.
    ///
    /// Refused with `false` while a fetch is still in flight.
    pub async fn go_to_page(&self, page: usize) -> bool {
        if self.state.borrow().loading {
            log::debug!("Ignoring page {page} request while loading");
            return false;
        }
        self.dispatch(ListAction::GoToPage(page));
        self.fetch(page.max(1)).await
    }

    /// Repeats the last fetch if its error allows it.
    pub async fn retry(&self) -> bool {
        let page = {
            let state = self.state.borrow();
            match &state.error {
                Some(error) if error.retryable => state.requested_page,
                _ => return false,
            }
        };
        self.fetch(page).await
    }
}
