//! Meetings REST API accessed over HTTP.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, StatusCode, header};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::domain::location::Location;
use crate::domain::meeting::{Meeting, NewMeeting};
use crate::domain::page::PageMeta;
use crate::domain::query::{DateFilter, MeetingEndpoint};
use crate::domain::types::MeetingId;
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{
    LocationReader, MeetingListQuery, MeetingPage, MeetingReader, MeetingWriter,
};

/// Payloads are either bare or wrapped in `{"data": ...}`.
#[derive(Deserialize)]
#[serde(untagged)]
enum Envelope<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> Envelope<T> {
    fn into_inner(self) -> T {
        match self {
            Self::Wrapped { data } | Self::Bare(data) => data,
        }
    }
}

/// Paginated list body; metadata may sit at the top level or under `meta`.
#[derive(Deserialize)]
struct ListBody {
    data: Vec<Meeting>,
    #[serde(default)]
    meta: Option<PageMeta>,
    current_page: Option<usize>,
    last_page: Option<usize>,
    total: Option<usize>,
    per_page: Option<usize>,
}

impl ListBody {
    fn into_page(self) -> RepositoryResult<MeetingPage> {
        let meta = match self.meta {
            Some(meta) => meta,
            None => PageMeta {
                current_page: self.current_page.ok_or_else(missing("current_page"))?,
                last_page: self.last_page.ok_or_else(missing("last_page"))?,
                total: self.total.ok_or_else(missing("total"))?,
                per_page: self.per_page.ok_or_else(missing("per_page"))?,
            },
        };
        Ok(MeetingPage {
            meetings: self.data,
            meta,
        })
    }
}

fn missing(field: &'static str) -> impl FnOnce() -> RepositoryError {
    move || RepositoryError::Unexpected(format!("Malformed response: missing {field}"))
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Turns non-success responses into classified errors.
async fn check_status(response: Response) -> RepositoryResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = if status == StatusCode::UNPROCESSABLE_ENTITY {
        response
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(|body| body.message)
    } else {
        None
    };
    Err(RepositoryError::from_status(status, message))
}

#[derive(Clone)]
pub struct HttpRepository {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl HttpRepository {
    pub fn new(
        base_url: impl Into<String>,
        token: Option<String>,
        timeout: Duration,
    ) -> RepositoryResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RepositoryError::Unexpected(format!("Failed to build client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.trim().is_empty()),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self
            .client
            .request(method, self.url(path))
            .header(header::ACCEPT, "application/json");
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> RepositoryResult<T> {
        let response = check_status(builder.send().await?).await?;
        Ok(response.json::<T>().await?)
    }

    async fn list_page(&self, query: &MeetingListQuery) -> RepositoryResult<MeetingPage> {
        let mut pairs = query.params.to_pairs();
        pairs.push(("page", query.page.to_string()));
        log::debug!("GET meetings {pairs:?}");

        let body: ListBody = self
            .send_json(self.request(Method::GET, "meetings").query(&pairs))
            .await?;
        body.into_page()
    }

    async fn list_calendar(&self, query: &MeetingListQuery) -> RepositoryResult<MeetingPage> {
        let DateFilter::Range { start, end } = query.params.date else {
            return Err(RepositoryError::Unexpected(
                "calendar query without a date range".to_string(),
            ));
        };
        let pairs = [
            ("start_date", start.format("%Y-%m-%d").to_string()),
            ("end_date", end.format("%Y-%m-%d").to_string()),
        ];
        log::debug!("GET calendar {pairs:?}");

        let body: Envelope<Vec<Meeting>> = self
            .send_json(self.request(Method::GET, "calendar").query(&pairs))
            .await?;
        let meetings: Vec<Meeting> = body
            .into_inner()
            .into_iter()
            .filter(|meeting| query.params.matches(meeting))
            .collect();
        let meta = PageMeta::single_page(meetings.len());

        Ok(MeetingPage { meetings, meta })
    }
}

#[async_trait]
impl MeetingReader for HttpRepository {
    async fn list_meetings(&self, query: &MeetingListQuery) -> RepositoryResult<MeetingPage> {
        match query.endpoint() {
            MeetingEndpoint::List => self.list_page(query).await,
            MeetingEndpoint::Calendar => self.list_calendar(query).await,
        }
    }

    async fn get_meeting(&self, id: MeetingId) -> RepositoryResult<Option<Meeting>> {
        let result: RepositoryResult<Envelope<Meeting>> = self
            .send_json(self.request(Method::GET, &format!("meetings/{id}")))
            .await;
        match result {
            Ok(body) => Ok(Some(body.into_inner())),
            Err(RepositoryError::NotFound) => Ok(None),
            Err(err) => Err(err),
        }
    }
}

#[async_trait]
impl MeetingWriter for HttpRepository {
    async fn create_meeting(&self, meeting: &NewMeeting) -> RepositoryResult<Meeting> {
        let body: Envelope<Meeting> = self
            .send_json(self.request(Method::POST, "meetings").json(meeting))
            .await?;
        Ok(body.into_inner())
    }

    async fn update_meeting(
        &self,
        id: MeetingId,
        meeting: &NewMeeting,
    ) -> RepositoryResult<Meeting> {
        let body: Envelope<Meeting> = self
            .send_json(
                self.request(Method::PUT, &format!("meetings/{id}"))
                    .json(meeting),
            )
            .await?;
        Ok(body.into_inner())
    }

    async fn delete_meeting(&self, id: MeetingId) -> RepositoryResult<()> {
        let response = self
            .request(Method::DELETE, &format!("meetings/{id}"))
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }
}

#[async_trait]
impl LocationReader for HttpRepository {
    async fn list_locations(&self) -> RepositoryResult<Vec<Location>> {
        let body: Envelope<Vec<Location>> =
            self.send_json(self.request(Method::GET, "locations")).await?;
        Ok(body.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_join_without_double_slashes() {
        let repo =
            HttpRepository::new("http://api.test/v1/", None, Duration::from_secs(1)).unwrap();
        assert_eq!(repo.url("/meetings"), "http://api.test/v1/meetings");
        assert_eq!(repo.url("calendar"), "http://api.test/v1/calendar");
    }

    #[test]
    fn list_body_reads_top_level_metadata() {
        let body: ListBody = serde_json::from_str(
            r#"{"data":[],"current_page":2,"last_page":5,"total":48,"per_page":10}"#,
        )
        .unwrap();
        let page = body.into_page().unwrap();
        assert_eq!(page.meta.current_page, 2);
        assert_eq!(page.meta.last_page, 5);
    }

    #[test]
    fn list_body_reads_nested_metadata() {
        let body: ListBody = serde_json::from_str(
            r#"{"data":[],"meta":{"current_page":1,"last_page":1,"total":3,"per_page":25}}"#,
        )
        .unwrap();
        assert_eq!(body.into_page().unwrap().meta.per_page, 25);
    }

    #[test]
    fn list_body_without_metadata_is_rejected() {
        let body: ListBody = serde_json::from_str(r#"{"data":[]}"#).unwrap();
        assert!(matches!(
            body.into_page(),
            Err(RepositoryError::Unexpected(_))
        ));
    }

    #[test]
    fn envelope_accepts_bare_and_wrapped() {
        let wrapped: Envelope<Vec<u8>> = serde_json::from_str(r#"{"data":[1,2]}"#).unwrap();
        let bare: Envelope<Vec<u8>> = serde_json::from_str("[1,2]").unwrap();
        assert_eq!(wrapped.into_inner(), bare.into_inner());
    }
}
