use actix_web::{HttpRequest, HttpResponse, Responder, get, web};

use crate::domain::filter::FilterView;
use crate::domain::query::MeetingEndpoint;
use crate::dto::api::MeetingsResponse;
use crate::forms::meetings::MeetingFiltersQuery;
use crate::repository::HttpRepository;
use crate::services::meetings as meetings_service;
use crate::store::{ErrorKind, ErrorState};

fn error_response(state: &ErrorState) -> HttpResponse {
    let mut response = match state.kind {
        ErrorKind::Validation => HttpResponse::UnprocessableEntity(),
        ErrorKind::Permission => HttpResponse::Forbidden(),
        ErrorKind::NotFound => HttpResponse::NotFound(),
        ErrorKind::Network | ErrorKind::Server => HttpResponse::BadGateway(),
        ErrorKind::Unexpected => HttpResponse::InternalServerError(),
    };
    response.json(state)
}

#[get("/v1/meetings")]
pub async fn api_v1_meetings(req: HttpRequest, repo: web::Data<HttpRepository>) -> impl Responder {
    let query: MeetingFiltersQuery = match serde_html_form::from_str(req.query_string()) {
        Ok(query) => query,
        Err(err) => {
            log::warn!("Malformed meetings query: {err}");
            return error_response(&ErrorState {
                kind: ErrorKind::Validation,
                message: "Invalid filter parameters.".to_string(),
                retryable: false,
            });
        }
    };

    match meetings_service::load_meetings_page(repo.get_ref(), &query).await {
        Ok(data) => HttpResponse::Ok().json(MeetingsResponse {
            filters: FilterView::from(&data.filters),
            calendar: data.endpoint == MeetingEndpoint::Calendar,
            meetings: data.meetings,
        }),
        Err(err) => error_response(&err.error_state()),
    }
}
