use actix_web::{HttpRequest, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use serde::Serialize;
use tera::Tera;

use crate::domain::filter::{FilterState, FilterView, PER_PAGE_OPTIONS};
use crate::domain::query::MeetingEndpoint;
use crate::domain::types::MeetingType;
use crate::forms::meetings::{MeetingFiltersQuery, MeetingForm};
use crate::pagination::Viewport;
use crate::repository::{HttpRepository, LocationReader};
use crate::routes::{base_context, redirect, render_template};
use crate::services::ServiceError;
use crate::services::meetings as meetings_service;
use crate::store::ErrorState;

/// Error banner of the list page.
#[derive(Serialize)]
struct ErrorView {
    #[serde(flatten)]
    state: ErrorState,
    /// Link repeating the same request; only set for retryable errors.
    retry_url: Option<String>,
}

/// Query string carrying the filters, without the page number.
pub fn filters_query_string(filters: &FilterState, viewport: Viewport) -> String {
    let view = FilterView::from(filters);
    let per_page = view.per_page.to_string();
    let mut pairs = vec![
        ("search", view.search.as_str()),
        ("type", view.meeting_type),
        ("location", view.location.as_str()),
        ("start_date", view.start_date.as_str()),
        ("end_date", view.end_date.as_str()),
        ("per_page", per_page.as_str()),
    ];
    if viewport == Viewport::Compact {
        pairs.push(("viewport", "compact"));
    }
    serde_html_form::to_string(&pairs).unwrap_or_default()
}

fn parse_filters_query(req: &HttpRequest) -> Result<MeetingFiltersQuery, String> {
    serde_html_form::from_str(req.query_string()).map_err(|err| {
        log::warn!("Malformed meetings query '{}': {err}", req.query_string());
        "Invalid filter parameters.".to_string()
    })
}

#[get("/")]
pub async fn show_index() -> impl Responder {
    redirect("/meetings")
}

#[get("/meetings")]
pub async fn show_meetings(
    req: HttpRequest,
    repo: web::Data<HttpRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    let mut context = base_context(&flash_messages, "meetings");
    context.insert("meeting_types", &MeetingType::ALL);
    context.insert("per_page_options", &PER_PAGE_OPTIONS);

    let query = match parse_filters_query(&req) {
        Ok(query) => query,
        Err(message) => {
            FlashMessage::error(message).send();
            return redirect("/meetings");
        }
    };

    match meetings_service::load_meetings_page(repo.get_ref(), &query).await {
        Ok(data) => {
            context.insert("meetings", &data.meetings);
            context.insert("filters", &FilterView::from(&data.filters));
            context.insert("locations", &data.locations);
            context.insert("calendar", &(data.endpoint == MeetingEndpoint::Calendar));
            context.insert("compact", &(data.viewport == Viewport::Compact));
            context.insert(
                "filters_query",
                &filters_query_string(&data.filters, data.viewport),
            );
        }
        Err(err) => {
            let state = err.error_state();
            let filters = FilterState::try_from(&query).unwrap_or_default();
            let retry_url = state.retryable.then(|| {
                format!(
                    "/meetings?{}&page={}",
                    filters_query_string(&filters, query.viewport()),
                    query.page()
                )
            });
            let locations = repo.list_locations().await.unwrap_or_else(|err| {
                log::warn!("Failed to list locations: {err}");
                Vec::new()
            });

            context.insert("error", &ErrorView { state, retry_url });
            context.insert("filters", &FilterView::from(&filters));
            context.insert("locations", &locations);
            context.insert("calendar", &false);
            context.insert("compact", &(query.viewport() == Viewport::Compact));
            context.insert(
                "filters_query",
                &filters_query_string(&filters, query.viewport()),
            );
        }
    }

    render_template(&tera, "meetings/index.html", &context)
}

#[get("/meeting/{meeting_id}")]
pub async fn show_meeting(
    meeting_id: web::Path<i32>,
    repo: web::Data<HttpRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    let meeting = match meetings_service::load_meeting(repo.get_ref(), meeting_id.into_inner())
        .await
    {
        Ok(meeting) => meeting,
        Err(ServiceError::NotFound | ServiceError::TypeConstraint(_)) => {
            FlashMessage::error("Meeting not found.").send();
            return redirect("/meetings");
        }
        Err(err) => {
            FlashMessage::error(err.error_state().message).send();
            return redirect("/meetings");
        }
    };

    let locations = repo.list_locations().await.unwrap_or_else(|err| {
        log::warn!("Failed to list locations: {err}");
        Vec::new()
    });

    let mut context = base_context(&flash_messages, "meetings");
    context.insert("meeting", &meeting);
    context.insert("locations", &locations);
    context.insert("meeting_types", &MeetingType::ALL);

    render_template(&tera, "meetings/show.html", &context)
}

fn parse_meeting_form(form: &[u8]) -> Result<MeetingForm, ServiceError> {
    serde_html_form::from_bytes(form).map_err(|err| {
        log::error!("Failed to parse meeting form: {err}");
        ServiceError::Form("Invalid meeting form.".to_string())
    })
}

#[post("/meeting/add")]
pub async fn add_meeting(repo: web::Data<HttpRepository>, form: web::Bytes) -> impl Responder {
    let result = match parse_meeting_form(form.as_ref()) {
        Ok(form) => meetings_service::create_meeting(repo.get_ref(), form).await,
        Err(err) => Err(err),
    };

    match result {
        Ok(meeting) => {
            FlashMessage::success("Meeting scheduled.").send();
            redirect(&format!("/meeting/{}", meeting.id))
        }
        Err(err) => {
            FlashMessage::error(err.error_state().message).send();
            redirect("/meetings")
        }
    }
}

#[post("/meeting/{meeting_id}/save")]
pub async fn save_meeting(
    meeting_id: web::Path<i32>,
    repo: web::Data<HttpRepository>,
    form: web::Bytes,
) -> impl Responder {
    let meeting_id = meeting_id.into_inner();
    let result = match parse_meeting_form(form.as_ref()) {
        Ok(form) => meetings_service::update_meeting(repo.get_ref(), meeting_id, form).await,
        Err(err) => Err(err),
    };

    match result {
        Ok(_) => FlashMessage::success("Meeting updated.").send(),
        Err(err) => FlashMessage::error(err.error_state().message).send(),
    }
    redirect(&format!("/meeting/{meeting_id}"))
}

#[post("/meeting/{meeting_id}/delete")]
pub async fn delete_meeting(
    meeting_id: web::Path<i32>,
    repo: web::Data<HttpRepository>,
) -> impl Responder {
    let meeting_id = meeting_id.into_inner();

    match meetings_service::delete_meeting(repo.get_ref(), meeting_id).await {
        Ok(()) => {
            FlashMessage::success("Meeting deleted.").send();
            redirect("/meetings")
        }
        Err(err) => {
            FlashMessage::error(err.error_state().message).send();
            redirect(&format!("/meeting/{meeting_id}"))
        }
    }
}
