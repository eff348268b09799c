//! Stand-in for the meetings REST API, served on a random local port.

use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use actix_web::{App, HttpRequest, HttpResponse, HttpServer, web};
use pushkind_meetings::repository::HttpRepository;
use serde_json::{Value, json};

/// Requests seen by the fake backend, as `"METHOD /path?query"`.
#[derive(Clone, Default)]
pub struct Recorded {
    pub requests: Arc<Mutex<Vec<String>>>,
    pub bodies: Arc<Mutex<Vec<Value>>>,
    pub auth: Arc<Mutex<Vec<Option<String>>>>,
}

impl Recorded {
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn bodies(&self) -> Vec<Value> {
        self.bodies.lock().unwrap().clone()
    }

    fn record(&self, req: &HttpRequest) {
        let line = if req.query_string().is_empty() {
            format!("{} {}", req.method(), req.path())
        } else {
            format!("{} {}?{}", req.method(), req.path(), req.query_string())
        };
        self.requests.lock().unwrap().push(line);
        let auth = req
            .headers()
            .get("authorization")
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        self.auth.lock().unwrap().push(auth);
    }
}

pub fn meeting_json(id: i32, topic: &str, meeting_type: &str, location: Option<&str>) -> Value {
    json!({
        "id": id,
        "topic": topic,
        "type": meeting_type,
        "location": location,
        "meeting_link": if meeting_type == "offline" { Value::Null } else { json!("https://meet.example.com/room") },
        "start_time": "2024-06-03 10:00:00",
        "duration": 30,
        "participants": [{"id": 5, "name": "Ann", "email": "ann@example.com"}],
    })
}

fn query_value<'a>(req: &'a HttpRequest, key: &str) -> Option<&'a str> {
    req.query_string()
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| *k == key)
        .map(|(_, v)| v)
}

async fn list_meetings(req: HttpRequest, recorded: web::Data<Recorded>) -> HttpResponse {
    recorded.record(&req);
    match query_value(&req, "topic") {
        Some("boom") => return HttpResponse::InternalServerError().finish(),
        Some("forbidden") => return HttpResponse::Forbidden().finish(),
        Some("invalid") => {
            return HttpResponse::UnprocessableEntity()
                .json(json!({"message": "The topic field is invalid."}));
        }
        _ => {}
    }

    let page: usize = query_value(&req, "page")
        .and_then(|p| p.parse().ok())
        .unwrap_or(1);
    let per_page: usize = query_value(&req, "per_page")
        .and_then(|p| p.parse().ok())
        .unwrap_or(10);

    HttpResponse::Ok().json(json!({
        "data": [
            meeting_json(1, "Weekly sync", "online", None),
            meeting_json(2, "Board review", "offline", Some("HQ")),
        ],
        "current_page": page,
        "last_page": 12,
        "total": 12 * per_page,
        "per_page": per_page,
    }))
}

async fn calendar(req: HttpRequest, recorded: web::Data<Recorded>) -> HttpResponse {
    recorded.record(&req);
    HttpResponse::Ok().json(json!({
        "data": [
            meeting_json(1, "Weekly sync", "online", None),
            meeting_json(2, "Board review", "offline", Some("HQ")),
            meeting_json(3, "Sync with design", "hybrid", Some("Studio")),
        ]
    }))
}

async fn get_meeting(
    req: HttpRequest,
    path: web::Path<i32>,
    recorded: web::Data<Recorded>,
) -> HttpResponse {
    recorded.record(&req);
    match path.into_inner() {
        1 => HttpResponse::Ok().json(json!({"data": meeting_json(1, "Weekly sync", "online", None)})),
        _ => HttpResponse::NotFound().json(json!({"message": "Not found."})),
    }
}

async fn create_meeting(
    req: HttpRequest,
    body: web::Json<Value>,
    recorded: web::Data<Recorded>,
) -> HttpResponse {
    recorded.record(&req);
    let body = body.into_inner();
    let topic = body["topic"].as_str().unwrap_or_default().to_string();
    let meeting_type = body["type"].as_str().unwrap_or("online").to_string();
    recorded.bodies.lock().unwrap().push(body);
    HttpResponse::Created().json(json!({"data": meeting_json(42, &topic, &meeting_type, None)}))
}

async fn update_meeting(
    req: HttpRequest,
    path: web::Path<i32>,
    body: web::Json<Value>,
    recorded: web::Data<Recorded>,
) -> HttpResponse {
    recorded.record(&req);
    let id = path.into_inner();
    let body = body.into_inner();
    let topic = body["topic"].as_str().unwrap_or_default().to_string();
    recorded.bodies.lock().unwrap().push(body);
    HttpResponse::Ok().json(meeting_json(id, &topic, "online", None))
}

async fn delete_meeting(req: HttpRequest, recorded: web::Data<Recorded>) -> HttpResponse {
    recorded.record(&req);
    HttpResponse::NoContent().finish()
}

async fn list_locations(req: HttpRequest, recorded: web::Data<Recorded>) -> HttpResponse {
    recorded.record(&req);
    HttpResponse::Ok().json(json!({"data": [{"id": 1, "name": "HQ", "address": "Main st. 1"}]}))
}

pub struct FakeBackend {
    pub base_url: String,
    pub recorded: Recorded,
}

impl FakeBackend {
    /// Starts the backend on the current Actix system.
    pub fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let recorded = Recorded::default();
        let data = web::Data::new(recorded.clone());

        let server = HttpServer::new(move || {
            App::new().app_data(data.clone()).service(
                web::scope("/api")
                    .route("/meetings", web::get().to(list_meetings))
                    .route("/meetings", web::post().to(create_meeting))
                    .route("/meetings/{id}", web::get().to(get_meeting))
                    .route("/meetings/{id}", web::put().to(update_meeting))
                    .route("/meetings/{id}", web::delete().to(delete_meeting))
                    .route("/calendar", web::get().to(calendar))
                    .route("/locations", web::get().to(list_locations)),
            )
        })
        .workers(1)
        .listen(listener)
        .unwrap()
        .run();
        actix_web::rt::spawn(server);

        Self {
            base_url: format!("http://127.0.0.1:{port}/api"),
            recorded,
        }
    }

    pub fn repository(&self, token: Option<&str>) -> HttpRepository {
        HttpRepository::new(
            self.base_url.clone(),
            token.map(str::to_string),
            Duration::from_secs(5),
        )
        .unwrap()
    }
}
