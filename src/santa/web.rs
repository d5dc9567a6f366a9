use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::http::StatusCode;
use actix_web::{middleware, web, App, HttpResponse, HttpServer, Result};
use serde::Serialize;
use std::sync::{Mutex, MutexGuard};

use crate::santa::{session::Session, Assignment, SantaError, Upload, EXPORT_FILE_NAME};

// One session per running server. Uploads are kept in memory only.
pub struct AppState {
    pub session: Mutex<Session>,
}

impl AppState {
    pub fn new(session: Session) -> AppState {
        AppState {
            session: Mutex::new(session),
        }
    }
}

#[derive(Serialize)]
pub struct PairingView {
    giver_name: String,
    giver_email: String,
    recipient_name: String,
    recipient_email: String,
}

#[derive(Serialize)]
pub struct AssignmentResponse {
    success: bool,
    attempts: u32,
    pairs: Vec<PairingView>,
}

impl AssignmentResponse {
    fn new(assignment: &Assignment) -> AssignmentResponse {
        AssignmentResponse {
            success: true,
            attempts: assignment.attempts,
            pairs: assignment
                .pairs()
                .iter()
                .map(|p| PairingView {
                    giver_name: p.giver.name.clone(),
                    giver_email: p.giver.email.clone(),
                    recipient_name: p.recipient.name.clone(),
                    recipient_email: p.recipient.email.clone(),
                })
                .collect(),
        }
    }
}

#[derive(Serialize)]
pub struct StateResponse {
    roster: usize,
    history: usize,
    assignments: Option<usize>,
    error: Option<String>,
}

fn lock(state: &web::Data<AppState>) -> Result<MutexGuard<'_, Session>> {
    state
        .session
        .lock()
        .map_err(|_| actix_web::error::ErrorInternalServerError("The session is not available"))
}

fn error_response(status: StatusCode, e: &SantaError) -> HttpResponse {
    HttpResponse::build(status).json(serde_json::json!({
        "success": false,
        "error": e.to_string()
    }))
}

// Status for a failed draw: a missing roster is the caller's fault, an
// infeasible draw is about the content of the uploads.
fn generate_status(e: &SantaError) -> StatusCode {
    match e {
        SantaError::RosterMissing {} => StatusCode::BAD_REQUEST,
        _ => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

async fn upload(
    kind: Upload,
    body: web::Bytes,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let mut session = lock(&state)?;
    let res = match kind {
        Upload::Roster => session.load_roster(&body),
        Upload::History => session.load_history(&body),
    };
    match res {
        Ok(count) => Ok(HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "count": count
        }))),
        Err(e) if e.is_parse_failure() => Ok(error_response(StatusCode::BAD_REQUEST, &e)),
        Err(e) => Ok(error_response(StatusCode::INTERNAL_SERVER_ERROR, &e)),
    }
}

async fn upload_roster(body: web::Bytes, state: web::Data<AppState>) -> Result<HttpResponse> {
    upload(Upload::Roster, body, state).await
}

async fn upload_history(body: web::Bytes, state: web::Data<AppState>) -> Result<HttpResponse> {
    upload(Upload::History, body, state).await
}

async fn clear_history(state: web::Data<AppState>) -> Result<HttpResponse> {
    lock(&state)?.clear_history();
    Ok(HttpResponse::Ok().json(serde_json::json!({"success": true})))
}

async fn generate(state: web::Data<AppState>) -> Result<HttpResponse> {
    let mut session = lock(&state)?;
    match session.generate() {
        Ok(a) => Ok(HttpResponse::Ok().json(AssignmentResponse::new(a))),
        Err(e) => Ok(error_response(generate_status(&e), &e)),
    }
}

async fn get_assignments(state: web::Data<AppState>) -> Result<HttpResponse> {
    let session = lock(&state)?;
    match session.assignment() {
        Some(a) => Ok(HttpResponse::Ok().json(AssignmentResponse::new(a))),
        None => Ok(HttpResponse::NotFound()
            .json(serde_json::json!({"success": false, "error": "No assignments generated yet"}))),
    }
}

async fn download(state: web::Data<AppState>) -> Result<HttpResponse> {
    let mut session = lock(&state)?;
    match session.export() {
        Ok(text) => Ok(HttpResponse::Ok()
            .content_type("text/csv")
            .insert_header(ContentDisposition {
                disposition: DispositionType::Attachment,
                parameters: vec![DispositionParam::Filename(EXPORT_FILE_NAME.to_string())],
            })
            .body(text)),
        Err(e @ SantaError::NothingToExport {}) => Ok(error_response(StatusCode::NOT_FOUND, &e)),
        Err(e) => Ok(error_response(StatusCode::INTERNAL_SERVER_ERROR, &e)),
    }
}

async fn get_state(state: web::Data<AppState>) -> Result<HttpResponse> {
    let session = lock(&state)?;
    Ok(HttpResponse::Ok().json(StateResponse {
        roster: session.roster().len(),
        history: session.history().len(),
        assignments: session.assignment().map(|a| a.len()),
        error: session.error().map(|s| s.to_string()),
    }))
}

async fn index() -> Result<HttpResponse> {
    let html = include_str!("../../templates/index.html");
    Ok(HttpResponse::Ok().content_type("text/html").body(html))
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index))
        .route("/api/state", web::get().to(get_state))
        .route("/api/roster", web::post().to(upload_roster))
        .route("/api/history", web::post().to(upload_history))
        .route("/api/history/clear", web::post().to(clear_history))
        .route("/api/assignments", web::post().to(generate))
        .route("/api/assignments", web::get().to(get_assignments))
        .route("/api/assignments/download", web::get().to(download));
}

pub async fn start_server(address: String, port: u16, session: Session) -> std::io::Result<()> {
    let app_state = web::Data::new(AppState::new(session));

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(middleware::Logger::default())
            .configure(routes)
    })
    .bind((address.as_str(), port))?
    .run()
    .await
}
