use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, warn};

use super::domain::{
    AdminUpdate, ApplicationForm, ApplicationId, DocumentCategory, StatusFilter,
};
use super::repository::{ApplicationRepository, RepositoryError};
use super::scoring::ApplicationSnapshot;
use super::service::{ApplicationServiceError, LoanApplicationService};
use super::sessions::{bearer_token, AdminSessions};
use super::storage::{BlobError, BlobStore, DEFAULT_MAX_UPLOAD_BYTES};

/// Shared handler state: the service plus the admin session check.
pub struct ApplicationApi<R, B> {
    service: Arc<LoanApplicationService<R, B>>,
    sessions: Arc<dyn AdminSessions>,
}

impl<R, B> Clone for ApplicationApi<R, B> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
            sessions: self.sessions.clone(),
        }
    }
}

impl<R, B> ApplicationApi<R, B> {
    pub fn new(
        service: Arc<LoanApplicationService<R, B>>,
        sessions: Arc<dyn AdminSessions>,
    ) -> Self {
        Self { service, sessions }
    }

    fn authorize(&self, headers: &HeaderMap) -> Result<(), Response> {
        match bearer_token(headers) {
            Some(token) if self.sessions.is_authenticated(token) => Ok(()),
            _ => Err(error_body(
                StatusCode::UNAUTHORIZED,
                "admin session required".to_string(),
            )),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ListQuery {
    #[serde(default)]
    pub(crate) status: Option<StatusFilter>,
}

/// Router builder exposing intake, scoring, document, and admin endpoints.
pub fn application_router<R, B>(
    service: Arc<LoanApplicationService<R, B>>,
    sessions: Arc<dyn AdminSessions>,
) -> Router
where
    R: ApplicationRepository + 'static,
    B: BlobStore + 'static,
{
    application_router_with_upload_limit(service, sessions, DEFAULT_MAX_UPLOAD_BYTES)
}

/// Same routes as [`application_router`], with document uploads capped at
/// `max_upload_bytes`.
pub fn application_router_with_upload_limit<R, B>(
    service: Arc<LoanApplicationService<R, B>>,
    sessions: Arc<dyn AdminSessions>,
    max_upload_bytes: usize,
) -> Router
where
    R: ApplicationRepository + 'static,
    B: BlobStore + 'static,
{
    Router::new()
        .route("/api/v1/assessments", post(assess_handler::<R, B>))
        .route(
            "/api/v1/uploads/:category/:file_name",
            post(upload_handler::<R, B>).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/api/v1/documents/*path", get(document_handler::<R, B>))
        .route("/api/v1/applications", post(submit_handler::<R, B>))
        .route(
            "/api/v1/applications/:application_id",
            get(status_handler::<R, B>),
        )
        .route(
            "/api/v1/admin/applications",
            get(admin_list_handler::<R, B>),
        )
        .route("/api/v1/admin/export", get(admin_export_handler::<R, B>))
        .route(
            "/api/v1/admin/applications/:application_id",
            get(admin_detail_handler::<R, B>).patch(admin_update_handler::<R, B>),
        )
        .with_state(ApplicationApi::new(service, sessions))
}

pub(crate) async fn assess_handler<R, B>(
    State(api): State<ApplicationApi<R, B>>,
    Json(snapshot): Json<ApplicationSnapshot>,
) -> Response
where
    R: ApplicationRepository + 'static,
    B: BlobStore + 'static,
{
    let assessment = api.service.assess(&snapshot);
    (StatusCode::OK, Json(assessment)).into_response()
}

pub(crate) async fn upload_handler<R, B>(
    State(api): State<ApplicationApi<R, B>>,
    Path((category, file_name)): Path<(String, String)>,
    body: Bytes,
) -> Response
where
    R: ApplicationRepository + 'static,
    B: BlobStore + 'static,
{
    let category = match category.parse::<DocumentCategory>() {
        Ok(category) => category,
        Err(err) => return error_body(StatusCode::BAD_REQUEST, err.to_string()),
    };

    match api
        .service
        .upload_document(category, &file_name, body.to_vec())
    {
        Ok(descriptor) => (StatusCode::CREATED, Json(descriptor)).into_response(),
        Err(err) => service_error_response(err),
    }
}

pub(crate) async fn document_handler<R, B>(
    State(api): State<ApplicationApi<R, B>>,
    Path(path): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
    B: BlobStore + 'static,
{
    match api.service.fetch_document(&path) {
        Ok(object) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, object.content_type.to_string())],
            object.bytes,
        )
            .into_response(),
        Err(err) => service_error_response(err),
    }
}

pub(crate) async fn submit_handler<R, B>(
    State(api): State<ApplicationApi<R, B>>,
    Json(form): Json<ApplicationForm>,
) -> Response
where
    R: ApplicationRepository + 'static,
    B: BlobStore + 'static,
{
    match api.service.submit(form) {
        Ok(record) => (StatusCode::CREATED, Json(record.status_view())).into_response(),
        Err(err) => service_error_response(err),
    }
}

pub(crate) async fn status_handler<R, B>(
    State(api): State<ApplicationApi<R, B>>,
    Path(application_id): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
    B: BlobStore + 'static,
{
    match api.service.get(&ApplicationId(application_id)) {
        Ok(record) => (StatusCode::OK, Json(record.status_view())).into_response(),
        Err(err) => service_error_response(err),
    }
}

pub(crate) async fn admin_list_handler<R, B>(
    State(api): State<ApplicationApi<R, B>>,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> Response
where
    R: ApplicationRepository + 'static,
    B: BlobStore + 'static,
{
    if let Err(rejection) = api.authorize(&headers) {
        return rejection;
    }

    match api.service.list(query.status.unwrap_or_default()) {
        Ok(records) => (StatusCode::OK, Json(records)).into_response(),
        Err(err) => service_error_response(err),
    }
}

pub(crate) async fn admin_export_handler<R, B>(
    State(api): State<ApplicationApi<R, B>>,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> Response
where
    R: ApplicationRepository + 'static,
    B: BlobStore + 'static,
{
    if let Err(rejection) = api.authorize(&headers) {
        return rejection;
    }

    match api.service.export_csv(query.status.unwrap_or_default()) {
        Ok(export) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", export.file_name),
                ),
            ],
            export.body,
        )
            .into_response(),
        Err(err) => service_error_response(err),
    }
}

pub(crate) async fn admin_detail_handler<R, B>(
    State(api): State<ApplicationApi<R, B>>,
    headers: HeaderMap,
    Path(application_id): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
    B: BlobStore + 'static,
{
    if let Err(rejection) = api.authorize(&headers) {
        return rejection;
    }

    match api.service.get(&ApplicationId(application_id)) {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(err) => service_error_response(err),
    }
}

pub(crate) async fn admin_update_handler<R, B>(
    State(api): State<ApplicationApi<R, B>>,
    headers: HeaderMap,
    Path(application_id): Path<String>,
    Json(update): Json<AdminUpdate>,
) -> Response
where
    R: ApplicationRepository + 'static,
    B: BlobStore + 'static,
{
    if let Err(rejection) = api.authorize(&headers) {
        return rejection;
    }

    match api.service.update(&ApplicationId(application_id), update) {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(err) => service_error_response(err),
    }
}

fn service_error_response(err: ApplicationServiceError) -> Response {
    let status = match &err {
        ApplicationServiceError::Intake(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ApplicationServiceError::EmptyDocument(_)
        | ApplicationServiceError::Blob(BlobError::InvalidPath(_)) => StatusCode::BAD_REQUEST,
        ApplicationServiceError::Repository(RepositoryError::NotFound)
        | ApplicationServiceError::DocumentNotFound(_) => StatusCode::NOT_FOUND,
        ApplicationServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        ApplicationServiceError::Repository(RepositoryError::Unavailable(_))
        | ApplicationServiceError::Blob(BlobError::Unavailable(_))
        | ApplicationServiceError::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if status.is_server_error() {
        error!(error = %err, "application request failed");
    } else {
        warn!(error = %err, %status, "application request rejected");
    }

    error_body(status, err.to_string())
}

fn error_body(status: StatusCode, message: String) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}
