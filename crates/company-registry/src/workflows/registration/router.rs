use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use super::domain::{RegistrationId, RegistrationStatus, RegistrationSubmission};
use super::repository::{RegistrationRepository, RepositoryError};
use super::service::{RegistrationService, RegistrationServiceError};
use super::workflow::ReviewDecision;

/// Router builder exposing public intake and admin review endpoints.
pub fn registration_router<R>(service: Arc<RegistrationService<R>>) -> Router
where
    R: RegistrationRepository + 'static,
{
    Router::new()
        .route("/api/companies", post(submit_handler::<R>))
        .route("/api/companies/:lookup", get(lookup_handler::<R>))
        .route(
            "/api/companies/:lookup/certificate",
            get(certificate_handler::<R>),
        )
        .route("/api/admin/companies", get(list_handler::<R>))
        .route(
            "/api/admin/companies/:registration_id/approve",
            put(approve_handler::<R>),
        )
        .route(
            "/api/admin/companies/:registration_id/reject",
            put(reject_handler::<R>),
        )
        .with_state(service)
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ListQuery {
    #[serde(default)]
    pub(crate) status: Option<String>,
}

pub(crate) fn error_status(error: &RegistrationServiceError) -> StatusCode {
    match error {
        RegistrationServiceError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        RegistrationServiceError::Repository(RepositoryError::DuplicateKey { .. })
        | RegistrationServiceError::Transition(_)
        | RegistrationServiceError::NotApproved { .. } => StatusCode::CONFLICT,
        RegistrationServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        RegistrationServiceError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        RegistrationServiceError::Repository(RepositoryError::Corrupt(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn error_response(error: RegistrationServiceError) -> Response {
    let status = error_status(&error);
    if status.is_server_error() {
        error!(error = %error, "registration request failed");
    }
    let message = match &error {
        RegistrationServiceError::Repository(RepositoryError::NotFound) => "Not found".to_string(),
        other => other.to_string(),
    };
    let payload = json!({
        "success": false,
        "error": message,
    });
    (status, axum::Json(payload)).into_response()
}

/// Body extraction failures keep axum's status but use the JSON error shape.
pub(crate) fn rejection_response(rejection: JsonRejection) -> Response {
    let payload = json!({
        "success": false,
        "error": rejection.body_text(),
    });
    (rejection.status(), axum::Json(payload)).into_response()
}

pub(crate) async fn submit_handler<R>(
    State(service): State<Arc<RegistrationService<R>>>,
    body: Result<axum::Json<RegistrationSubmission>, JsonRejection>,
) -> Response
where
    R: RegistrationRepository + 'static,
{
    let submission = match body {
        Ok(axum::Json(submission)) => submission,
        Err(rejection) => return rejection_response(rejection),
    };

    match service.submit(submission).await {
        Ok(record) => {
            let payload = json!({
                "success": true,
                "id": record.id,
            });
            (StatusCode::CREATED, axum::Json(payload)).into_response()
        }
        Err(other) => error_response(other),
    }
}

pub(crate) async fn lookup_handler<R>(
    State(service): State<Arc<RegistrationService<R>>>,
    Path(lookup): Path<String>,
) -> Response
where
    R: RegistrationRepository + 'static,
{
    match service.lookup(&lookup).await {
        Ok(record) => (StatusCode::OK, axum::Json(record)).into_response(),
        Err(RegistrationServiceError::Repository(RepositoryError::NotFound)) => {
            let payload = json!({ "error": "Not found" });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        Err(other) => error_response(other),
    }
}

pub(crate) async fn certificate_handler<R>(
    State(service): State<Arc<RegistrationService<R>>>,
    Path(lookup): Path<String>,
) -> Response
where
    R: RegistrationRepository + 'static,
{
    match service.certificate(&lookup).await {
        Ok(certificate) => {
            let disposition = format!("attachment; filename=\"{}\"", certificate.file_name());
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, "text/html; charset=utf-8".to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                certificate.render_html(),
            )
                .into_response()
        }
        Err(other) => error_response(other),
    }
}

pub(crate) async fn list_handler<R>(
    State(service): State<Arc<RegistrationService<R>>>,
    Query(query): Query<ListQuery>,
) -> Response
where
    R: RegistrationRepository + 'static,
{
    let status = match query.status.as_deref().map(str::parse::<RegistrationStatus>) {
        None => None,
        Some(Ok(status)) => Some(status),
        Some(Err(err)) => {
            let payload = json!({ "error": err.to_string() });
            return (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response();
        }
    };

    match service.list(status).await {
        Ok(companies) => {
            (StatusCode::OK, axum::Json(json!({ "companies": companies }))).into_response()
        }
        Err(other) => error_response(other),
    }
}

async fn decision_response<R>(
    service: &RegistrationService<R>,
    registration_id: String,
    decision: ReviewDecision,
) -> Response
where
    R: RegistrationRepository + 'static,
{
    let id = RegistrationId(registration_id);
    match service.decide(&id, decision).await {
        Ok(record) => {
            let payload = json!({
                "success": true,
                "company": record,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(other) => error_response(other),
    }
}

pub(crate) async fn approve_handler<R>(
    State(service): State<Arc<RegistrationService<R>>>,
    Path(registration_id): Path<String>,
) -> Response
where
    R: RegistrationRepository + 'static,
{
    decision_response(&service, registration_id, ReviewDecision::Approve).await
}

pub(crate) async fn reject_handler<R>(
    State(service): State<Arc<RegistrationService<R>>>,
    Path(registration_id): Path<String>,
) -> Response
where
    R: RegistrationRepository + 'static,
{
    decision_response(&service, registration_id, ReviewDecision::Reject).await
}
