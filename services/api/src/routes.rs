use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Extension;
use axum::Json;
use chrono::Utc;
use company_registry::admin::{admin_router, AdminState, SessionStore};
use company_registry::workflows::registration::{
    registration_router, RegistrationRepository, RegistrationService,
};
use serde_json::json;
use std::sync::Arc;

/// Registry API, admin pages, and the operational endpoints on one router.
pub(crate) fn with_registry_routes<R, S>(
    service: Arc<RegistrationService<R>>,
    admin: AdminState<S>,
) -> axum::Router
where
    R: RegistrationRepository + 'static,
    S: SessionStore + 'static,
{
    registration_router(service)
        .merge(admin_router(admin))
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "healthy", "timestamp": Utc::now().to_rfc3339() }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Acquire);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
