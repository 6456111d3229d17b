use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::workflows::registration::RegistrationServiceError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// Process-level failure surfaced by the binary or mapped onto an HTTP response.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("telemetry error: {0}")]
    Telemetry(#[from] TelemetryError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("server error: {0}")]
    Server(#[from] axum::Error),
    #[error("registry error: {0}")]
    Registry(#[from] RegistrationServiceError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Registry(err) => crate::workflows::registration::router::error_status(err),
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({ "success": false, "error": self.to_string() }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::registration::RepositoryError;

    #[test]
    fn registry_errors_keep_their_http_status() {
        let not_found: AppError = RegistrationServiceError::from(RepositoryError::NotFound).into();
        assert_eq!(not_found.into_response().status(), StatusCode::NOT_FOUND);

        let config: AppError = ConfigError::InvalidPort.into();
        assert!(config.to_string().starts_with("configuration error"));
        assert_eq!(
            config.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
