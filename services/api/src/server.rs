use crate::cli::ServeArgs;
use crate::infra::{connect_storage, cors_layer, spawn_session_sweeper, AppState, RegistryStore};
use crate::routes::with_registry_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use company_registry::admin::{AdminCredentials, AdminState, InMemorySessionStore};
use company_registry::config::AppConfig;
use company_registry::error::AppError;
use company_registry::telemetry;
use company_registry::workflows::registration::RegistrationService;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(300);

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    if let Some(database_url) = args.database_url.take() {
        config.storage.database_url = Some(database_url);
    }

    telemetry::init(&config.telemetry, config.environment)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let store = RegistryStore::new();
    let registration_service = Arc::new(RegistrationService::new(
        Arc::new(store.clone()),
        config.review.decision_policy,
    ));

    let sessions = Arc::new(InMemorySessionStore::new(config.admin.session_ttl));
    let admin_state = AdminState {
        sessions: sessions.clone(),
        credentials: AdminCredentials::from_config(&config.admin),
        session_ttl: config.admin.session_ttl,
    };

    let app = with_registry_routes(registration_service, admin_state)
        .layer(Extension(app_state))
        .layer(cors_layer())
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tokio::spawn(connect_storage(
        store,
        config.storage.clone(),
        readiness_flag,
    ));
    spawn_session_sweeper(sessions, SESSION_SWEEP_INTERVAL);

    info!(
        ?config.environment,
        %addr,
        decision_policy = ?config.review.decision_policy,
        persistent = config.storage.database_url.is_some(),
        "company registry listening"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
