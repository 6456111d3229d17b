use async_trait::async_trait;
use chrono::{DateTime, Utc};
use company_registry::admin::{InMemorySessionStore, SessionStore};
use company_registry::config::StorageConfig;
use company_registry::workflows::registration::{
    CompanyRegistration, DeferredRepository, InMemoryRegistrationRepository, RegistrationId,
    RegistrationRepository, RegistrationStatus, RepositoryError, SqliteRegistrationRepository,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{debug, error, info};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Storage selected at startup: SQLite when a database URL is configured, memory otherwise.
pub(crate) enum RegistryBackend {
    Memory(InMemoryRegistrationRepository),
    Sqlite(SqliteRegistrationRepository),
}

pub(crate) type RegistryStore = DeferredRepository<RegistryBackend>;

#[async_trait]
impl RegistrationRepository for RegistryBackend {
    async fn insert(
        &self,
        record: CompanyRegistration,
    ) -> Result<CompanyRegistration, RepositoryError> {
        match self {
            Self::Memory(store) => store.insert(record).await,
            Self::Sqlite(store) => store.insert(record).await,
        }
    }

    async fn fetch(
        &self,
        id: &RegistrationId,
    ) -> Result<Option<CompanyRegistration>, RepositoryError> {
        match self {
            Self::Memory(store) => store.fetch(id).await,
            Self::Sqlite(store) => store.fetch(id).await,
        }
    }

    async fn fetch_by_registration_number(
        &self,
        registration_number: &str,
    ) -> Result<Option<CompanyRegistration>, RepositoryError> {
        match self {
            Self::Memory(store) => store.fetch_by_registration_number(registration_number).await,
            Self::Sqlite(store) => store.fetch_by_registration_number(registration_number).await,
        }
    }

    async fn list(
        &self,
        status: Option<RegistrationStatus>,
    ) -> Result<Vec<CompanyRegistration>, RepositoryError> {
        match self {
            Self::Memory(store) => store.list(status).await,
            Self::Sqlite(store) => store.list(status).await,
        }
    }

    async fn update_status(
        &self,
        id: &RegistrationId,
        status: RegistrationStatus,
        approved_date: Option<DateTime<Utc>>,
    ) -> Result<CompanyRegistration, RepositoryError> {
        match self {
            Self::Memory(store) => store.update_status(id, status, approved_date).await,
            Self::Sqlite(store) => store.update_status(id, status, approved_date).await,
        }
    }
}

/// Connect the configured backend into `store` and flip readiness once it is usable.
///
/// Exhausted retries are logged and leave the store unavailable; the HTTP
/// surface keeps serving `/health` either way.
pub(crate) async fn connect_storage(
    store: RegistryStore,
    config: StorageConfig,
    readiness: Arc<AtomicBool>,
) {
    let backend = match config.database_url.as_deref() {
        None => {
            info!("no database url configured, using in-memory registry storage");
            RegistryBackend::Memory(InMemoryRegistrationRepository::default())
        }
        Some(url) => {
            match SqliteRegistrationRepository::connect_with_retry(
                url,
                config.connect_attempts,
                config.connect_delay,
            )
            .await
            {
                Ok(repository) => RegistryBackend::Sqlite(repository),
                Err(err) => {
                    error!(
                        error = %err,
                        attempts = config.connect_attempts,
                        "registry storage unavailable, serving without persistence"
                    );
                    return;
                }
            }
        }
    };

    if store.install(backend) {
        readiness.store(true, Ordering::Release);
    }
}

/// Periodically drop expired admin sessions.
pub(crate) fn spawn_session_sweeper(
    sessions: Arc<InMemorySessionStore>,
    every: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            match sessions.purge_expired() {
                Ok(0) => {}
                Ok(purged) => debug!(purged, "expired admin sessions purged"),
                Err(err) => error!(error = %err, "admin session purge failed"),
            }
        }
    })
}

/// Browser clients may call the API from any origin.
pub(crate) fn cors_layer() -> CorsLayer {
    use axum::http::{header, Method};

    CorsLayer::new()
        .allow_origin(AllowOrigin::any())
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage(database_url: Option<&str>, attempts: u32) -> StorageConfig {
        StorageConfig {
            database_url: database_url.map(str::to_string),
            connect_attempts: attempts,
            connect_delay: Duration::from_millis(1),
        }
    }

    #[tokio::test]
    async fn memory_backend_is_installed_without_database_url() {
        let store = RegistryStore::new();
        let readiness = Arc::new(AtomicBool::new(false));

        connect_storage(store.clone(), storage(None, 1), readiness.clone()).await;

        assert!(store.is_ready());
        assert!(readiness.load(Ordering::Acquire));
        assert!(store.list(None).await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn sqlite_backend_is_installed_from_url() {
        let store = RegistryStore::new();
        let readiness = Arc::new(AtomicBool::new(false));

        connect_storage(
            store.clone(),
            storage(Some("sqlite::memory:"), 2),
            readiness.clone(),
        )
        .await;

        assert!(store.is_ready());
        assert!(readiness.load(Ordering::Acquire));
    }

    #[tokio::test]
    async fn failed_connect_leaves_store_unavailable() {
        let store = RegistryStore::new();
        let readiness = Arc::new(AtomicBool::new(false));

        connect_storage(
            store.clone(),
            storage(Some("sqlite:///nonexistent-dir/registry/db.sqlite"), 2),
            readiness.clone(),
        )
        .await;

        assert!(!store.is_ready());
        assert!(!readiness.load(Ordering::Acquire));
        assert!(matches!(
            store.list(None).await,
            Err(RepositoryError::Unavailable(_))
        ));
    }
}
