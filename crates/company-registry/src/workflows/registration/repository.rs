use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::domain::{CompanyRegistration, RegistrationId, RegistrationStatus};

/// Storage abstraction so the service can run against memory or SQLite.
#[async_trait]
pub trait RegistrationRepository: Send + Sync {
    /// Fails with `DuplicateKey` when the id or registration number is taken.
    async fn insert(
        &self,
        record: CompanyRegistration,
    ) -> Result<CompanyRegistration, RepositoryError>;

    async fn fetch(
        &self,
        id: &RegistrationId,
    ) -> Result<Option<CompanyRegistration>, RepositoryError>;

    async fn fetch_by_registration_number(
        &self,
        registration_number: &str,
    ) -> Result<Option<CompanyRegistration>, RepositoryError>;

    /// All registrations, newest submission first, optionally restricted to one status.
    async fn list(
        &self,
        status: Option<RegistrationStatus>,
    ) -> Result<Vec<CompanyRegistration>, RepositoryError>;

    /// Persist a status change. `None` leaves the stored approval date untouched.
    async fn update_status(
        &self,
        id: &RegistrationId,
        status: RegistrationStatus,
        approved_date: Option<DateTime<Utc>>,
    ) -> Result<CompanyRegistration, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("registration with {field} '{value}' already exists")]
    DuplicateKey { field: &'static str, value: String },
    #[error("registration not found")]
    NotFound,
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("stored registration is malformed: {0}")]
    Corrupt(String),
}

/// Repository whose backend is connected after the server starts.
///
/// Until [`DeferredRepository::install`] succeeds every call fails with
/// [`RepositoryError::Unavailable`].
pub struct DeferredRepository<R> {
    backend: Arc<OnceLock<R>>,
}

impl<R> Clone for DeferredRepository<R> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
        }
    }
}

impl<R> Default for DeferredRepository<R> {
    fn default() -> Self {
        Self {
            backend: Arc::new(OnceLock::new()),
        }
    }
}

impl<R> DeferredRepository<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ready(backend: R) -> Self {
        let deferred = Self::default();
        deferred.install(backend);
        deferred
    }

    /// Install the connected backend. Returns `false` if one was already present.
    pub fn install(&self, backend: R) -> bool {
        self.backend.set(backend).is_ok()
    }

    pub fn is_ready(&self) -> bool {
        self.backend.get().is_some()
    }

    fn backend(&self) -> Result<&R, RepositoryError> {
        self.backend
            .get()
            .ok_or_else(|| RepositoryError::Unavailable("registry storage not connected".into()))
    }
}

#[async_trait]
impl<R> RegistrationRepository for DeferredRepository<R>
where
    R: RegistrationRepository,
{
    async fn insert(
        &self,
        record: CompanyRegistration,
    ) -> Result<CompanyRegistration, RepositoryError> {
        self.backend()?.insert(record).await
    }

    async fn fetch(
        &self,
        id: &RegistrationId,
    ) -> Result<Option<CompanyRegistration>, RepositoryError> {
        self.backend()?.fetch(id).await
    }

    async fn fetch_by_registration_number(
        &self,
        registration_number: &str,
    ) -> Result<Option<CompanyRegistration>, RepositoryError> {
        self.backend()?
            .fetch_by_registration_number(registration_number)
            .await
    }

    async fn list(
        &self,
        status: Option<RegistrationStatus>,
    ) -> Result<Vec<CompanyRegistration>, RepositoryError> {
        self.backend()?.list(status).await
    }

    async fn update_status(
        &self,
        id: &RegistrationId,
        status: RegistrationStatus,
        approved_date: Option<DateTime<Utc>>,
    ) -> Result<CompanyRegistration, RepositoryError> {
        self.backend()?
            .update_status(id, status, approved_date)
            .await
    }
}
