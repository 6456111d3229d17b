use std::sync::Arc;

use async_trait::async_trait;
use axum::response::Response;
use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::workflows::registration::domain::{
    CompanyRegistration, RegistrationId, RegistrationStatus, RegistrationSubmission,
};
use crate::workflows::registration::repository::{RegistrationRepository, RepositoryError};
use crate::workflows::registration::{
    registration_router, DecisionPolicy, InMemoryRegistrationRepository, RegistrationService,
};

pub(super) fn submission(id: &str, registration_number: &str) -> RegistrationSubmission {
    RegistrationSubmission {
        id: Some(id.to_string()),
        company_name: "Acme".to_string(),
        registration_number: registration_number.to_string(),
        business_type: "Private Limited".to_string(),
        address: "12 Harbour Road".to_string(),
        contact_person: "Sam Carter".to_string(),
        email: "sam@acme.test".to_string(),
        phone: "+44 20 7946 0000".to_string(),
    }
}

pub(super) fn build_service(
    policy: DecisionPolicy,
) -> (
    RegistrationService<InMemoryRegistrationRepository>,
    Arc<InMemoryRegistrationRepository>,
) {
    let repository = Arc::new(InMemoryRegistrationRepository::default());
    let service = RegistrationService::new(repository.clone(), policy);
    (service, repository)
}

pub(super) fn router_with_service(
    service: RegistrationService<InMemoryRegistrationRepository>,
) -> axum::Router {
    registration_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) struct UnavailableRepository;

#[async_trait]
impl RegistrationRepository for UnavailableRepository {
    async fn insert(
        &self,
        _record: CompanyRegistration,
    ) -> Result<CompanyRegistration, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    async fn fetch(
        &self,
        _id: &RegistrationId,
    ) -> Result<Option<CompanyRegistration>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    async fn fetch_by_registration_number(
        &self,
        _registration_number: &str,
    ) -> Result<Option<CompanyRegistration>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    async fn list(
        &self,
        _status: Option<RegistrationStatus>,
    ) -> Result<Vec<CompanyRegistration>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    async fn update_status(
        &self,
        _id: &RegistrationId,
        _status: RegistrationStatus,
        _approved_date: Option<DateTime<Utc>>,
    ) -> Result<CompanyRegistration, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}
