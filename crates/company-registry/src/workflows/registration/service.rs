use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use super::certificate::RegistrationCertificate;
use super::domain::{
    CompanyRegistration, RegistrationId, RegistrationStatus, RegistrationSubmission,
};
use super::repository::{RegistrationRepository, RepositoryError};
use super::validation::{RegistrationGuard, ValidationError};
use super::workflow::{transition, DecisionPolicy, ReviewDecision, TransitionError};

/// Service composing intake validation, the approval state machine, and storage.
pub struct RegistrationService<R> {
    guard: RegistrationGuard,
    repository: Arc<R>,
    policy: DecisionPolicy,
}

impl<R> RegistrationService<R>
where
    R: RegistrationRepository + 'static,
{
    pub fn new(repository: Arc<R>, policy: DecisionPolicy) -> Self {
        Self {
            guard: RegistrationGuard,
            repository,
            policy,
        }
    }

    pub fn policy(&self) -> DecisionPolicy {
        self.policy
    }

    pub fn repository(&self) -> &Arc<R> {
        &self.repository
    }

    /// Validate and store a new registration in the `pending` state.
    pub async fn submit(
        &self,
        submission: RegistrationSubmission,
    ) -> Result<CompanyRegistration, RegistrationServiceError> {
        let record = self
            .guard
            .registration_from_submission(submission, Utc::now())?;

        let stored = self.repository.insert(record).await?;
        info!(
            registration_id = %stored.id,
            registration_number = %stored.registration_number,
            "registration submitted"
        );
        Ok(stored)
    }

    pub async fn get(
        &self,
        id: &RegistrationId,
    ) -> Result<CompanyRegistration, RegistrationServiceError> {
        let record = self
            .repository
            .fetch(id)
            .await?
            .ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }

    pub async fn get_by_registration_number(
        &self,
        registration_number: &str,
    ) -> Result<CompanyRegistration, RegistrationServiceError> {
        let record = self
            .repository
            .fetch_by_registration_number(registration_number)
            .await?
            .ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }

    /// Resolve a public search term, trying the id before the registration number.
    pub async fn lookup(&self, term: &str) -> Result<CompanyRegistration, RegistrationServiceError> {
        let term = term.trim();
        if let Some(record) = self
            .repository
            .fetch(&RegistrationId(term.to_string()))
            .await?
        {
            return Ok(record);
        }
        self.get_by_registration_number(term).await
    }

    pub async fn list(
        &self,
        status: Option<RegistrationStatus>,
    ) -> Result<Vec<CompanyRegistration>, RegistrationServiceError> {
        Ok(self.repository.list(status).await?)
    }

    pub async fn approve(
        &self,
        id: &RegistrationId,
    ) -> Result<CompanyRegistration, RegistrationServiceError> {
        self.decide(id, ReviewDecision::Approve).await
    }

    pub async fn reject(
        &self,
        id: &RegistrationId,
    ) -> Result<CompanyRegistration, RegistrationServiceError> {
        self.decide(id, ReviewDecision::Reject).await
    }

    /// Apply an administrator decision and persist the resulting state.
    pub async fn decide(
        &self,
        id: &RegistrationId,
        decision: ReviewDecision,
    ) -> Result<CompanyRegistration, RegistrationServiceError> {
        let record = self.get(id).await?;

        // Approval never predates submission, even with clock skew between writers.
        let now = Utc::now().max(record.submitted_date);
        let outcome = transition(&record, decision, now, self.policy)?;

        if !outcome.changed {
            debug!(registration_id = %id, %decision, "decision already applied");
            return Ok(record);
        }

        let updated = self
            .repository
            .update_status(id, outcome.status, outcome.approved_date)
            .await?;
        info!(
            registration_id = %id,
            %decision,
            previous = %record.status,
            status = %updated.status,
            "registration decided"
        );
        Ok(updated)
    }

    /// Certificate for an approved registration found by id or registration number.
    pub async fn certificate(
        &self,
        term: &str,
    ) -> Result<RegistrationCertificate, RegistrationServiceError> {
        let record = self.lookup(term).await?;
        RegistrationCertificate::for_registration(&record).ok_or(
            RegistrationServiceError::NotApproved {
                id: record.id,
                status: record.status,
            },
        )
    }
}

/// Error raised by the registration service.
#[derive(Debug, thiserror::Error)]
pub enum RegistrationServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error("registration {id} is {status}, not approved")]
    NotApproved {
        id: RegistrationId,
        status: RegistrationStatus,
    },
}
