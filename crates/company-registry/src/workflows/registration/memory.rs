use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::domain::{sort_newest_first, CompanyRegistration, RegistrationId, RegistrationStatus};
use super::repository::{RegistrationRepository, RepositoryError};

/// Process-local registration store used by demos, tests, and database-less deployments.
#[derive(Default, Clone)]
pub struct InMemoryRegistrationRepository {
    records: Arc<Mutex<HashMap<RegistrationId, CompanyRegistration>>>,
}

impl InMemoryRegistrationRepository {
    fn records(
        &self,
    ) -> Result<MutexGuard<'_, HashMap<RegistrationId, CompanyRegistration>>, RepositoryError>
    {
        self.records
            .lock()
            .map_err(|_| RepositoryError::Unavailable("registry mutex poisoned".to_string()))
    }

    pub fn len(&self) -> usize {
        self.records().map(|guard| guard.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl RegistrationRepository for InMemoryRegistrationRepository {
    async fn insert(
        &self,
        record: CompanyRegistration,
    ) -> Result<CompanyRegistration, RepositoryError> {
        let mut guard = self.records()?;
        if guard.contains_key(&record.id) {
            return Err(RepositoryError::DuplicateKey {
                field: "id",
                value: record.id.0.clone(),
            });
        }
        if guard
            .values()
            .any(|existing| existing.registration_number == record.registration_number)
        {
            return Err(RepositoryError::DuplicateKey {
                field: "registrationNumber",
                value: record.registration_number.clone(),
            });
        }
        guard.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    async fn fetch(
        &self,
        id: &RegistrationId,
    ) -> Result<Option<CompanyRegistration>, RepositoryError> {
        Ok(self.records()?.get(id).cloned())
    }

    async fn fetch_by_registration_number(
        &self,
        registration_number: &str,
    ) -> Result<Option<CompanyRegistration>, RepositoryError> {
        Ok(self
            .records()?
            .values()
            .find(|record| record.registration_number == registration_number)
            .cloned())
    }

    async fn list(
        &self,
        status: Option<RegistrationStatus>,
    ) -> Result<Vec<CompanyRegistration>, RepositoryError> {
        let mut records: Vec<_> = self
            .records()?
            .values()
            .filter(|record| status.map_or(true, |wanted| record.status == wanted))
            .cloned()
            .collect();
        sort_newest_first(&mut records);
        Ok(records)
    }

    async fn update_status(
        &self,
        id: &RegistrationId,
        status: RegistrationStatus,
        approved_date: Option<DateTime<Utc>>,
    ) -> Result<CompanyRegistration, RepositoryError> {
        let mut guard = self.records()?;
        let record = guard.get_mut(id).ok_or(RepositoryError::NotFound)?;
        record.status = status;
        if approved_date.is_some() {
            record.approved_date = approved_date;
        }
        Ok(record.clone())
    }
}
