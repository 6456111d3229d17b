use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::{info, warn};

use super::domain::{CompanyRegistration, RegistrationId, RegistrationStatus};
use super::repository::{RegistrationRepository, RepositoryError};

const CREATE_COMPANIES_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS companies (
        id TEXT PRIMARY KEY NOT NULL,
        companyName TEXT NOT NULL,
        registrationNumber TEXT NOT NULL UNIQUE,
        businessType TEXT NOT NULL,
        address TEXT NOT NULL,
        contactPerson TEXT NOT NULL,
        email TEXT NOT NULL,
        phone TEXT NOT NULL,
        submittedDate TEXT NOT NULL,
        status TEXT NOT NULL,
        approvedDate TEXT
    )
"#;

const SELECT_COLUMNS: &str = "SELECT id, companyName, registrationNumber, businessType, address, \
     contactPerson, email, phone, submittedDate, status, approvedDate FROM companies";

/// SQLite-backed registration table.
#[derive(Debug, Clone)]
pub struct SqliteRegistrationRepository {
    pool: SqlitePool,
}

impl SqliteRegistrationRepository {
    /// Connect and ensure the `companies` table exists.
    pub async fn connect(database_url: &str) -> Result<Self, RepositoryError> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

        // An in-memory database lives only as long as its single connection.
        let pool = if database_url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await?
        } else {
            SqlitePoolOptions::new()
                .max_connections(5)
                .connect_with(options)
                .await?
        };

        let repository = Self { pool };
        repository.ensure_schema().await?;
        Ok(repository)
    }

    /// Retry [`connect`](Self::connect) with a fixed delay between attempts.
    pub async fn connect_with_retry(
        database_url: &str,
        attempts: u32,
        delay: Duration,
    ) -> Result<Self, RepositoryError> {
        let attempts = attempts.max(1);
        let mut attempt = 1;
        loop {
            match Self::connect(database_url).await {
                Ok(repository) => {
                    info!(attempt, "registry storage initialized");
                    return Ok(repository);
                }
                Err(err) if attempt < attempts => {
                    warn!(attempt, attempts, error = %err, "registry storage connect attempt failed");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn ensure_schema(&self) -> Result<(), RepositoryError> {
        sqlx::query(CREATE_COMPANIES_TABLE)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[derive(Debug, sqlx::FromRow)]
#[sqlx(rename_all = "camelCase")]
struct CompanyRow {
    id: String,
    company_name: String,
    registration_number: String,
    business_type: String,
    address: String,
    contact_person: String,
    email: String,
    phone: String,
    submitted_date: String,
    status: String,
    approved_date: Option<String>,
}

impl TryFrom<CompanyRow> for CompanyRegistration {
    type Error = RepositoryError;

    fn try_from(row: CompanyRow) -> Result<Self, Self::Error> {
        let status = RegistrationStatus::from_str(&row.status)
            .map_err(|err| RepositoryError::Corrupt(err.to_string()))?;
        let approved_date = row.approved_date.as_deref().map(parse_timestamp).transpose()?;

        Ok(CompanyRegistration {
            submitted_date: parse_timestamp(&row.submitted_date)?,
            id: RegistrationId(row.id),
            company_name: row.company_name,
            registration_number: row.registration_number,
            business_type: row.business_type,
            address: row.address,
            contact_person: row.contact_person,
            email: row.email,
            phone: row.phone,
            status,
            approved_date,
        })
    }
}

// Fixed-width UTC timestamps keep `ORDER BY submittedDate` chronological.
fn format_timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|value| value.with_timezone(&Utc))
        .map_err(|err| RepositoryError::Corrupt(format!("timestamp '{raw}': {err}")))
}

impl From<sqlx::Error> for RepositoryError {
    fn from(value: sqlx::Error) -> Self {
        RepositoryError::Unavailable(value.to_string())
    }
}

fn duplicate_key(err: &sqlx::Error, record: &CompanyRegistration) -> Option<RepositoryError> {
    let sqlx::Error::Database(db) = err else {
        return None;
    };
    if !db.is_unique_violation() {
        return None;
    }
    Some(if db.message().contains("registrationNumber") {
        RepositoryError::DuplicateKey {
            field: "registrationNumber",
            value: record.registration_number.clone(),
        }
    } else {
        RepositoryError::DuplicateKey {
            field: "id",
            value: record.id.0.clone(),
        }
    })
}

#[async_trait]
impl RegistrationRepository for SqliteRegistrationRepository {
    async fn insert(
        &self,
        record: CompanyRegistration,
    ) -> Result<CompanyRegistration, RepositoryError> {
        let result = sqlx::query(
            r#"
            INSERT INTO companies (id, companyName, registrationNumber, businessType, address,
                contactPerson, email, phone, submittedDate, status, approvedDate)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&record.id.0)
        .bind(&record.company_name)
        .bind(&record.registration_number)
        .bind(&record.business_type)
        .bind(&record.address)
        .bind(&record.contact_person)
        .bind(&record.email)
        .bind(&record.phone)
        .bind(format_timestamp(record.submitted_date))
        .bind(record.status.label())
        .bind(record.approved_date.map(format_timestamp))
        .execute(&self.pool)
        .await;

        if let Err(err) = result {
            return Err(duplicate_key(&err, &record).unwrap_or_else(|| err.into()));
        }

        // Read back so callers see the stored timestamp precision.
        self.fetch(&record.id).await?.ok_or(RepositoryError::NotFound)
    }

    async fn fetch(
        &self,
        id: &RegistrationId,
    ) -> Result<Option<CompanyRegistration>, RepositoryError> {
        let row: Option<CompanyRow> =
            sqlx::query_as(&format!("{SELECT_COLUMNS} WHERE id = ?1"))
                .bind(&id.0)
                .fetch_optional(&self.pool)
                .await?;
        row.map(CompanyRegistration::try_from).transpose()
    }

    async fn fetch_by_registration_number(
        &self,
        registration_number: &str,
    ) -> Result<Option<CompanyRegistration>, RepositoryError> {
        let row: Option<CompanyRow> =
            sqlx::query_as(&format!("{SELECT_COLUMNS} WHERE registrationNumber = ?1"))
                .bind(registration_number)
                .fetch_optional(&self.pool)
                .await?;
        row.map(CompanyRegistration::try_from).transpose()
    }

    async fn list(
        &self,
        status: Option<RegistrationStatus>,
    ) -> Result<Vec<CompanyRegistration>, RepositoryError> {
        let rows: Vec<CompanyRow> = match status {
            Some(status) => {
                sqlx::query_as(&format!(
                    "{SELECT_COLUMNS} WHERE status = ?1 ORDER BY submittedDate DESC, id ASC"
                ))
                .bind(status.label())
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as(&format!(
                    "{SELECT_COLUMNS} ORDER BY submittedDate DESC, id ASC"
                ))
                .fetch_all(&self.pool)
                .await?
            }
        };
        rows.into_iter().map(CompanyRegistration::try_from).collect()
    }

    async fn update_status(
        &self,
        id: &RegistrationId,
        status: RegistrationStatus,
        approved_date: Option<DateTime<Utc>>,
    ) -> Result<CompanyRegistration, RepositoryError> {
        let result = sqlx::query(
            "UPDATE companies SET status = ?1, approvedDate = COALESCE(?2, approvedDate) WHERE id = ?3",
        )
        .bind(status.label())
        .bind(approved_date.map(format_timestamp))
        .bind(&id.0)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        self.fetch(id).await?.ok_or(RepositoryError::NotFound)
    }
}
