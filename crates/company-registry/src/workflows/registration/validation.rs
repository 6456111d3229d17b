use chrono::{DateTime, Utc};

use super::domain::{
    CompanyRegistration, RegistrationId, RegistrationStatus, RegistrationSubmission,
};

/// Validation errors raised while turning a submission into a registration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    MissingField { field: &'static str },
    #[error("id must not be blank when provided")]
    BlankId,
    #[error("email '{value}' is not a valid address")]
    MalformedEmail { value: String },
}

impl ValidationError {
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::MissingField { field } => field,
            ValidationError::BlankId => "id",
            ValidationError::MalformedEmail { .. } => "email",
        }
    }
}

/// Intake guard normalizing submissions into `pending` registrations.
#[derive(Debug, Clone, Default)]
pub struct RegistrationGuard;

impl RegistrationGuard {
    pub fn registration_from_submission(
        &self,
        submission: RegistrationSubmission,
        submitted_at: DateTime<Utc>,
    ) -> Result<CompanyRegistration, ValidationError> {
        let id = match submission.id {
            Some(raw) => {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    return Err(ValidationError::BlankId);
                }
                RegistrationId(trimmed.to_string())
            }
            None => generate_registration_id(submitted_at),
        };

        let email = required("email", submission.email)?;
        if !looks_like_email(&email) {
            return Err(ValidationError::MalformedEmail { value: email });
        }

        Ok(CompanyRegistration {
            id,
            company_name: required("companyName", submission.company_name)?,
            registration_number: required("registrationNumber", submission.registration_number)?,
            business_type: required("businessType", submission.business_type)?,
            address: required("address", submission.address)?,
            contact_person: required("contactPerson", submission.contact_person)?,
            email,
            phone: required("phone", submission.phone)?,
            submitted_date: submitted_at,
            status: RegistrationStatus::Pending,
            approved_date: None,
        })
    }
}

fn required(field: &'static str, value: String) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ValidationError::MissingField { field })
    } else {
        Ok(trimmed.to_string())
    }
}

fn looks_like_email(value: &str) -> bool {
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !value.chars().any(char::is_whitespace)
        }
        None => false,
    }
}

/// Reference id handed back to applicants that did not supply one,
/// e.g. `REG-1727780400000-4F9QZ`.
pub(crate) fn generate_registration_id(now: DateTime<Utc>) -> RegistrationId {
    let suffix: String = uuid::Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(5)
        .collect::<String>()
        .to_ascii_uppercase();
    RegistrationId(format!("REG-{}-{suffix}", now.timestamp_millis()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn complete_submission() -> RegistrationSubmission {
        RegistrationSubmission {
            id: Some(" c1 ".to_string()),
            company_name: "Acme Holdings".to_string(),
            registration_number: "R1".to_string(),
            business_type: "LLC".to_string(),
            address: "1 Main St".to_string(),
            contact_person: "Jordan Lee".to_string(),
            email: "jordan@acme.test".to_string(),
            phone: "+1 555 0100".to_string(),
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 10, 1, 9, 30, 0)
            .single()
            .expect("valid timestamp")
    }

    #[test]
    fn builds_pending_record_with_trimmed_values() {
        let record = RegistrationGuard
            .registration_from_submission(complete_submission(), now())
            .expect("valid submission");

        assert_eq!(record.id, RegistrationId("c1".to_string()));
        assert_eq!(record.status, RegistrationStatus::Pending);
        assert_eq!(record.submitted_date, now());
        assert!(record.approved_date.is_none());
    }

    #[test]
    fn reports_first_missing_field() {
        let mut submission = complete_submission();
        submission.business_type = "   ".to_string();

        let err = RegistrationGuard
            .registration_from_submission(submission, now())
            .expect_err("blank business type rejected");
        assert_eq!(
            err,
            ValidationError::MissingField {
                field: "businessType"
            }
        );
        assert_eq!(err.field(), "businessType");
    }

    #[test]
    fn rejects_blank_id_and_malformed_email() {
        let mut blank_id = complete_submission();
        blank_id.id = Some("  ".to_string());
        assert_eq!(
            RegistrationGuard.registration_from_submission(blank_id, now()),
            Err(ValidationError::BlankId)
        );

        for email in ["jordan", "@acme.test", "jordan@", "jo dan@acme.test", "a@b@c"] {
            let mut submission = complete_submission();
            submission.email = email.to_string();
            assert!(
                matches!(
                    RegistrationGuard.registration_from_submission(submission, now()),
                    Err(ValidationError::MalformedEmail { .. })
                ),
                "{email} should be rejected"
            );
        }
    }

    #[test]
    fn generates_reference_id_when_absent() {
        let mut submission = complete_submission();
        submission.id = None;

        let record = RegistrationGuard
            .registration_from_submission(submission, now())
            .expect("valid submission");
        let prefix = format!("REG-{}-", now().timestamp_millis());
        assert!(record.id.as_str().starts_with(&prefix));
        let suffix = &record.id.as_str()[prefix.len()..];
        assert_eq!(suffix.len(), 5);
        assert!(suffix
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
    }
}
