use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for company registrations.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RegistrationId(pub String);

impl RegistrationId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RegistrationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Review state of a registration. `Approved` and `Rejected` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistrationStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl RegistrationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            RegistrationStatus::Pending => "pending",
            RegistrationStatus::Approved => "approved",
            RegistrationStatus::Rejected => "rejected",
        }
    }

    pub const fn is_terminal(self) -> bool {
        !matches!(self, RegistrationStatus::Pending)
    }
}

impl fmt::Display for RegistrationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown registration status '{0}'")]
pub struct UnknownStatus(pub String);

impl FromStr for RegistrationStatus {
    type Err = UnknownStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            _ => Err(UnknownStatus(value.to_string())),
        }
    }
}

/// Applicant-provided registration payload.
///
/// Every field defaults to empty so missing values surface as validation errors
/// instead of deserialization failures. Any `status`, `submittedDate`, or
/// `approvedDate` sent by the client is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RegistrationSubmission {
    pub id: Option<String>,
    pub company_name: String,
    pub registration_number: String,
    pub business_type: String,
    pub address: String,
    pub contact_person: String,
    pub email: String,
    pub phone: String,
}

/// Stored company registration tracked through the approval workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyRegistration {
    pub id: RegistrationId,
    pub company_name: String,
    pub registration_number: String,
    pub business_type: String,
    pub address: String,
    pub contact_person: String,
    pub email: String,
    pub phone: String,
    pub submitted_date: DateTime<Utc>,
    pub status: RegistrationStatus,
    pub approved_date: Option<DateTime<Utc>>,
}

impl CompanyRegistration {
    pub fn is_approved(&self) -> bool {
        self.status == RegistrationStatus::Approved
    }
}

/// Orders registrations newest submission first, breaking ties by id.
pub(crate) fn sort_newest_first(records: &mut [CompanyRegistration]) {
    records.sort_by(|left, right| {
        right
            .submitted_date
            .cmp(&left.submitted_date)
            .then_with(|| left.id.cmp(&right.id))
    });
}
