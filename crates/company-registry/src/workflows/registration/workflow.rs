//! Approval state machine over a registration's status.
//!
//! `pending` is the only initial state; `approved` and `rejected` are terminal.
//! Whether a terminal record may be decided again is governed by
//! [`DecisionPolicy`].

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{CompanyRegistration, RegistrationStatus};

/// Administrator action applied to a registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewDecision {
    Approve,
    Reject,
}

impl ReviewDecision {
    pub const fn target_status(self) -> RegistrationStatus {
        match self {
            ReviewDecision::Approve => RegistrationStatus::Approved,
            ReviewDecision::Reject => RegistrationStatus::Rejected,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            ReviewDecision::Approve => "approve",
            ReviewDecision::Reject => "reject",
        }
    }
}

impl fmt::Display for ReviewDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How decisions on already-decided registrations are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecisionPolicy {
    /// Terminal states are immutable; repeating the same decision is a no-op.
    #[default]
    Final,
    /// Every decision is applied unconditionally, last write wins.
    Overwrite,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown decision policy '{0}'")]
pub struct UnknownPolicy(pub String);

impl FromStr for DecisionPolicy {
    type Err = UnknownPolicy;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "final" | "immutable" => Ok(Self::Final),
            "overwrite" => Ok(Self::Overwrite),
            _ => Err(UnknownPolicy(value.to_string())),
        }
    }
}

/// Outcome of applying a decision. `approved_date` is `Some` only when the
/// stored approval timestamp must be (re)written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub status: RegistrationStatus,
    pub approved_date: Option<DateTime<Utc>>,
    pub changed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("registration is already {current}; cannot {decision}")]
    AlreadyDecided {
        current: RegistrationStatus,
        decision: ReviewDecision,
    },
}

/// Compute the transition for `decision` without touching storage.
pub fn transition(
    record: &CompanyRegistration,
    decision: ReviewDecision,
    now: DateTime<Utc>,
    policy: DecisionPolicy,
) -> Result<Transition, TransitionError> {
    let target = decision.target_status();
    let applied = Transition {
        status: target,
        approved_date: match decision {
            ReviewDecision::Approve => Some(now),
            ReviewDecision::Reject => None,
        },
        changed: true,
    };

    match (record.status, policy) {
        (RegistrationStatus::Pending, _) | (_, DecisionPolicy::Overwrite) => Ok(applied),
        (current, DecisionPolicy::Final) if current == target => Ok(Transition {
            status: current,
            approved_date: None,
            changed: false,
        }),
        (current, DecisionPolicy::Final) => {
            Err(TransitionError::AlreadyDecided { current, decision })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::registration::domain::RegistrationId;
    use chrono::{Duration, TimeZone};

    fn submitted_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 10, 1, 9, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    fn record(status: RegistrationStatus) -> CompanyRegistration {
        CompanyRegistration {
            id: RegistrationId("c1".to_string()),
            company_name: "Acme".to_string(),
            registration_number: "R1".to_string(),
            business_type: "LLC".to_string(),
            address: "1 Main St".to_string(),
            contact_person: "Jordan Lee".to_string(),
            email: "jordan@acme.test".to_string(),
            phone: "555-0100".to_string(),
            submitted_date: submitted_at(),
            status,
            approved_date: (status == RegistrationStatus::Approved).then(submitted_at),
        }
    }

    #[test]
    fn pending_accepts_either_decision() {
        let now = submitted_at() + Duration::hours(2);
        for policy in [DecisionPolicy::Final, DecisionPolicy::Overwrite] {
            let approve = transition(
                &record(RegistrationStatus::Pending),
                ReviewDecision::Approve,
                now,
                policy,
            )
            .expect("approve allowed");
            assert_eq!(approve.status, RegistrationStatus::Approved);
            assert_eq!(approve.approved_date, Some(now));
            assert!(approve.changed);

            let reject = transition(
                &record(RegistrationStatus::Pending),
                ReviewDecision::Reject,
                now,
                policy,
            )
            .expect("reject allowed");
            assert_eq!(reject.status, RegistrationStatus::Rejected);
            assert_eq!(reject.approved_date, None);
        }
    }

    #[test]
    fn final_policy_repeats_are_noops() {
        let now = submitted_at() + Duration::days(1);
        let repeat = transition(
            &record(RegistrationStatus::Approved),
            ReviewDecision::Approve,
            now,
            DecisionPolicy::Final,
        )
        .expect("repeat approval tolerated");
        assert!(!repeat.changed);
        assert_eq!(repeat.approved_date, None);
    }

    #[test]
    fn final_policy_refuses_reversal() {
        let err = transition(
            &record(RegistrationStatus::Rejected),
            ReviewDecision::Approve,
            submitted_at(),
            DecisionPolicy::Final,
        )
        .expect_err("reversal refused");
        assert_eq!(
            err,
            TransitionError::AlreadyDecided {
                current: RegistrationStatus::Rejected,
                decision: ReviewDecision::Approve,
            }
        );
        assert!(err.to_string().contains("already rejected"));
    }

    #[test]
    fn overwrite_policy_applies_unconditionally() {
        let now = submitted_at() + Duration::days(3);
        let reapproval = transition(
            &record(RegistrationStatus::Approved),
            ReviewDecision::Approve,
            now,
            DecisionPolicy::Overwrite,
        )
        .expect("overwrite allowed");
        assert!(reapproval.changed);
        assert_eq!(reapproval.approved_date, Some(now));

        let reversal = transition(
            &record(RegistrationStatus::Approved),
            ReviewDecision::Reject,
            now,
            DecisionPolicy::Overwrite,
        )
        .expect("overwrite allowed");
        assert_eq!(reversal.status, RegistrationStatus::Rejected);
        assert_eq!(reversal.approved_date, None);
    }

    #[test]
    fn policy_parses_from_configuration_strings() {
        assert_eq!("FINAL".parse::<DecisionPolicy>(), Ok(DecisionPolicy::Final));
        assert_eq!(
            "overwrite".parse::<DecisionPolicy>(),
            Ok(DecisionPolicy::Overwrite)
        );
        assert!("whenever".parse::<DecisionPolicy>().is_err());
    }
}
