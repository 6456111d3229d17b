//! Company registration intake and the administrator approval workflow.
//!
//! Submissions are validated into `pending` registrations, stored through a
//! [`RegistrationRepository`], and moved to a terminal state by the
//! [`workflow`] state machine.

pub mod certificate;
pub mod domain;
pub mod memory;
pub mod repository;
pub mod router;
pub mod service;
pub mod sqlite;
pub mod validation;
pub mod workflow;

#[cfg(test)]
mod tests;

pub use certificate::RegistrationCertificate;
pub use domain::{
    CompanyRegistration, RegistrationId, RegistrationStatus, RegistrationSubmission,
    UnknownStatus,
};
pub use memory::InMemoryRegistrationRepository;
pub use repository::{DeferredRepository, RegistrationRepository, RepositoryError};
pub use router::registration_router;
pub use service::{RegistrationService, RegistrationServiceError};
pub use sqlite::SqliteRegistrationRepository;
pub use validation::{RegistrationGuard, ValidationError};
pub use workflow::{transition, DecisionPolicy, ReviewDecision, Transition, TransitionError};
