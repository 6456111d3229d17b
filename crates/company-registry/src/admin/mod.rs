//! Administrator sign-in and the session-gated dashboard.

pub mod credentials;
pub mod pages;
pub mod router;
pub mod session;

pub use credentials::AdminCredentials;
pub use router::{admin_router, AdminState};
pub use session::{AdminPrincipal, InMemorySessionStore, SessionError, SessionStore, SessionToken};
