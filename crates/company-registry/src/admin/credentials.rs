use std::fmt;

use crate::config::AdminConfig;

use super::session::{AdminPrincipal, SessionError};

/// Fixed administrator credential pair loaded from configuration.
#[derive(Clone)]
pub struct AdminCredentials {
    username: String,
    password: String,
}

impl AdminCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn from_config(config: &AdminConfig) -> Self {
        Self::new(config.username.clone(), config.password.clone())
    }

    /// Exact match on both fields.
    pub fn authenticate(&self, username: &str, password: &str) -> Result<AdminPrincipal, SessionError> {
        if username == self.username && password == self.password {
            Ok(AdminPrincipal {
                username: self.username.clone(),
            })
        } else {
            Err(SessionError::AuthFailure)
        }
    }
}

impl fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminCredentials")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}
