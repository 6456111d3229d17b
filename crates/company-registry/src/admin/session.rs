use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// Opaque credential issued at login.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SessionToken(pub String);

impl SessionToken {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(<redacted>)")
    }
}

/// Authenticated administrator identity attached to a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdminPrincipal {
    pub username: String,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("invalid credentials")]
    AuthFailure,
    #[error("session store unavailable: {0}")]
    Unavailable(String),
}

/// Token to principal mapping injected into the admin routes.
pub trait SessionStore: Send + Sync {
    fn issue(&self, principal: AdminPrincipal) -> Result<SessionToken, SessionError>;
    /// Expired sessions resolve to `None` and are dropped.
    fn resolve(&self, token: &SessionToken) -> Result<Option<AdminPrincipal>, SessionError>;
    fn revoke(&self, token: &SessionToken) -> Result<bool, SessionError>;
    fn purge_expired(&self) -> Result<usize, SessionError>;
}

#[derive(Debug, Clone)]
struct SessionEntry {
    principal: AdminPrincipal,
    expires_at: DateTime<Utc>,
}

/// Session map with a fixed time-to-live per entry.
#[derive(Debug)]
pub struct InMemorySessionStore {
    ttl: Duration,
    entries: Mutex<HashMap<SessionToken, SessionEntry>>,
}

impl InMemorySessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn entries(&self) -> Result<MutexGuard<'_, HashMap<SessionToken, SessionEntry>>, SessionError> {
        self.entries
            .lock()
            .map_err(|_| SessionError::Unavailable("session mutex poisoned".to_string()))
    }

    pub fn issue_at(
        &self,
        principal: AdminPrincipal,
        now: DateTime<Utc>,
    ) -> Result<SessionToken, SessionError> {
        let token = SessionToken::generate();
        let entry = SessionEntry {
            principal,
            expires_at: now
                .checked_add_signed(self.ttl)
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
        };
        self.entries()?.insert(token.clone(), entry);
        Ok(token)
    }

    pub fn resolve_at(
        &self,
        token: &SessionToken,
        now: DateTime<Utc>,
    ) -> Result<Option<AdminPrincipal>, SessionError> {
        let mut entries = self.entries()?;
        let expired = match entries.get(token) {
            Some(entry) if entry.expires_at > now => return Ok(Some(entry.principal.clone())),
            Some(_) => true,
            None => false,
        };
        if expired {
            entries.remove(token);
        }
        Ok(None)
    }

    pub fn purge_expired_at(&self, now: DateTime<Utc>) -> Result<usize, SessionError> {
        let mut entries = self.entries()?;
        let before = entries.len();
        entries.retain(|_, entry| entry.expires_at > now);
        Ok(before - entries.len())
    }

    pub fn active_sessions(&self) -> usize {
        self.entries().map(|entries| entries.len()).unwrap_or_default()
    }
}

impl SessionStore for InMemorySessionStore {
    fn issue(&self, principal: AdminPrincipal) -> Result<SessionToken, SessionError> {
        self.issue_at(principal, Utc::now())
    }

    fn resolve(&self, token: &SessionToken) -> Result<Option<AdminPrincipal>, SessionError> {
        self.resolve_at(token, Utc::now())
    }

    fn revoke(&self, token: &SessionToken) -> Result<bool, SessionError> {
        Ok(self.entries()?.remove(token).is_some())
    }

    fn purge_expired(&self) -> Result<usize, SessionError> {
        self.purge_expired_at(Utc::now())
    }
}
