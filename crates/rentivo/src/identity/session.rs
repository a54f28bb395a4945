use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::ids::UserId;
use crate::store::RepositoryError;

/// How long a login stays valid when nothing else is configured.
pub(crate) const DEFAULT_SESSION_TTL_MINUTES: i64 = 24 * 60;

#[derive(Debug, Clone, Copy)]
struct Session {
    user_id: UserId,
    expires_at: DateTime<Utc>,
}

/// Opaque bearer tokens issued at login. Each token expires `ttl` after issue, and sessions
/// never outlive the process.
#[derive(Debug)]
pub(crate) struct SessionRegistry {
    ttl: Duration,
    tokens: RwLock<HashMap<String, Session>>,
}

impl SessionRegistry {
    pub(crate) fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            tokens: RwLock::new(HashMap::new()),
        }
    }

    /// Issue a token for `user_id`, dropping any sessions that have already expired.
    pub(crate) fn issue(&self, user_id: UserId) -> Result<String, RepositoryError> {
        let now = Utc::now();
        let token = format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple());
        let mut tokens = self.tokens.write().map_err(poisoned)?;
        tokens.retain(|_, session| session.expires_at > now);
        tokens.insert(
            token.clone(),
            Session {
                user_id,
                expires_at: now + self.ttl,
            },
        );
        Ok(token)
    }

    /// `None` for unknown tokens and for expired ones, which are forgotten on the way out.
    pub(crate) fn lookup(&self, token: &str) -> Result<Option<UserId>, RepositoryError> {
        let now = Utc::now();
        let session = self.tokens.read().map_err(poisoned)?.get(token).copied();
        match session {
            Some(session) if session.expires_at > now => Ok(Some(session.user_id)),
            Some(_) => {
                self.tokens.write().map_err(poisoned)?.remove(token);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.tokens.read().map(|tokens| tokens.len()).unwrap_or_default()
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new(Duration::minutes(DEFAULT_SESSION_TTL_MINUTES))
    }
}

fn poisoned<E>(_: E) -> RepositoryError {
    RepositoryError::Unavailable("session registry poisoned".to_string())
}
