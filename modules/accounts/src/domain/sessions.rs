use dashmap::DashMap;
use std::time::{Duration, Instant};

use crate::contract::model::SessionUser;

const TOKEN_LEN: usize = 32;

/// Upper bound for the configured TTL.
pub const MAX_TTL: Duration = Duration::from_secs(365 * 24 * 60 * 60);

struct Session {
    user: SessionUser,
    expires_at: Instant,
}

/// In-memory session table keyed by opaque random tokens.
pub struct SessionStore {
    sessions: DashMap<String, Session>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        if ttl > MAX_TTL {
            tracing::warn!(ttl_secs = ttl.as_secs(), "session ttl capped to one year");
        }
        Self {
            sessions: DashMap::new(),
            ttl: ttl.min(MAX_TTL),
        }
    }

    /// Open a session and return its token.
    pub fn create(&self, user: SessionUser) -> String {
        let token = nanoid::nanoid!(TOKEN_LEN);
        let now = Instant::now();
        let expires_at = now
            .checked_add(self.ttl)
            .or_else(|| now.checked_add(MAX_TTL))
            .unwrap_or(now);
        self.sessions.insert(token.clone(), Session { user, expires_at });
        token
    }

    /// Expired entries are dropped on lookup.
    pub fn resolve(&self, token: &str) -> Option<SessionUser> {
        let now = Instant::now();
        let user = {
            let entry = self.sessions.get(token)?;
            (entry.expires_at > now).then(|| entry.user.clone())
        };
        if user.is_none() {
            self.sessions.remove(token);
        }
        user
    }

    pub fn revoke(&self, token: &str) -> bool {
        self.sessions.remove(token).is_some()
    }

    /// Drop every expired session; returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.sessions.len();
        self.sessions.retain(|_, s| s.expires_at > now);
        before.saturating_sub(self.sessions.len())
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
