use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::contract::model::SessionUser;
use crate::domain::{
    error::AccountsError,
    password::{hash_password, verify_password, verify_unknown_account},
    sessions::SessionStore,
};
use crate::infra::storage::UsersRepo;

/// Emails are compared trimmed and lower-cased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// A session opened by signup or login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub user: SessionUser,
    pub token: String,
}

pub struct Service {
    repo: UsersRepo,
    sessions: Arc<SessionStore>,
    secure_cookies: bool,
}

impl Service {
    pub fn new(repo: UsersRepo, sessions: Arc<SessionStore>, secure_cookies: bool) -> Self {
        Self {
            repo,
            sessions,
            secure_cookies,
        }
    }

    pub fn secure_cookies(&self) -> bool {
        self.secure_cookies
    }

    /// Register a user and log them in.
    #[instrument(skip(self, password))]
    pub async fn signup(&self, email: &str, password: &str) -> Result<LoginOutcome, AccountsError> {
        let email = normalize_email(email);
        if email.is_empty() || password.is_empty() {
            return Err(AccountsError::MissingCredentials);
        }

        let password = password.to_owned();
        let hash = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|e| AccountsError::hashing(e.to_string()))??;

        let id = match self.repo.insert(&email, &hash).await {
            Ok(id) => id,
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                debug!(%email, "signup rejected: email taken");
                return Err(AccountsError::email_already_exists(email));
            }
            Err(e) => return Err(e.into()),
        };

        info!(user_id = id, "user signed up");
        Ok(self.open_session(SessionUser { id, email }))
    }

    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, AccountsError> {
        let email = normalize_email(email);
        if email.is_empty() || password.is_empty() {
            return Err(AccountsError::MissingCredentials);
        }

        let row = self.repo.find_by_email(&email).await?;

        // Unknown emails still run one Argon2 verification.
        let password = password.to_owned();
        let stored = row.as_ref().map(|r| r.password.clone());
        let ok = tokio::task::spawn_blocking(move || match stored {
            Some(hash) => verify_password(&password, &hash),
            None => Ok(verify_unknown_account(&password)),
        })
        .await
        .map_err(|e| AccountsError::hashing(e.to_string()))??;
        let Some(row) = row.filter(|_| ok) else {
            return Err(AccountsError::InvalidCredentials);
        };

        info!(user_id = row.id, "user logged in");
        Ok(self.open_session(SessionUser {
            id: row.id,
            email: row.email,
        }))
    }

    pub fn logout(&self, token: &str) -> bool {
        self.sessions.revoke(token)
    }

    pub fn resolve_session(&self, token: &str) -> Option<SessionUser> {
        self.sessions.resolve(token)
    }

    pub fn purge_expired_sessions(&self) -> usize {
        self.sessions.purge_expired()
    }

    fn open_session(&self, user: SessionUser) -> LoginOutcome {
        let token = self.sessions.create(user.clone());
        LoginOutcome { user, token }
    }
}
