use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct AccountsConfig {
    /// Lifetime of a login session.
    pub session_ttl_secs: u64,
    /// How often expired sessions are swept from memory.
    pub purge_interval_secs: u64,
    /// Mark the session cookie `Secure` (HTTPS only).
    pub secure_cookies: bool,
}

impl Default for AccountsConfig {
    fn default() -> Self {
        Self {
            session_ttl_secs: 7 * 24 * 60 * 60,
            purge_interval_secs: 300,
            secure_cookies: false,
        }
    }
}
