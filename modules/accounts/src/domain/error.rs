use thiserror::Error;

#[derive(Error, Debug)]
pub enum AccountsError {
    #[error("Email and password are required")]
    MissingCredentials,

    #[error("Email already exists")]
    EmailAlreadyExists { email: String },

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Password hashing failed: {message}")]
    Hashing { message: String },

    #[error("Database error: {message}")]
    Database { message: String },
}

impl AccountsError {
    pub fn email_already_exists(email: impl Into<String>) -> Self {
        Self::EmailAlreadyExists {
            email: email.into(),
        }
    }

    pub fn hashing(message: impl Into<String>) -> Self {
        Self::Hashing {
            message: message.into(),
        }
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }
}

impl From<sqlx::Error> for AccountsError {
    fn from(e: sqlx::Error) -> Self {
        Self::database(e.to_string())
    }
}
