//! Authentication and session error types.
//!
//! Cache failures never appear here: every component degrades to the
//! persistent-store path instead of surfacing them.

/// Errors that can occur during authentication and session handling.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Email or password was not supplied.
    #[error("Email and password are required")]
    MissingInput,

    /// Unknown email or wrong password. The two cases are deliberately
    /// indistinguishable to callers.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// A profile was required but could not be read from the store.
    #[error("Profile unavailable: {message}")]
    ProfileUnavailable {
        /// Description of the underlying store failure.
        message: String,
    },

    /// The persistent store failed during credential lookup.
    #[error("Storage error: {message}")]
    Storage {
        /// Description of the storage error.
        message: String,
    },

    /// A session token could not be signed or verified.
    #[error("Invalid session token: {message}")]
    Token {
        /// Description of why the token was rejected.
        message: String,
    },

    /// An unexpected internal error occurred.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

impl AuthError {
    /// Creates a new `ProfileUnavailable` error.
    #[must_use]
    pub fn profile_unavailable(message: impl Into<String>) -> Self {
        Self::ProfileUnavailable {
            message: message.into(),
        }
    }

    /// Creates a new `Storage` error.
    #[must_use]
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Creates a new `Token` error.
    #[must_use]
    pub fn token(message: impl Into<String>) -> Self {
        Self::Token {
            message: message.into(),
        }
    }

    /// Creates a new `Internal` error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Stable machine-readable code for the route boundary.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MissingInput => "missing_input",
            Self::InvalidCredentials => "invalid_credentials",
            Self::ProfileUnavailable { .. } => "profile_unavailable",
            Self::Storage { .. } => "storage_error",
            Self::Token { .. } => "invalid_token",
            Self::Internal { .. } => "server_error",
        }
    }

    /// Returns `true` for errors caused by the caller's input rather than
    /// by an unavailable dependency.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::MissingInput | Self::InvalidCredentials | Self::Token { .. }
        )
    }
}
