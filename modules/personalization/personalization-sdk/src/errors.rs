//! Error types for the personalization SDK.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PreferencesError {
    #[error("Preference service unavailable: {message}")]
    Unavailable { message: String },

    #[error("Not authorized to access preferences")]
    Unauthorized,

    #[error("Preference service rejected the request (HTTP {status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Invalid preference service response: {message}")]
    InvalidResponse { message: String },

    #[error("Internal error")]
    Internal,
}

impl PreferencesError {
    #[must_use]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn internal() -> Self {
        Self::Internal
    }

    /// Whether the failure means the server could not be reached at all.
    #[must_use]
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }
}
