use super::storage::StorageError;
use crate::http::ApiFailure;

/// Errors from the session lifecycle.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum AuthError {
    /// The credential exchange was rejected or never completed.
    #[error("Login failed: {}", .0.reason())]
    Credential(ApiFailure),

    /// The exchange succeeded but returned no usable access token.
    #[error("Malformed login response: {0}")]
    MalformedResponse(String),

    /// The current-user call failed; the session has been torn down.
    #[error("Profile unavailable: {}", .0.reason())]
    ProfileUnavailable(ApiFailure),

    /// The session could not be persisted; in-memory state is unchanged.
    #[error("Session store error: {0}")]
    Store(#[from] StorageError),
}

impl AuthError {
    /// Message suitable for the login form.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Credential(failure) | Self::ProfileUnavailable(failure) => {
                failure.reason().to_owned()
            }
            Self::MalformedResponse(_) | Self::Store(_) => "登录失败,请稍后重试".to_owned(),
        }
    }
}

impl From<AuthError> for crate::error::Error {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::Credential(failure) | AuthError::ProfileUnavailable(failure) => {
                Self::Api(failure)
            }
            AuthError::Store(storage) => Self::Storage(storage),
            AuthError::MalformedResponse(detail) => Self::Api(ApiFailure::invalid_response(200, detail)),
        }
    }
}
