#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error("Unknown role: {0}")]
    UnknownRole(String),
    #[error("Unknown capability key: {0}")]
    UnknownCapability(String),
    #[error("Request failed: {0}")]
    Api(#[from] crate::http::ApiFailure),
    #[error("Credential storage error: {0}")]
    Storage(#[from] crate::session::StorageError),
    #[error("Configuration error: {0}")]
    Config(String),
}
