//! Authenticated session: state, persistence and lifecycle.
//!
//! [`SessionStore`] is the only writer. Everything else reads through a
//! [`SessionHandle`].

mod auth_api;
mod error;
mod state;
mod storage;
mod store;

pub use auth_api::{AuthApi, AuthEndpoints};
pub use error::AuthError;
pub use state::{Session, SessionHandle};
pub use storage::{CredentialStorage, FileStorage, MemoryStorage, StorageError, StoredCredentials};
pub use store::SessionStore;
