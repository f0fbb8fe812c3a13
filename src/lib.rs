#![doc = include_str!("../README.md")]

pub mod config;
pub mod console;
pub mod error;
pub mod http;
pub mod interceptor;
pub mod permission;
pub mod router;
pub mod session;
pub mod types;

#[cfg(test)]
mod testing;

// Re-exports for convenient access
pub use config::ConsoleConfig;
pub use console::Console;
pub use error::Error;
pub use http::{ApiClient, ApiFailure, ApiRequest, ApiResponse, FailureKind, Transport};
#[cfg(feature = "http")]
pub use http::ReqwestTransport;
pub use interceptor::{Notifier, NotifyingObserver, SessionInvalidator, TracingNotifier};
pub use permission::{Capability, can_role, can_role_key, capabilities_of};
pub use router::{AuthorizationOutcome, Navigation, NavigationGuard, Navigator, RouteTable};
pub use session::{
    AuthError, CredentialStorage, FileStorage, MemoryStorage, Session, SessionHandle, SessionStore,
};
pub use types::{AccountStatus, Credentials, Role, UserId, UserProfile};
