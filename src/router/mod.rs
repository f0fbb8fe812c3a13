//! Route table and navigation gating.

mod guard;
mod navigator;
mod routes;

pub use guard::{AuthorizationOutcome, NavigationGuard};
pub use navigator::{Navigation, Navigator};
pub use routes::{HOME_PATH, LOGIN_PATH, RouteDescriptor, RouteTable};
