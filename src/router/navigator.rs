use std::sync::{PoisonError, RwLock};

use super::guard::{AuthorizationOutcome, NavigationGuard};
use super::routes::RouteTable;
use crate::session::SessionHandle;

const MAX_HOPS: usize = 8;

/// Where a navigation attempt ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub requested: String,
    pub landed: String,
    /// Guard decision for the first guarded route on the way.
    pub outcome: AuthorizationOutcome,
    /// Every path the attempt was sent to after `requested`, in order.
    pub redirects: Vec<String>,
}

impl Navigation {
    #[must_use]
    pub fn was_redirected(&self) -> bool {
        !self.redirects.is_empty()
    }
}

/// Applies guard decisions to navigation attempts and tracks the current
/// location.
///
/// Every hop reads the session afresh. A navigation decided while a login
/// is still in flight sees the pre-login session and goes to the login
/// route; that race is accepted and not retried.
pub struct Navigator {
    routes: RouteTable,
    guard: NavigationGuard,
    session: SessionHandle,
    current: RwLock<Option<String>>,
}

impl Navigator {
    #[must_use]
    pub fn new(routes: RouteTable, session: SessionHandle) -> Self {
        let guard = NavigationGuard::new(routes.login_path(), routes.home_path());
        Self {
            routes,
            guard,
            session,
            current: RwLock::new(None),
        }
    }

    #[must_use]
    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    #[must_use]
    pub fn guard(&self) -> NavigationGuard {
        self.guard
    }

    /// The location of the last completed navigation.
    #[must_use]
    pub fn current(&self) -> Option<String> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Attempt to navigate to `path`, following aliases and guard redirects.
    ///
    /// A redirect chain that revisits a path or grows past eight hops
    /// stops at the login route.
    pub fn navigate(&self, path: &str) -> Navigation {
        let from = self.current();
        let mut visited: Vec<String> = Vec::new();
        let mut redirects = Vec::new();
        let mut first_outcome = None;
        let mut next = path.to_owned();

        let landed = loop {
            if visited.contains(&next) || visited.len() >= MAX_HOPS {
                tracing::error!(requested = path, chain = ?visited, "Redirect loop, stopping at login");
                let login = self.routes.login_path().to_owned();
                if next != login {
                    redirects.push(login.clone());
                }
                break login;
            }
            visited.push(next.clone());

            let route = self.routes.resolve(&next);
            if let Some(alias) = route.redirect {
                redirects.push(alias.to_owned());
                next = alias.to_owned();
                continue;
            }

            let outcome = self
                .guard
                .decide(route, from.as_deref(), &self.session.snapshot());
            if first_outcome.is_none() {
                first_outcome = Some(outcome.clone());
            }
            match outcome {
                AuthorizationOutcome::Allow => break next,
                AuthorizationOutcome::RedirectTo(to) => {
                    redirects.push(to.clone());
                    next = to;
                }
            }
        };

        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(landed.clone());

        Navigation {
            requested: path.to_owned(),
            landed,
            outcome: first_outcome
                .unwrap_or_else(|| AuthorizationOutcome::RedirectTo(self.routes.login_path().to_owned())),
            redirects,
        }
    }

    /// Navigation that supersedes whatever the user was doing, such as the
    /// jump to the login route after the session is revoked.
    pub fn force(&self, path: &str) -> Navigation {
        tracing::info!(from = ?self.current(), to = path, "Forced navigation");
        self.navigate(path)
    }
}
