//! Effectful handlers for classified request failures.
//!
//! Classification lives in [`crate::http::classify`]; the observers here
//! only act on its result, so each can be tested on its own.

use std::sync::{Arc, Weak};

use crate::http::{ApiFailure, FailureKind, ResponseObserver};
use crate::router::Navigator;
use crate::session::SessionStore;

/// Shows failure messages to the user.
pub trait Notifier: Send + Sync {
    fn notify(&self, failure: &ApiFailure);
}

/// [`Notifier`] that writes messages to the `tracing` log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, failure: &ApiFailure) {
        tracing::warn!(
            kind = ?failure.kind,
            status = ?failure.status,
            detail = failure.detail.as_deref().unwrap_or(""),
            "{}",
            failure.message
        );
    }
}

/// Tears the session down when the server rejects the credential.
///
/// On [`FailureKind::SessionExpired`] it runs the store's local cleanup
/// (no remote logout) and forces navigation to the login route. Every
/// other failure is ignored. The store is held weakly because the store's
/// own endpoints send through the client this observer is attached to.
pub struct SessionInvalidator {
    session: Weak<SessionStore>,
    navigator: Arc<Navigator>,
}

impl SessionInvalidator {
    #[must_use]
    pub fn new(session: &Arc<SessionStore>, navigator: Arc<Navigator>) -> Self {
        Self {
            session: Arc::downgrade(session),
            navigator,
        }
    }
}

impl ResponseObserver for SessionInvalidator {
    fn on_failure(&self, failure: &ApiFailure) {
        if failure.kind != FailureKind::SessionExpired {
            return;
        }
        match self.session.upgrade() {
            Some(store) => store.invalidate(),
            None => tracing::warn!("Session store dropped before invalidation"),
        }
        let login = self.navigator.routes().login_path();
        self.navigator.force(login);
    }
}

/// Forwards every failure to a [`Notifier`]. Never touches the session.
pub struct NotifyingObserver {
    notifier: Arc<dyn Notifier>,
}

impl NotifyingObserver {
    #[must_use]
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self { notifier }
    }
}

impl ResponseObserver for NotifyingObserver {
    fn on_failure(&self, failure: &ApiFailure) {
        self.notifier.notify(failure);
    }
}
