use std::sync::Arc;

use super::auth_api::AuthEndpoints;
use super::error::AuthError;
use super::state::{Session, SessionHandle};
use super::storage::{CredentialStorage, StoredCredentials};
use crate::types::{Credentials, Role, UserProfile};

/// Owner of the process-wide session.
///
/// `login`, `logout`, `fetch_user_info` and `invalidate` are the only ways
/// the session changes. The token, refresh token and profile are committed
/// together, in memory only after the persisted record has been written.
///
/// Network calls are the only suspension points. Until a call resolves,
/// readers see the session as it was before the call.
pub struct SessionStore {
    session: SessionHandle,
    storage: Arc<dyn CredentialStorage>,
    auth: Arc<dyn AuthEndpoints>,
}

impl SessionStore {
    /// Load the persisted session into `session`.
    ///
    /// Only a record with both a token and a profile is trusted. Anything
    /// else, including an unreadable record, is cleared and the session
    /// starts anonymous. No network call is made.
    pub fn restore(
        session: SessionHandle,
        storage: Arc<dyn CredentialStorage>,
        auth: Arc<dyn AuthEndpoints>,
    ) -> Self {
        let store = Self {
            session,
            storage,
            auth,
        };

        let restored = match store.storage.load() {
            Ok(record) if record.is_empty() => Session::anonymous(),
            Ok(record) => {
                let candidate = Session::from_stored(record);
                if candidate.is_complete() {
                    candidate
                } else {
                    tracing::warn!("Discarding incomplete persisted session");
                    store.clear_storage();
                    Session::anonymous()
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Discarding unreadable persisted session");
                store.clear_storage();
                Session::anonymous()
            }
        };

        if let Some(user) = &restored.user {
            tracing::info!(user_id = %user.user_id, role = %user.role, "Restored persisted session");
        }
        store.session.replace(restored);
        store
    }

    /// Read-only view for the client, the guard and anything else that
    /// needs to observe the session.
    #[must_use]
    pub fn handle(&self) -> SessionHandle {
        self.session.clone()
    }

    #[must_use]
    pub fn snapshot(&self) -> Session {
        self.session.snapshot()
    }

    /// True iff a token is present, read fresh each call.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    /// Local consistency check: token and profile both present.
    #[must_use]
    pub fn check_auth(&self) -> bool {
        self.session.snapshot().is_complete()
    }

    #[must_use]
    pub fn user(&self) -> Option<UserProfile> {
        self.session.user()
    }

    #[must_use]
    pub fn role(&self) -> Option<Role> {
        self.session.role()
    }

    /// Exchange credentials for a session.
    ///
    /// # Errors
    ///
    /// - [`AuthError::Credential`] if the exchange is rejected or unreachable.
    /// - [`AuthError::MalformedResponse`] if no access token came back.
    /// - [`AuthError::Store`] if the record could not be persisted.
    ///
    /// In every error case the session is left as it was.
    pub async fn login(&self, credentials: &Credentials) -> Result<(), AuthError> {
        let response = self.auth.login(credentials).await.map_err(|failure| {
            tracing::warn!(
                username = %credentials.username,
                kind = ?failure.kind,
                reason = %failure.reason(),
                "Login rejected"
            );
            AuthError::Credential(failure)
        })?;

        if response.access.is_empty() {
            return Err(AuthError::MalformedResponse("empty access token".into()));
        }

        let session = Session::authenticated(response.access, response.refresh, response.user);
        self.storage.save(&session.to_stored()).map_err(|e| {
            tracing::error!(error = %e, "Failed to persist session after login");
            AuthError::Store(e)
        })?;

        let user_id = user_id_of(&session);
        let role = session.role();
        self.session.replace(session);
        tracing::info!(user_id = %user_id, role = ?role, "Login successful");
        Ok(())
    }

    /// End the session.
    ///
    /// The remote logout is best effort. Local cleanup always runs, even if
    /// the call fails, times out, or this future is dropped mid-flight.
    pub async fn logout(&self) {
        let _cleanup = InvalidateOnDrop(self);
        if let Err(failure) = self.auth.logout().await {
            tracing::warn!(
                kind = ?failure.kind,
                reason = %failure.reason(),
                "Remote logout failed, clearing local session anyway"
            );
        }
    }

    /// Refresh the profile from the server.
    ///
    /// # Errors
    ///
    /// - [`AuthError::ProfileUnavailable`] if the call fails. The session has
    ///   been logged out by the time this is returned, unless it was
    ///   replaced while the call was in flight; a replaced session is left
    ///   alone.
    /// - [`AuthError::Store`] if the refreshed profile could not be
    ///   persisted. The previous profile stays in place.
    pub async fn fetch_user_info(&self) -> Result<(), AuthError> {
        let token_before = self.session.token();

        let user = match self.auth.current_user().await {
            Ok(user) => user,
            Err(failure) if self.session.token() != token_before => {
                tracing::warn!(
                    kind = ?failure.kind,
                    reason = %failure.reason(),
                    "Profile fetch failed after the session changed, keeping current session"
                );
                return Err(AuthError::ProfileUnavailable(failure));
            }
            Err(failure) => {
                tracing::warn!(
                    kind = ?failure.kind,
                    reason = %failure.reason(),
                    "Failed to fetch current user, logging out"
                );
                self.logout().await;
                return Err(AuthError::ProfileUnavailable(failure));
            }
        };

        let mut next = self.session.snapshot();
        if !next.is_authenticated() || self.session.token() != token_before {
            tracing::warn!("Session changed while fetching profile, discarding result");
            return Ok(());
        }

        next.user = Some(user);
        self.storage.save(&next.to_stored()).map_err(|e| {
            tracing::error!(error = %e, "Failed to persist refreshed profile");
            AuthError::Store(e)
        })?;
        self.session.replace(next);
        tracing::debug!("Profile refreshed");
        Ok(())
    }

    /// Tear the session down locally without contacting the server.
    ///
    /// This is the cleanup half of [`logout`](Self::logout), used when the
    /// server has already declared the credential invalid.
    ///
    /// Memory is always cleared. If the storage refuses both the clear and
    /// the empty-record overwrite, the old record stays on disk and the
    /// next [`restore`](Self::restore) brings it back; that case is logged
    /// at `error` with the affected user.
    pub fn invalidate(&self) {
        let previous = self.session.replace(Session::anonymous());
        let user_id = user_id_of(&previous);
        if self.clear_storage() {
            if previous.user.is_some() {
                tracing::info!(user_id = %user_id, "Session cleared");
            }
        } else {
            tracing::error!(
                user_id = %user_id,
                "Session cleared in memory only, persisted record will be restored on next start"
            );
        }
    }

    /// Returns `false` if the persisted record could be neither removed nor
    /// overwritten.
    fn clear_storage(&self) -> bool {
        let Err(e) = self.storage.clear() else {
            return true;
        };
        tracing::error!(error = %e, "Failed to clear persisted session, overwriting with empty record");
        match self.storage.save(&StoredCredentials::default()) {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(error = %e, "Persisted session could not be cleared");
                false
            }
        }
    }
}

struct InvalidateOnDrop<'a>(&'a SessionStore);

impl Drop for InvalidateOnDrop<'_> {
    fn drop(&mut self) {
        self.0.invalidate();
    }
}

fn user_id_of(session: &Session) -> String {
    session
        .user
        .as_ref()
        .map(|user| user.user_id.to_string())
        .unwrap_or_default()
}
