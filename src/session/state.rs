use std::sync::{Arc, PoisonError, RwLock};

use super::storage::StoredCredentials;
use crate::types::{Role, UserProfile};

/// The current identity and credential.
///
/// `token` and `user` are set and cleared together. An empty string means
/// the credential is absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub refresh_token: String,
    pub user: Option<UserProfile>,
}

impl Session {
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn authenticated(
        token: impl Into<String>,
        refresh_token: impl Into<String>,
        user: UserProfile,
    ) -> Self {
        Self {
            token: token.into(),
            refresh_token: refresh_token.into(),
            user: Some(user),
        }
    }

    /// True iff a token is present. Derived on every call.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        !self.token.is_empty()
    }

    /// True iff both the token and the profile are present.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.is_authenticated() && self.user.is_some()
    }

    #[must_use]
    pub fn role(&self) -> Option<Role> {
        self.user.as_ref().map(|user| user.role)
    }

    pub(crate) fn to_stored(&self) -> StoredCredentials {
        StoredCredentials {
            token: non_empty(&self.token),
            refresh_token: non_empty(&self.refresh_token),
            user: self.user.clone(),
        }
    }

    pub(crate) fn from_stored(stored: StoredCredentials) -> Self {
        Self {
            token: stored.token.unwrap_or_default(),
            refresh_token: stored.refresh_token.unwrap_or_default(),
            user: stored.user,
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_owned())
}

/// Read-only view of the process-wide session.
///
/// Cloning shares the same underlying session. Only
/// [`SessionStore`](super::SessionStore) writes through it.
#[derive(Debug, Clone, Default)]
pub struct SessionHandle {
    inner: Arc<RwLock<Session>>,
}

impl SessionHandle {
    /// A fresh, anonymous session cell.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the session as it is right now.
    #[must_use]
    pub fn snapshot(&self) -> Session {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The access token, if any.
    #[must_use]
    pub fn token(&self) -> Option<String> {
        let session = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        non_empty(&session.token)
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_authenticated()
    }

    #[must_use]
    pub fn user(&self) -> Option<UserProfile> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .user
            .clone()
    }

    #[must_use]
    pub fn role(&self) -> Option<Role> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .role()
    }

    /// Swap the whole session in one step.
    pub(crate) fn replace(&self, session: Session) -> Session {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *guard, session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::sample_profile;

    #[test]
    fn anonymous_session_is_not_authenticated() {
        let session = Session::anonymous();
        assert!(!session.is_authenticated());
        assert!(!session.is_complete());
        assert_eq!(session.role(), None);
    }

    #[test]
    fn token_alone_authenticates_but_is_incomplete() {
        let session = Session {
            token: "tok".into(),
            ..Session::default()
        };
        assert!(session.is_authenticated());
        assert!(!session.is_complete());
    }

    #[test]
    fn stored_form_drops_empty_credentials() {
        let session = Session::authenticated("tok", "", sample_profile(Role::Researcher));
        let stored = session.to_stored();
        assert_eq!(stored.token.as_deref(), Some("tok"));
        assert_eq!(stored.refresh_token, None);
        assert_eq!(Session::from_stored(stored), session);
    }

    #[test]
    fn handle_clones_share_state() {
        let handle = SessionHandle::new();
        let reader = handle.clone();
        handle.replace(Session::authenticated(
            "tok",
            "ref",
            sample_profile(Role::ParkManager),
        ));
        assert!(reader.is_authenticated());
        assert_eq!(reader.token().as_deref(), Some("tok"));
        assert_eq!(reader.role(), Some(Role::ParkManager));
    }
}
