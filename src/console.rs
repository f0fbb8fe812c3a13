//! Top-level controller wiring the session into the client, the guard and
//! the response observers.

use std::sync::Arc;

#[cfg(feature = "http")]
use crate::config::ConsoleConfig;
#[cfg(feature = "http")]
use crate::error::Error;
use crate::http::{ApiClient, Transport};
use crate::interceptor::{Notifier, NotifyingObserver, SessionInvalidator};
#[cfg(feature = "http")]
use crate::interceptor::TracingNotifier;
use crate::permission::{self, Capability};
use crate::router::{Navigation, Navigator, RouteTable};
use crate::session::{AuthApi, AuthError, CredentialStorage, SessionHandle, SessionStore};
use crate::types::Credentials;

/// The console's single session, client and router.
///
/// Constructing a `Console` restores the persisted session, subscribes a
/// [`SessionInvalidator`] and a [`NotifyingObserver`] (in that order) to the
/// client, and shares one [`SessionHandle`] between the client and the
/// navigator.
pub struct Console {
    client: Arc<ApiClient>,
    session: Arc<SessionStore>,
    navigator: Arc<Navigator>,
    refresh_profile_on_start: bool,
}

impl Console {
    #[must_use]
    pub fn new(
        transport: Arc<dyn Transport>,
        storage: Arc<dyn CredentialStorage>,
        notifier: Arc<dyn Notifier>,
        routes: RouteTable,
    ) -> Self {
        let handle = SessionHandle::new();
        let client = Arc::new(ApiClient::new(transport, handle.clone()));
        let auth = Arc::new(AuthApi::new(client.clone()));
        let session = Arc::new(SessionStore::restore(handle.clone(), storage, auth));
        let navigator = Arc::new(Navigator::new(routes, handle));

        client.subscribe(Arc::new(SessionInvalidator::new(&session, navigator.clone())));
        client.subscribe(Arc::new(NotifyingObserver::new(notifier)));

        Self {
            client,
            session,
            navigator,
            refresh_profile_on_start: false,
        }
    }

    /// Build from configuration with the HTTP transport, file storage,
    /// log notifications and the standard route table.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the HTTP client cannot be built.
    #[cfg(feature = "http")]
    pub fn from_config(config: &ConsoleConfig) -> Result<Self, Error> {
        let transport = crate::http::ReqwestTransport::new(
            config.api_base_url().clone(),
            config.request_timeout(),
        )?;
        let storage = crate::session::FileStorage::new(config.credentials_path());
        Ok(Self::new(
            Arc::new(transport),
            Arc::new(storage),
            Arc::new(TracingNotifier),
            RouteTable::standard(),
        )
        .with_refresh_profile_on_start(config.refresh_profile_on_start()))
    }

    #[must_use]
    pub fn with_refresh_profile_on_start(mut self, refresh: bool) -> Self {
        self.refresh_profile_on_start = refresh;
        self
    }

    #[must_use]
    pub fn client(&self) -> &Arc<ApiClient> {
        &self.client
    }

    #[must_use]
    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    #[must_use]
    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    /// Initial navigation. Optionally re-fetches the profile of a restored
    /// session first; a failed fetch logs the session out.
    pub async fn start(&self) -> Navigation {
        if self.refresh_profile_on_start && self.session.check_auth() {
            if let Err(e) = self.session.fetch_user_info().await {
                tracing::warn!(error = %e, "Restored session rejected on start");
            }
        }
        let target = self.navigator.current().unwrap_or_else(|| "/".to_owned());
        self.navigator.navigate(&target)
    }

    pub fn navigate(&self, path: &str) -> Navigation {
        self.navigator.navigate(path)
    }

    /// Whether the signed-in user may perform `capability`.
    #[must_use]
    pub fn can(&self, capability: Capability) -> bool {
        permission::can_role(self.session.role(), capability)
    }

    /// Log in and go to the home route.
    ///
    /// # Errors
    ///
    /// See [`SessionStore::login`]. The current location is unchanged on
    /// error, except where a `401` forced the login route.
    pub async fn login(&self, credentials: &Credentials) -> Result<Navigation, AuthError> {
        self.session.login(credentials).await?;
        Ok(self.navigator.navigate(self.navigator.routes().home_path()))
    }

    /// Log out and go to the login route.
    pub async fn logout(&self) -> Navigation {
        self.session.logout().await;
        self.navigator.navigate(self.navigator.routes().login_path())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::http::{ApiRequest, FailureKind, Method, TransportError};
    use crate::router::{HOME_PATH, LOGIN_PATH};
    use crate::session::{MemoryStorage, StoredCredentials};
    use crate::testing::{FakeTransport, RecordingNotifier, profile_json, sample_profile};
    use crate::types::Role;

    struct Harness {
        transport: Arc<FakeTransport>,
        storage: Arc<MemoryStorage>,
        notifier: Arc<RecordingNotifier>,
        console: Console,
    }

    fn harness_with(record: StoredCredentials) -> Harness {
        let transport = Arc::new(FakeTransport::new());
        let storage = Arc::new(MemoryStorage::with_record(record));
        let notifier = Arc::new(RecordingNotifier::default());
        let console = Console::new(
            transport.clone(),
            storage.clone(),
            notifier.clone(),
            RouteTable::standard(),
        );
        Harness {
            transport,
            storage,
            notifier,
            console,
        }
    }

    fn harness() -> Harness {
        harness_with(StoredCredentials::default())
    }

    fn signed_in_record(role: Role) -> StoredCredentials {
        StoredCredentials {
            token: Some("stored".into()),
            refresh_token: Some("stored-refresh".into()),
            user: Some(sample_profile(role)),
        }
    }

    fn script_login(transport: &FakeTransport, role: Role) {
        transport.respond(
            Method::Post,
            "auth/login/",
            200,
            json!({"access": "fresh", "refresh": "fresh-refresh", "user": profile_json(role)}),
        );
    }

    #[tokio::test]
    async fn anonymous_start_lands_on_login() {
        let h = harness();
        let nav = h.console.start().await;
        assert_eq!(nav.landed, LOGIN_PATH);
    }

    #[tokio::test]
    async fn restored_session_starts_on_dashboard() {
        let h = harness_with(signed_in_record(Role::DataAnalyst));
        let nav = h.console.start().await;
        assert_eq!(nav.landed, HOME_PATH);
        assert!(h.transport.requests().is_empty());
    }

    #[tokio::test]
    async fn administrator_login_opens_admin_pages() {
        let h = harness();
        script_login(&h.transport, Role::SystemAdministrator);

        let nav = h
            .console
            .login(&Credentials::new("admin", "pw"))
            .await
            .unwrap();

        assert_eq!(nav.landed, HOME_PATH);
        assert!(h.console.can(Capability::SystemUserCreate));
        assert_eq!(h.console.navigate("/system/users").landed, "/system/users");
        assert_eq!(h.storage.record().token.as_deref(), Some("fresh"));
    }

    #[tokio::test]
    async fn visitor_is_kept_out_of_admin_pages() {
        let h = harness();
        script_login(&h.transport, Role::Visitor);
        h.console
            .login(&Credentials::new("guest", "pw"))
            .await
            .unwrap();

        assert!(!h.console.can(Capability::SystemUserCreate));
        assert!(h.console.can(Capability::VisitorReservationCreate));
        assert_eq!(h.console.navigate("/system/users").landed, HOME_PATH);
        assert_eq!(
            h.console.navigate("/visitor/reservation").landed,
            "/visitor/reservation"
        );
    }

    #[tokio::test]
    async fn requests_after_login_carry_the_new_token() {
        let h = harness();
        script_login(&h.transport, Role::Researcher);
        h.transport
            .respond(Method::Get, "research/projects/", 200, json!([]));

        h.console
            .login(&Credentials::new("r", "pw"))
            .await
            .unwrap();
        h.console
            .client()
            .send(ApiRequest::get("research/projects/"))
            .await
            .unwrap();

        let requests = h.transport.requests();
        assert_eq!(requests[0].bearer, None);
        assert_eq!(requests[1].bearer.as_deref(), Some("fresh"));
    }

    #[tokio::test]
    async fn unauthorized_response_anywhere_ends_the_session() {
        let h = harness_with(signed_in_record(Role::ParkManager));
        h.console.start().await;
        h.console.navigate("/visitor/traffic");
        h.transport
            .respond(Method::Get, "visitor/traffic/", 401, json!({"detail": "Token expired"}));

        let failure = h
            .console
            .client()
            .send(ApiRequest::get("visitor/traffic/"))
            .await
            .unwrap_err();

        assert_eq!(failure.kind, FailureKind::SessionExpired);
        assert!(!h.console.session().is_authenticated());
        assert!(h.storage.record().is_empty());
        assert_eq!(h.console.navigator().current().as_deref(), Some(LOGIN_PATH));
        assert_eq!(h.notifier.messages(), vec!["登录已过期,请重新登录".to_owned()]);
    }

    #[tokio::test]
    async fn other_failures_only_notify() {
        let h = harness_with(signed_in_record(Role::ParkManager));
        h.console.start().await;
        h.transport.respond(Method::Get, "a/", 403, json!({}));
        h.transport.respond(Method::Get, "b/", 404, json!({}));
        h.transport.respond(Method::Get, "c/", 500, json!({}));
        h.transport
            .fail(Method::Get, "d/", TransportError::NoResponse("offline".into()));
        h.transport
            .respond(Method::Get, "e/", 400, json!({"detail": "参数错误"}));

        for path in ["a/", "b/", "c/", "d/", "e/"] {
            let _ = h.console.client().send(ApiRequest::get(path)).await;
        }

        assert!(h.console.session().check_auth());
        assert_eq!(h.console.navigator().current().as_deref(), Some(HOME_PATH));
        assert_eq!(
            h.notifier.messages(),
            vec![
                "没有权限访问该资源".to_owned(),
                "请求的资源不存在".to_owned(),
                "服务器错误,请稍后重试".to_owned(),
                "网络错误,请检查网络连接".to_owned(),
                "参数错误".to_owned(),
            ]
        );
    }

    #[tokio::test]
    async fn rejected_login_keeps_anonymous_session() {
        let h = harness();
        h.console.start().await;
        h.transport
            .respond(Method::Post, "auth/login/", 401, json!({"detail": "密码错误"}));

        let err = h
            .console
            .login(&Credentials::new("admin", "wrong"))
            .await
            .unwrap_err();

        assert_eq!(err.user_message(), "密码错误");
        assert!(!h.console.session().is_authenticated());
        assert!(h.storage.record().is_empty());
        assert_eq!(h.console.navigator().current().as_deref(), Some(LOGIN_PATH));
    }

    #[tokio::test]
    async fn offline_logout_still_signs_out() {
        let h = harness_with(signed_in_record(Role::Technician));
        h.console.start().await;
        h.transport.fail(
            Method::Post,
            "auth/logout/",
            TransportError::NoResponse("timed out".into()),
        );

        let nav = h.console.logout().await;

        assert_eq!(nav.landed, LOGIN_PATH);
        assert!(!h.console.session().is_authenticated());
        assert!(h.storage.record().is_empty());
        assert!(!h.console.can(Capability::EnvironmentDataCreate));
    }

    #[tokio::test]
    async fn start_refresh_rejected_by_server_signs_out() {
        let h = harness_with(signed_in_record(Role::LawEnforcer));
        let console = Console::new(
            h.transport.clone(),
            h.storage.clone(),
            h.notifier.clone(),
            RouteTable::standard(),
        )
        .with_refresh_profile_on_start(true);
        h.transport
            .respond(Method::Get, "auth/current-user/", 401, json!({"detail": "无效token"}));

        let nav = console.start().await;

        assert_eq!(nav.landed, LOGIN_PATH);
        assert!(!console.session().is_authenticated());
        assert!(h.storage.record().is_empty());
    }

    #[tokio::test]
    async fn start_refresh_updates_profile() {
        let h = harness_with(signed_in_record(Role::Visitor));
        let console = Console::new(
            h.transport.clone(),
            h.storage.clone(),
            h.notifier.clone(),
            RouteTable::standard(),
        )
        .with_refresh_profile_on_start(true);
        h.transport.respond(
            Method::Get,
            "auth/current-user/",
            200,
            profile_json(Role::ParkManager),
        );

        console.start().await;

        assert_eq!(console.session().role(), Some(Role::ParkManager));
        assert!(console.can(Capability::VisitorTrafficEdit));
        assert_eq!(
            h.transport.requests()[0].bearer.as_deref(),
            Some("stored")
        );
    }
}
