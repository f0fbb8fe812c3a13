//! Test doubles shared by the unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value as JsonValue, json};

use crate::http::{ApiFailure, ApiRequest, ApiResponse, Method, Transport, TransportError};
use crate::interceptor::Notifier;
use crate::session::AuthEndpoints;
use crate::types::{Credentials, LoginResponse, Role, UserProfile};

pub(crate) fn sample_profile(role: Role) -> UserProfile {
    UserProfile::new(
        format!("U-{}", role as u8),
        format!("user{}", role as u8),
        role.as_str(),
        role,
    )
}

pub(crate) fn profile_json(role: Role) -> JsonValue {
    serde_json::to_value(sample_profile(role)).expect("profile serializes")
}

type Scripted = Result<ApiResponse, TransportError>;

/// Scripted [`Transport`]: responses are queued per method and path.
///
/// The last scripted response for a route repeats; unscripted routes
/// answer `404`.
#[derive(Default)]
pub(crate) struct FakeTransport {
    routes: Mutex<HashMap<(Method, String), VecDeque<Scripted>>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl FakeTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn respond(&self, method: Method, path: &str, status: u16, body: JsonValue) {
        self.script(method, path, Ok(ApiResponse::new(status, body)));
    }

    pub(crate) fn fail(&self, method: Method, path: &str, error: TransportError) {
        self.script(method, path, Err(error));
    }

    pub(crate) fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn script(&self, method: Method, path: &str, outcome: Scripted) {
        self.routes
            .lock()
            .unwrap()
            .entry((method, path.to_owned()))
            .or_default()
            .push_back(outcome);
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let key = (request.method, request.path.clone());
        self.requests.lock().unwrap().push(request);

        let mut routes = self.routes.lock().unwrap();
        match routes.get_mut(&key) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap(),
            Some(queue) if !queue.is_empty() => queue[0].clone(),
            _ => Ok(ApiResponse::new(404, json!({"detail": "Not found."}))),
        }
    }
}

fn failure(status: u16, detail: &str) -> ApiFailure {
    ApiFailure::from_response(&ApiResponse::new(status, json!({ "detail": detail })))
}

#[derive(Clone, Copy)]
enum LogoutBehaviour {
    Succeed,
    Fail,
    Hang,
}

/// Scripted [`AuthEndpoints`] for exercising the session store directly.
pub(crate) struct ScriptedAuth {
    login: Mutex<Result<LoginResponse, ApiFailure>>,
    login_delay: Mutex<Option<Duration>>,
    current_user: Mutex<Result<UserProfile, ApiFailure>>,
    logout: Mutex<LogoutBehaviour>,
    logout_calls: AtomicUsize,
}

impl ScriptedAuth {
    pub(crate) fn new() -> Self {
        Self {
            login: Mutex::new(Err(failure(400, "login not scripted"))),
            login_delay: Mutex::new(None),
            current_user: Mutex::new(Err(failure(401, "current user not scripted"))),
            logout: Mutex::new(LogoutBehaviour::Succeed),
            logout_calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn accept_login(&self, access: &str, refresh: &str, user: UserProfile) {
        *self.login.lock().unwrap() = Ok(LoginResponse {
            access: access.to_owned(),
            refresh: refresh.to_owned(),
            user,
        });
    }

    pub(crate) fn reject_login(&self, status: u16, detail: &str) {
        *self.login.lock().unwrap() = Err(failure(status, detail));
    }

    /// Hold every login for `delay` (on the tokio clock) before answering.
    pub(crate) fn delay_login(&self, delay: Duration) {
        *self.login_delay.lock().unwrap() = Some(delay);
    }

    pub(crate) fn serve_current_user(&self, user: UserProfile) {
        *self.current_user.lock().unwrap() = Ok(user);
    }

    pub(crate) fn fail_current_user(&self, status: u16) {
        *self.current_user.lock().unwrap() = Err(failure(status, "current user failed"));
    }

    pub(crate) fn fail_logout(&self) {
        *self.logout.lock().unwrap() = LogoutBehaviour::Fail;
    }

    pub(crate) fn hang_logout(&self) {
        *self.logout.lock().unwrap() = LogoutBehaviour::Hang;
    }

    pub(crate) fn logout_calls(&self) -> usize {
        self.logout_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AuthEndpoints for ScriptedAuth {
    async fn login(&self, _credentials: &Credentials) -> Result<LoginResponse, ApiFailure> {
        let delay = *self.login_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.login.lock().unwrap().clone()
    }

    async fn logout(&self) -> Result<(), ApiFailure> {
        self.logout_calls.fetch_add(1, Ordering::SeqCst);
        let behaviour = *self.logout.lock().unwrap();
        match behaviour {
            LogoutBehaviour::Succeed => Ok(()),
            LogoutBehaviour::Fail => Err(ApiFailure::from_transport(&TransportError::NoResponse(
                "connection refused".into(),
            ))),
            LogoutBehaviour::Hang => {
                std::future::pending::<()>().await;
                Ok(())
            }
        }
    }

    async fn current_user(&self) -> Result<UserProfile, ApiFailure> {
        self.current_user.lock().unwrap().clone()
    }
}

/// [`Notifier`] that keeps every message it was asked to show.
#[derive(Default)]
pub(crate) struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub(crate) fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, failure: &ApiFailure) {
        self.messages.lock().unwrap().push(failure.message.clone());
    }
}
