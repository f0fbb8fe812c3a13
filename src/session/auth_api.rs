use std::sync::Arc;

use async_trait::async_trait;

use crate::http::{ApiClient, ApiFailure, ApiRequest};
use crate::types::{Credentials, LoginResponse, UserProfile};

const LOGIN_PATH: &str = "auth/login/";
const LOGOUT_PATH: &str = "auth/logout/";
const CURRENT_USER_PATH: &str = "auth/current-user/";

/// Remote calls the session lifecycle depends on.
#[async_trait]
pub trait AuthEndpoints: Send + Sync {
    /// Exchange credentials for tokens and a profile.
    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ApiFailure>;

    /// Tell the server the session is over.
    async fn logout(&self) -> Result<(), ApiFailure>;

    /// Profile of the user the current token belongs to.
    async fn current_user(&self) -> Result<UserProfile, ApiFailure>;
}

/// [`AuthEndpoints`] over the console API.
///
/// Calls go through the shared [`ApiClient`], so they carry the bearer
/// header and their failures reach the same observers as any other request.
pub struct AuthApi {
    client: Arc<ApiClient>,
}

impl AuthApi {
    #[must_use]
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AuthEndpoints for AuthApi {
    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ApiFailure> {
        self.client.post_json(LOGIN_PATH, credentials).await
    }

    async fn logout(&self) -> Result<(), ApiFailure> {
        self.client.send(ApiRequest::post(LOGOUT_PATH)).await.map(|_| ())
    }

    async fn current_user(&self) -> Result<UserProfile, ApiFailure> {
        self.client.get_json(CURRENT_USER_PATH).await
    }
}
