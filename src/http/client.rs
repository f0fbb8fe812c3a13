use std::sync::{Arc, PoisonError, RwLock};

use serde::Serialize;
use serde::de::DeserializeOwned;

use super::classify::{ApiFailure, classify};
use super::{ApiRequest, ApiResponse, Transport};
use crate::session::SessionHandle;

/// Reacts to classified request failures.
///
/// Observers run synchronously, in subscription order, before the failure
/// is returned to the caller.
pub trait ResponseObserver: Send + Sync {
    fn on_failure(&self, failure: &ApiFailure);
}

/// API client shared by every console request.
///
/// Attaches `Authorization: Bearer <token>` whenever the session holds a
/// token, and reports every failure to the subscribed observers.
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    session: SessionHandle,
    observers: RwLock<Vec<Arc<dyn ResponseObserver>>>,
}

impl ApiClient {
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>, session: SessionHandle) -> Self {
        Self {
            transport,
            session,
            observers: RwLock::new(Vec::new()),
        }
    }

    /// Register an observer for every subsequent failure.
    pub fn subscribe(&self, observer: Arc<dyn ResponseObserver>) {
        self.observers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(observer);
    }

    /// Send one request.
    ///
    /// # Errors
    ///
    /// Returns the classified [`ApiFailure`] for any non-`2xx` status or
    /// transport failure, after the observers have seen it.
    pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiFailure> {
        let request = match self.session.token() {
            Some(token) => request.with_bearer(token),
            None => request,
        };
        let method = request.method;
        let path = request.path.clone();

        let result = self.transport.send(request).await;
        if let Some(failure) = classify(&result) {
            tracing::debug!(
                ?method,
                path = %path,
                kind = ?failure.kind,
                status = ?failure.status,
                "API request failed"
            );
            return Err(self.fail(failure));
        }
        result.map_err(|e| self.fail(ApiFailure::from_transport(&e)))
    }

    /// Send a request and decode its body.
    ///
    /// # Errors
    ///
    /// As [`send`](Self::send), plus an `InvalidResponse` failure if the
    /// body does not decode into `T`.
    pub async fn request_json<T: DeserializeOwned>(
        &self,
        request: ApiRequest,
    ) -> Result<T, ApiFailure> {
        let response = self.send(request).await?;
        let status = response.status;
        serde_json::from_value(response.body).map_err(|e| {
            tracing::warn!(status, error = %e, "Undecodable API response");
            ApiFailure::invalid_response(status, e.to_string())
        })
    }

    /// `GET` and decode.
    ///
    /// # Errors
    ///
    /// See [`request_json`](Self::request_json).
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiFailure> {
        self.request_json(ApiRequest::get(path)).await
    }

    /// `POST` a JSON body and decode the reply.
    ///
    /// # Errors
    ///
    /// See [`request_json`](Self::request_json).
    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiFailure>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.with_body(ApiRequest::post(path), body)?;
        self.request_json(request).await
    }

    /// `PUT` a JSON body and decode the reply.
    ///
    /// # Errors
    ///
    /// See [`request_json`](Self::request_json).
    pub async fn put_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiFailure>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.with_body(ApiRequest::put(path), body)?;
        self.request_json(request).await
    }

    /// `DELETE`, ignoring the body.
    ///
    /// # Errors
    ///
    /// See [`send`](Self::send).
    pub async fn delete(&self, path: &str) -> Result<(), ApiFailure> {
        self.send(ApiRequest::delete(path)).await.map(|_| ())
    }

    fn with_body<B: Serialize + ?Sized>(
        &self,
        request: ApiRequest,
        body: &B,
    ) -> Result<ApiRequest, ApiFailure> {
        request
            .with_json(body)
            .map_err(|e| self.fail(ApiFailure::from_transport(&e)))
    }

    fn fail(&self, failure: ApiFailure) -> ApiFailure {
        // Snapshot so an observer may subscribe or send without deadlocking.
        let observers = self
            .observers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for observer in observers {
            observer.on_failure(&failure);
        }
        failure
    }
}
