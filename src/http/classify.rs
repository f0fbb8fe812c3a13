use serde_json::Value as JsonValue;

use super::{ApiResponse, TransportError};

const SESSION_EXPIRED_MESSAGE: &str = "登录已过期,请重新登录";
const FORBIDDEN_MESSAGE: &str = "没有权限访问该资源";
const NOT_FOUND_MESSAGE: &str = "请求的资源不存在";
const SERVER_ERROR_MESSAGE: &str = "服务器错误,请稍后重试";
const NETWORK_MESSAGE: &str = "网络错误,请检查网络连接";
const INVALID_REQUEST_MESSAGE: &str = "请求配置错误";
const INVALID_RESPONSE_MESSAGE: &str = "响应格式错误";
const GENERIC_MESSAGE: &str = "请求失败";

/// What went wrong with a request, independent of how it is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum FailureKind {
    /// `401`: the credential is invalid or expired.
    SessionExpired,
    /// `403`.
    Forbidden,
    /// `404`.
    NotFound,
    /// `500`.
    ServerError,
    /// No response was received.
    NetworkUnreachable,
    /// The request could not be built.
    InvalidRequest,
    /// A `2xx` whose body did not decode.
    InvalidResponse,
    /// Any other non-`2xx` status.
    Rejected,
}

/// A classified request failure with its user-visible message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
#[non_exhaustive]
pub struct ApiFailure {
    pub kind: FailureKind,
    pub status: Option<u16>,
    /// Message to show the user.
    pub message: String,
    /// Server-provided `detail`/`message`, when the body carried one.
    pub detail: Option<String>,
}

impl ApiFailure {
    /// Classify a non-success response.
    #[must_use]
    pub fn from_response(response: &ApiResponse) -> Self {
        let detail = body_detail(&response.body);
        let (kind, message) = match response.status {
            401 => (FailureKind::SessionExpired, SESSION_EXPIRED_MESSAGE.to_owned()),
            403 => (FailureKind::Forbidden, FORBIDDEN_MESSAGE.to_owned()),
            404 => (FailureKind::NotFound, NOT_FOUND_MESSAGE.to_owned()),
            500 => (FailureKind::ServerError, SERVER_ERROR_MESSAGE.to_owned()),
            _ => (
                FailureKind::Rejected,
                detail.clone().unwrap_or_else(|| GENERIC_MESSAGE.to_owned()),
            ),
        };
        Self {
            kind,
            status: Some(response.status),
            message,
            detail,
        }
    }

    #[must_use]
    pub fn from_transport(error: &TransportError) -> Self {
        let (kind, message) = match error {
            TransportError::NoResponse(_) => (FailureKind::NetworkUnreachable, NETWORK_MESSAGE),
            TransportError::InvalidRequest(_) => {
                (FailureKind::InvalidRequest, INVALID_REQUEST_MESSAGE)
            }
        };
        Self {
            kind,
            status: None,
            message: message.to_owned(),
            detail: Some(error.to_string()),
        }
    }

    /// A `2xx` whose body could not be decoded into the expected type.
    #[must_use]
    pub fn invalid_response(status: u16, reason: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::InvalidResponse,
            status: Some(status),
            message: INVALID_RESPONSE_MESSAGE.to_owned(),
            detail: Some(reason.into()),
        }
    }

    /// The most specific text available: the server's detail, else the
    /// user-visible message.
    #[must_use]
    pub fn reason(&self) -> &str {
        self.detail.as_deref().unwrap_or(&self.message)
    }
}

/// Classify the outcome of one round trip. `None` means success.
#[must_use]
pub fn classify(result: &Result<ApiResponse, TransportError>) -> Option<ApiFailure> {
    match result {
        Ok(response) if response.is_success() => None,
        Ok(response) => Some(ApiFailure::from_response(response)),
        Err(error) => Some(ApiFailure::from_transport(error)),
    }
}

fn body_detail(body: &JsonValue) -> Option<String> {
    ["detail", "message"]
        .into_iter()
        .filter_map(|field| body.get(field))
        .find_map(|value| match value {
            JsonValue::String(text) if !text.is_empty() => Some(text.clone()),
            _ => None,
        })
}
