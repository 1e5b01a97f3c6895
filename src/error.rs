//! 统一错误处理
//!
//! `ApiError` 实现 `IntoResponse`，所有 handler 统一返回 `ApiResult<T>`

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// API 错误响应结构
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// 统一 API 错误类型
#[derive(Debug)]
pub enum ApiError {
    /// 401 - 未携带 token
    Unauthorized,
    /// 400 - 请求体校验失败
    BadRequest(String),
    /// 409 - 冲突（如：同名 controller 已存在）
    Conflict(String),
    /// 502 - 无法连接上游服务
    Connect(String),
    /// 上游返回了非预期状态码，状态码原样透传
    UnexpectedStatus { status: StatusCode, body: String },
    /// 500 - 内部错误
    Internal(String),
}

impl ApiError {
    pub fn unauthorized() -> Self {
        Self::Unauthorized
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn connect(message: impl Into<String>) -> Self {
        Self::Connect(message.into())
    }

    pub fn unexpected_status(status: StatusCode, body: impl Into<String>) -> Self {
        Self::UnexpectedStatus {
            status,
            body: body.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// 该错误对应的 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Connect(_) => StatusCode::BAD_GATEWAY,
            ApiError::UnexpectedStatus { status, .. } => *status,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn to_body(&self) -> ErrorResponse {
        match self {
            ApiError::Unauthorized => {
                ErrorResponse::new("unauthorized", "Missing api_key token")
            }
            ApiError::BadRequest(msg) => ErrorResponse::new("bad_request", msg.clone()),
            ApiError::Conflict(msg) => ErrorResponse::new("conflict", msg.clone()),
            ApiError::Connect(msg) => ErrorResponse::new("connect_error", "Error connecting to upstream service")
                .with_details(msg.clone()),
            ApiError::UnexpectedStatus { status, body } => {
                let resp = ErrorResponse::new(
                    "unexpected_status",
                    format!("unexpected status code {}", status.as_u16()),
                );
                if body.is_empty() {
                    resp
                } else {
                    resp.with_details(body.clone())
                }
            }
            ApiError::Internal(msg) => ErrorResponse::new("internal_error", msg.clone()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self.to_body())).into_response()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::Unauthorized => write!(f, "Unauthorized"),
            ApiError::BadRequest(m) => write!(f, "Bad request: {}", m),
            ApiError::Conflict(m) => write!(f, "Conflict: {}", m),
            ApiError::Connect(m) => write!(f, "Connect error: {}", m),
            ApiError::UnexpectedStatus { status, .. } => {
                write!(f, "Unexpected status code: {}", status.as_u16())
            }
            ApiError::Internal(m) => write!(f, "Internal error: {}", m),
        }
    }
}

impl std::error::Error for ApiError {}

/// 便捷类型别名
pub type ApiResult<T> = Result<T, ApiError>;
