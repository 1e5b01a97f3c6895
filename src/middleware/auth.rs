//! Token 提取
//!
//! 提供 `RequireToken` extractor：从请求头中取出调用方的 token，转发时作为 bearer 使用

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{
        header::{HeaderMap, AUTHORIZATION},
        request::Parts,
    },
};

use crate::error::ApiError;

/// 主 token 头（与生成的 OpenAPI 客户端保持一致）
pub const API_KEY_HEADER: &str = "api_key";
/// 兼容头
pub const X_API_KEY_HEADER: &str = "x-api-key";

/// 调用方 token
///
/// 缺失或为空时返回 401，不会发起任何上游请求
///
/// # Example
///
/// ```ignore
/// async fn protected_handler(
///     RequireToken(token): RequireToken,
///     State(state): State<Arc<AppState>>,
/// ) -> ApiResult<impl IntoResponse> {
///     // 使用 token 转发...
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RequireToken(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for RequireToken
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        extract_token(&parts.headers)
            .map(RequireToken)
            .ok_or_else(|| {
                tracing::warn!("Missing api_key token");
                ApiError::unauthorized()
            })
    }
}

/// 依次检查 `api_key`、`x-api-key`、`Authorization: Bearer`
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    let header_value = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    header_value(API_KEY_HEADER)
        .or_else(|| header_value(X_API_KEY_HEADER))
        .or_else(|| {
            headers
                .get(AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.strip_prefix("Bearer "))
                .map(str::trim)
                .filter(|v| !v.is_empty())
        })
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_api_key_header() {
        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, HeaderValue::from_static("tok"));
        assert_eq!(extract_token(&headers), Some("tok".to_string()));
    }

    #[test]
    fn test_fallback_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(X_API_KEY_HEADER, HeaderValue::from_static("x-tok"));
        assert_eq!(extract_token(&headers), Some("x-tok".to_string()));

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer b-tok"));
        assert_eq!(extract_token(&headers), Some("b-tok".to_string()));
    }

    #[test]
    fn test_missing_or_empty() {
        assert_eq!(extract_token(&HeaderMap::new()), None);

        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, HeaderValue::from_static("  "));
        assert_eq!(extract_token(&headers), None);
    }
}
