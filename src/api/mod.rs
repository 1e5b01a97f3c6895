//! API 模块
//!
//! HTTP handlers 和路由组装，所有路由挂在 `/api/v3` 下

pub mod controller;
pub mod deployment;
pub mod health;
pub mod metrics;
pub mod resource;
pub mod user;

use axum::{
    body::Body,
    extract::rejection::JsonRejection,
    http::{Request, Uri},
    Json, Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::Span;

use crate::config::backend::constants::API_PREFIX;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// 构建完整的 API 路由
pub fn router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .merge(health::router())
        .merge(user::router())
        .merge(controller::router())
        .merge(deployment::router())
        .merge(resource::router())
        .merge(metrics::router());

    Router::new()
        .nest(API_PREFIX, api)
        .layer(TraceLayer::new_for_http().make_span_with(request_span::<Body>))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// 把 JSON 解码失败转成统一的 400 错误
pub(crate) fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    body.map(|Json(value)| value)
        .map_err(|rejection| ApiError::bad_request(rejection.body_text()))
}

/// 请求 span 只记录 path：`/user/login` 的密码在 query 中
fn request_span<B>(request: &Request<B>) -> Span {
    tracing::debug_span!(
        "request",
        method = %request.method(),
        path = %loggable_path(request.uri()),
        version = ?request.version(),
    )
}

fn loggable_path(uri: &Uri) -> &str {
    uri.path()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_query_is_not_logged() {
        let uri: Uri = "/api/v3/user/login?username=alice&password=secret&otp=123456"
            .parse()
            .unwrap();
        assert_eq!(loggable_path(&uri), "/api/v3/user/login");

        let request = Request::builder().uri(uri).body(()).unwrap();
        let _span = request_span(&request);
    }
}
