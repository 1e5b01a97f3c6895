//! 用户 API
//!
//! GET /user/login

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    routing::get,
    Router,
};
use std::sync::Arc;

use crate::domain::LoginQuery;
use crate::error::ApiResult;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/user/login", get(login_user))
}

/// 登录，成功时返回 token 字符串（JSON 编码）
async fn login_user(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LoginQuery>,
) -> ApiResult<impl IntoResponse> {
    state.forwarder.login(query).await
}
