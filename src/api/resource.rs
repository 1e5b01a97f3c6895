//! 资源 API
//!
//! GET /resource/ 转发到 aggregator

use axum::{extract::State, response::IntoResponse, routing::get, Router};
use std::sync::Arc;

use crate::domain::UpstreamBody;
use crate::error::ApiResult;
use crate::middleware::RequireToken;
use crate::services::UpstreamRoute;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/resource/", get(get_resources))
}

async fn get_resources(
    RequireToken(token): RequireToken,
    State(state): State<Arc<AppState>>,
) -> ApiResult<impl IntoResponse> {
    state
        .forwarder
        .forward(UpstreamRoute::GetResources, &token, UpstreamBody::Empty)
        .await
}
