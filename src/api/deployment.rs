//! 部署 API
//!
//! 所有端点转发到 job manager

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};
use serde_json::{Map, Value};
use std::sync::Arc;

use crate::api::json_body;
use crate::domain::UpstreamBody;
use crate::error::{ApiError, ApiResult};
use crate::middleware::RequireToken;
use crate::services::UpstreamRoute;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/deployment/", get(get_deployments).post(create_deployment))
        .route(
            "/deployment/:deployment_id",
            get(get_deployment_by_id)
                .put(update_deployment)
                .delete(delete_deployment_by_id),
        )
        .route("/deployment/:deployment_id/start", put(start_deployment_by_id))
        .route("/deployment/:deployment_id/stop", put(stop_deployment_by_id))
}

/// GET /deployment/
async fn get_deployments(
    RequireToken(token): RequireToken,
    State(state): State<Arc<AppState>>,
) -> ApiResult<impl IntoResponse> {
    state
        .forwarder
        .forward(UpstreamRoute::ListDeployments, &token, UpstreamBody::Empty)
        .await
}

/// POST /deployment/
///
/// body: `{"content": "<yaml>"}`，YAML 原样转发
async fn create_deployment(
    RequireToken(token): RequireToken,
    State(state): State<Arc<AppState>>,
    body: Result<Json<Map<String, Value>>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let body = json_body(body)?;
    let manifest = UpstreamBody::deployment_manifest(&body).map_err(ApiError::bad_request)?;

    state
        .forwarder
        .forward(UpstreamRoute::CreateDeployment, &token, manifest)
        .await
}

/// GET /deployment/:deployment_id
async fn get_deployment_by_id(
    RequireToken(token): RequireToken,
    State(state): State<Arc<AppState>>,
    Path(deployment_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    state
        .forwarder
        .forward(
            UpstreamRoute::GetDeployment(deployment_id),
            &token,
            UpstreamBody::Empty,
        )
        .await
}

/// PUT /deployment/:deployment_id
async fn update_deployment(
    RequireToken(token): RequireToken,
    State(state): State<Arc<AppState>>,
    Path(deployment_id): Path<String>,
    body: Result<Json<Map<String, Value>>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let body = json_body(body)?;

    state
        .forwarder
        .forward(
            UpstreamRoute::UpdateDeployment(deployment_id),
            &token,
            UpstreamBody::Json(Value::Object(body)),
        )
        .await
}

/// DELETE /deployment/:deployment_id
async fn delete_deployment_by_id(
    RequireToken(token): RequireToken,
    State(state): State<Arc<AppState>>,
    Path(deployment_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    state
        .forwarder
        .forward(
            UpstreamRoute::DeleteDeployment(deployment_id),
            &token,
            UpstreamBody::Empty,
        )
        .await
}

/// PUT /deployment/:deployment_id/start
async fn start_deployment_by_id(
    RequireToken(token): RequireToken,
    State(state): State<Arc<AppState>>,
    Path(deployment_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    state
        .forwarder
        .forward(
            UpstreamRoute::StartDeployment(deployment_id),
            &token,
            UpstreamBody::Empty,
        )
        .await
}

/// PUT /deployment/:deployment_id/stop
///
/// 移除该部署的所有资源
async fn stop_deployment_by_id(
    RequireToken(token): RequireToken,
    State(state): State<Arc<AppState>>,
    Path(deployment_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    state
        .forwarder
        .forward(
            UpstreamRoute::StopDeployment(deployment_id),
            &token,
            UpstreamBody::Empty,
        )
        .await
}
