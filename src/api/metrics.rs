//! Metrics API
//!
//! 转发到 intelligence 服务：GET /metrics/get，POST /metrics/{train,predict,delete}

use axum::{
    extract::{rejection::JsonRejection, State},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::{Map, Value};
use std::sync::Arc;

use crate::api::json_body;
use crate::domain::UpstreamBody;
use crate::error::ApiResult;
use crate::middleware::RequireToken;
use crate::services::UpstreamRoute;
use crate::state::AppState;

type MetricsBody = Result<Json<Map<String, Value>>, JsonRejection>;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/metrics/get", get(get_metrics))
        .route("/metrics/train", post(train_metrics))
        .route("/metrics/predict", post(predict_metrics))
        .route("/metrics/delete", post(delete_metrics))
}

async fn get_metrics(
    RequireToken(token): RequireToken,
    State(state): State<Arc<AppState>>,
) -> ApiResult<impl IntoResponse> {
    state
        .forwarder
        .forward(UpstreamRoute::GetMetrics, &token, UpstreamBody::Empty)
        .await
}

async fn train_metrics(
    RequireToken(token): RequireToken,
    State(state): State<Arc<AppState>>,
    body: MetricsBody,
) -> ApiResult<impl IntoResponse> {
    forward_metrics(&state, UpstreamRoute::TrainMetrics, &token, body).await
}

async fn predict_metrics(
    RequireToken(token): RequireToken,
    State(state): State<Arc<AppState>>,
    body: MetricsBody,
) -> ApiResult<impl IntoResponse> {
    forward_metrics(&state, UpstreamRoute::PredictMetrics, &token, body).await
}

async fn delete_metrics(
    RequireToken(token): RequireToken,
    State(state): State<Arc<AppState>>,
    body: MetricsBody,
) -> ApiResult<impl IntoResponse> {
    forward_metrics(&state, UpstreamRoute::DeleteMetrics, &token, body).await
}

async fn forward_metrics(
    state: &AppState,
    route: UpstreamRoute,
    token: &str,
    body: MetricsBody,
) -> ApiResult<impl IntoResponse> {
    let body = UpstreamBody::metrics(json_body(body)?);
    state.forwarder.forward(route, token, body).await
}
