//! Controller API
//!
//! GET/POST /controller/

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use std::sync::Arc;

use crate::api::json_body;
use crate::domain::Controller;
use crate::error::{ApiError, ApiResult};
use crate::middleware::RequireToken;
use crate::state::controller_registry::RegisterError;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/controller/", get(get_controllers).post(add_controller))
}

/// 列出 controller，列表为空时返回 204
async fn get_controllers(State(state): State<Arc<AppState>>) -> Response {
    let controllers = state.controllers.list().await;
    if controllers.is_empty() {
        return StatusCode::NO_CONTENT.into_response();
    }
    Json(controllers).into_response()
}

/// 新增 controller
///
/// 需要 token
async fn add_controller(
    _token: RequireToken,
    State(state): State<Arc<AppState>>,
    body: Result<Json<Controller>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let controller = json_body(body)?;
    if let Some(field) = controller.missing_field() {
        return Err(ApiError::bad_request(format!(
            "required field '{}' is missing",
            field
        )));
    }

    let stored = state
        .controllers
        .register(controller)
        .await
        .map_err(|RegisterError::Duplicate(name)| {
            ApiError::conflict(format!("Controller '{}' already exists", name))
        })?;

    tracing::info!(name = %stored.name, address = %stored.address, "Controller added");
    Ok((StatusCode::CREATED, Json(stored)))
}
