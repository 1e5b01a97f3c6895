//! 响应归一化
//!
//! 把上游响应（单个对象或数组）转成后端的 JSON 响应，状态码保持不变。
//! 非预期状态码不透传 body，而是合成 `unexpected_status` 错误

use axum::{http::StatusCode, Json};
use serde_json::Value;

use crate::error::{ApiError, ApiResult};
use crate::infra::UpstreamResponse;

/// 上游响应体的形态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Object,
    Array,
}

/// 只接受 200
pub const EXPECT_OK: &[StatusCode] = &[StatusCode::OK];
/// 接受 200 / 201
pub const EXPECT_OK_OR_CREATED: &[StatusCode] = &[StatusCode::OK, StatusCode::CREATED];

/// 归一化上游响应
pub fn normalize(
    shape: Shape,
    expected: &[StatusCode],
    response: UpstreamResponse,
) -> ApiResult<(StatusCode, Json<Value>)> {
    if !expected.contains(&response.status) {
        tracing::warn!(status = %response.status, "Upstream returned unexpected status code");
        return Err(ApiError::unexpected_status(response.status, response.text()));
    }

    Ok((response.status, Json(decode_body(shape, &response.body))))
}

/// 解码响应体
///
/// 空 body 按形态返回 `{}` / `[]`；无法解析为 JSON 时退化为字符串
pub fn decode_body(shape: Shape, body: &[u8]) -> Value {
    if body.iter().all(u8::is_ascii_whitespace) {
        return match shape {
            Shape::Object => Value::Object(Default::default()),
            Shape::Array => Value::Array(Vec::new()),
        };
    }

    match serde_json::from_slice::<Value>(body) {
        Ok(value) => value,
        Err(e) => {
            tracing::debug!(error = %e, "Upstream body is not JSON, forwarding as text");
            Value::String(String::from_utf8_lossy(body).into_owned())
        }
    }
}
