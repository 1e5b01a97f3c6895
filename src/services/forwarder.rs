//! 请求转发
//!
//! 每个后端操作对应一条 `UpstreamRoute`：方法、URL 模板、响应形态和预期状态码。
//! URL 由配置的上游地址 + 子路径 + 模板后缀 + id 直接拼接

use axum::{
    http::{Method, StatusCode},
    Json,
};
use serde_json::Value;

use crate::config::backend::ComponentsConfig;
use crate::domain::{LoginQuery, UpstreamBody};
use crate::domain::user::TokenGrant;
use crate::error::{ApiError, ApiResult};
use crate::infra::{ForwardError, UpstreamClient, UpstreamRequest};
use crate::services::normalizer::{self, Shape, EXPECT_OK, EXPECT_OK_OR_CREATED};

/// 转发目标
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpstreamRoute {
    ListDeployments,
    CreateDeployment,
    GetDeployment(String),
    UpdateDeployment(String),
    DeleteDeployment(String),
    StartDeployment(String),
    StopDeployment(String),
    GetResources,
    GetMetrics,
    TrainMetrics,
    PredictMetrics,
    DeleteMetrics,
}

impl UpstreamRoute {
    pub fn method(&self) -> Method {
        match self {
            Self::ListDeployments
            | Self::GetDeployment(_)
            | Self::GetResources
            | Self::GetMetrics => Method::GET,
            Self::CreateDeployment
            | Self::TrainMetrics
            | Self::PredictMetrics
            | Self::DeleteMetrics => Method::POST,
            Self::UpdateDeployment(_) | Self::StartDeployment(_) | Self::StopDeployment(_) => {
                Method::PUT
            }
            Self::DeleteDeployment(_) => Method::DELETE,
        }
    }

    /// 拼接上游 URL
    pub fn url(&self, components: &ComponentsConfig) -> String {
        let jm = &components.job_manager;
        let groups = format!("{}{}", jm.server, jm.path_jobgroups);
        let intelligence = &components.intelligence;

        match self {
            Self::ListDeployments | Self::CreateDeployment => groups,
            Self::GetDeployment(id) | Self::UpdateDeployment(id) | Self::DeleteDeployment(id) => {
                format!("{}/{}", groups, id)
            }
            Self::StartDeployment(id) => format!("{}/start/{}", groups, id),
            Self::StopDeployment(id) => format!("{}/stop/{}", groups, id),
            Self::GetResources => format!(
                "{}{}",
                components.aggregator.server, components.aggregator.path_resources
            ),
            Self::GetMetrics => format!("{}{}", intelligence.server, intelligence.path_get),
            Self::TrainMetrics => format!("{}{}", intelligence.server, intelligence.path_train),
            Self::PredictMetrics => format!("{}{}", intelligence.server, intelligence.path_predict),
            Self::DeleteMetrics => format!("{}{}", intelligence.server, intelligence.path_delete),
        }
    }

    pub fn shape(&self) -> Shape {
        match self {
            Self::ListDeployments | Self::GetMetrics => Shape::Array,
            _ => Shape::Object,
        }
    }

    /// 路径中的部署 ID
    pub fn deployment_id(&self) -> Option<&str> {
        match self {
            Self::GetDeployment(id)
            | Self::UpdateDeployment(id)
            | Self::DeleteDeployment(id)
            | Self::StartDeployment(id)
            | Self::StopDeployment(id) => Some(id),
            _ => None,
        }
    }

    /// 视为成功的上游状态码
    pub fn expected(&self) -> &'static [StatusCode] {
        if self.method() == Method::GET {
            EXPECT_OK
        } else {
            EXPECT_OK_OR_CREATED
        }
    }
}

/// 请求转发器
#[derive(Clone)]
pub struct Forwarder {
    upstream: UpstreamClient,
    components: ComponentsConfig,
}

impl Forwarder {
    pub fn new(upstream: UpstreamClient, components: ComponentsConfig) -> Self {
        Self {
            upstream,
            components,
        }
    }

    /// 转发一次请求并归一化响应
    pub async fn forward(
        &self,
        route: UpstreamRoute,
        token: &str,
        body: UpstreamBody,
    ) -> ApiResult<(StatusCode, Json<Value>)> {
        if let Some(id) = route.deployment_id() {
            check_path_segment(id).map_err(ApiError::bad_request)?;
        }

        let request = UpstreamRequest::new(route.method(), route.url(&self.components))
            .bearer(token)
            .body(body);

        let response = self.upstream.send(request).await.map_err(map_forward_error)?;
        normalizer::normalize(route.shape(), route.expected(), response)
    }

    /// 用户登录：password grant 换取 access token，返回 JSON 字符串
    pub async fn login(&self, query: LoginQuery) -> ApiResult<(StatusCode, Json<Value>)> {
        let username = query
            .username
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ApiError::bad_request("required parameter 'username' is missing"))?;
        let password = query
            .password
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ApiError::bad_request("required parameter 'password' is missing"))?;

        let keycloak = &self.components.keycloak;
        let mut form = vec![
            ("grant_type", "password"),
            ("client_id", keycloak.client_id.as_str()),
            ("username", username.as_str()),
            ("password", password.as_str()),
        ];
        if let Some(secret) = keycloak.client_secret.as_deref() {
            form.push(("client_secret", secret));
        }
        if let Some(otp) = query.otp.as_deref().filter(|s| !s.is_empty()) {
            form.push(("totp", otp));
        }

        let response = self
            .upstream
            .send_form(&keycloak.token_url(), &form)
            .await
            .map_err(map_forward_error)?;

        if response.status != StatusCode::OK {
            tracing::warn!(user = %username, status = %response.status, "Login rejected by identity provider");
            return Err(ApiError::unexpected_status(response.status, response.text()));
        }

        let grant: TokenGrant = serde_json::from_slice(&response.body)
            .map_err(|e| ApiError::internal(format!("Invalid token response: {}", e)))?;

        tracing::info!(user = %username, "User logged in");
        Ok((StatusCode::OK, Json(Value::String(grant.access_token))))
    }
}

/// ID 会直接拼进上游 URL，必须是单个路径段
///
/// axum 已对 `%2F` / `%3F` 等解码，这里拒绝解码后的分隔符和 `.` / `..`
pub fn check_path_segment(id: &str) -> Result<(), String> {
    if id.is_empty() {
        return Err("deployment id must not be empty".to_string());
    }
    if id == "." || id == ".." || id.contains(&['/', '\\', '?', '#', '%'][..]) {
        return Err(format!("invalid deployment id '{}'", id));
    }
    Ok(())
}

fn map_forward_error(err: ForwardError) -> ApiError {
    match err {
        ForwardError::Connect { .. } => ApiError::connect(err.to_string()),
        ForwardError::Encode(e) => ApiError::bad_request(e.to_string()),
    }
}
