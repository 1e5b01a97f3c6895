//! 后端 API 客户端
//!
//! 每个后端操作对应一个方法，一次请求一次响应；非 2xx 状态码统一返回 `UnexpectedStatus`

use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::config::backend::constants::API_PREFIX;
use crate::domain::payload::wrap_content;
use crate::domain::{Controller, LoginQuery};
use crate::middleware::auth::API_KEY_HEADER;

/// 客户端错误
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Error connecting to {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("unexpected status code {status}: {body}")]
    UnexpectedStatus { status: StatusCode, body: String },

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ClientError {
    /// 上游状态码（仅 `UnexpectedStatus`）
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::UnexpectedStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

/// 响应：状态码 + 解码后的 body
#[derive(Debug, Clone)]
pub struct ApiResponse<T> {
    pub status: StatusCode,
    pub body: T,
}

/// ICOS shell 后端客户端
#[derive(Clone)]
pub struct ShellClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ShellClient {
    /// `address` 为 controller 地址，如 `http://controller:8080`
    pub fn new(address: &str) -> ClientResult<Self> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|source| ClientError::Transport {
                url: address.to_string(),
                source,
            })?;

        Ok(Self {
            http,
            base_url: api_base_url(address),
            token: None,
        })
    }

    /// 设置 token（以 `api_key` 头发送）
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|t| !t.is_empty());
        self
    }

    // ========== Health ==========

    pub async fn healthcheck(&self) -> ClientResult<ApiResponse<Value>> {
        self.send(Method::GET, "/healthcheck", None).await
    }

    // ========== User ==========

    /// 登录，返回 token 字符串
    pub async fn login_user(&self, query: &LoginQuery) -> ClientResult<ApiResponse<String>> {
        let url = format!("{}/user/login", self.base_url);
        let request = self.http.get(&url).query(query);
        let (status, bytes) = self.execute(request, &url).await?;

        let token = match serde_json::from_slice::<Value>(&bytes) {
            Ok(Value::String(token)) => token,
            Ok(other) => other
                .get("access_token")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            Err(_) => String::from_utf8_lossy(&bytes).trim().to_string(),
        };

        Ok(ApiResponse {
            status,
            body: token.trim().to_string(),
        })
    }

    // ========== Controller ==========

    /// 列出 controller；204 视为空列表
    pub async fn get_controllers(&self) -> ClientResult<ApiResponse<Vec<Controller>>> {
        self.send(Method::GET, "/controller/", None).await
    }

    pub async fn add_controller(&self, controller: &Controller) -> ClientResult<ApiResponse<Value>> {
        let body = serde_json::to_value(controller)?;
        self.send(Method::POST, "/controller/", Some(body)).await
    }

    // ========== Deployment ==========

    pub async fn get_deployments(&self) -> ClientResult<ApiResponse<Value>> {
        self.send(Method::GET, "/deployment/", None).await
    }

    pub async fn get_deployment_by_id(&self, id: &str) -> ClientResult<ApiResponse<Value>> {
        self.send(Method::GET, &format!("/deployment/{}", id), None).await
    }

    /// 创建部署，YAML 原文包在 `content` 中发送
    pub async fn create_deployment(&self, manifest: &str) -> ClientResult<ApiResponse<Value>> {
        self.send(Method::POST, "/deployment/", Some(wrap_content(manifest)))
            .await
    }

    pub async fn update_deployment(&self, id: &str, body: Value) -> ClientResult<ApiResponse<Value>> {
        self.send(Method::PUT, &format!("/deployment/{}", id), Some(body))
            .await
    }

    pub async fn delete_deployment_by_id(&self, id: &str) -> ClientResult<ApiResponse<Value>> {
        self.send(Method::DELETE, &format!("/deployment/{}", id), None)
            .await
    }

    pub async fn start_deployment_by_id(&self, id: &str) -> ClientResult<ApiResponse<Value>> {
        self.send(Method::PUT, &format!("/deployment/{}/start", id), None)
            .await
    }

    pub async fn stop_deployment_by_id(&self, id: &str) -> ClientResult<ApiResponse<Value>> {
        self.send(Method::PUT, &format!("/deployment/{}/stop", id), None)
            .await
    }

    // ========== Resource ==========

    pub async fn get_resources(&self) -> ClientResult<ApiResponse<Value>> {
        self.send(Method::GET, "/resource/", None).await
    }

    // ========== Metrics ==========

    pub async fn get_metrics(&self) -> ClientResult<ApiResponse<Value>> {
        self.send(Method::GET, "/metrics/get", None).await
    }

    pub async fn train_metrics(&self, descriptor: &str) -> ClientResult<ApiResponse<Value>> {
        self.send(Method::POST, "/metrics/train", Some(wrap_content(descriptor)))
            .await
    }

    pub async fn predict_metrics(&self, descriptor: &str) -> ClientResult<ApiResponse<Value>> {
        self.send(Method::POST, "/metrics/predict", Some(wrap_content(descriptor)))
            .await
    }

    pub async fn delete_metrics(&self, descriptor: &str) -> ClientResult<ApiResponse<Value>> {
        self.send(Method::POST, "/metrics/delete", Some(wrap_content(descriptor)))
            .await
    }

    // ========== 内部 ==========

    async fn send<T>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> ClientResult<ApiResponse<T>>
    where
        T: DeserializeOwned + Default,
    {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.http.request(method, &url);
        if let Some(body) = body {
            request = request.json(&body);
        }

        let (status, bytes) = self.execute(request, &url).await?;
        let body = if status == StatusCode::NO_CONTENT || bytes.is_empty() {
            T::default()
        } else {
            serde_json::from_slice(&bytes)?
        };

        Ok(ApiResponse { status, body })
    }

    async fn execute(
        &self,
        mut request: reqwest::RequestBuilder,
        url: &str,
    ) -> ClientResult<(StatusCode, Vec<u8>)> {
        if let Some(token) = &self.token {
            request = request.header(API_KEY_HEADER, token);
        }

        let transport = |source| ClientError::Transport {
            url: url.to_string(),
            source,
        };

        let response = request.send().await.map_err(transport)?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(transport)?.to_vec();

        tracing::debug!(url = %url, status = %status, "Backend responded");

        if !status.is_success() {
            return Err(ClientError::UnexpectedStatus {
                status,
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }

        Ok((status, bytes))
    }
}

/// controller 地址 → API 根路径（已带前缀时不重复追加）
pub fn api_base_url(address: &str) -> String {
    let trimmed = address.trim().trim_end_matches('/');
    if trimmed.ends_with(API_PREFIX) {
        trimmed.to_string()
    } else {
        format!("{}{}", trimmed, API_PREFIX)
    }
}
