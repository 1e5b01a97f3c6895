//! 上游 HTTP Client
//!
//! 封装与 job manager / aggregator / intelligence / 身份服务的 HTTP 交互，复用连接池。
//! 不重试，除 reqwest 默认值外不设超时

use axum::http::{header, Method, StatusCode};
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

use crate::domain::UpstreamBody;

/// 转发错误类型
#[derive(Debug, Error)]
pub enum ForwardError {
    /// 连接失败或读取响应失败
    #[error("Error connecting to {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to encode request body: {0}")]
    Encode(#[from] serde_json::Error),
}

/// 发往上游的请求
#[derive(Debug, Clone)]
pub struct UpstreamRequest {
    pub method: Method,
    pub url: String,
    /// 调用方提供的 token，作为 `Authorization: Bearer` 转发
    pub token: Option<String>,
    pub body: UpstreamBody,
}

impl UpstreamRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            token: None,
            body: UpstreamBody::Empty,
        }
    }

    pub fn bearer(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn body(mut self, body: UpstreamBody) -> Self {
        self.body = body;
        self
    }
}

/// 上游响应（状态码 + 原始 body）
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

impl UpstreamResponse {
    /// body 的文本形式（非 UTF-8 字节按 lossy 处理）
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// 上游客户端
#[derive(Clone)]
pub struct UpstreamClient {
    client: Client,
}

impl UpstreamClient {
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .pool_max_idle_per_host(5)
            .pool_idle_timeout(Duration::from_secs(90))
            .build()?;

        Ok(Self { client })
    }

    /// 发送一次请求并读取完整响应
    pub async fn send(&self, request: UpstreamRequest) -> Result<UpstreamResponse, ForwardError> {
        let UpstreamRequest {
            method,
            url,
            token,
            body,
        } = request;

        info!(method = %method, url = %url, "Sending request to upstream");

        let mut builder = self.client.request(method.clone(), &url);
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }
        if let Some(content_type) = body.content_type() {
            builder = builder.header(header::CONTENT_TYPE, content_type);
        }
        let bytes = body.into_bytes()?;
        if !bytes.is_empty() {
            builder = builder.body(bytes);
        }

        self.finish(builder, &method, &url).await
    }

    /// 发送表单请求（身份服务 token 端点）
    pub async fn send_form(
        &self,
        url: &str,
        form: &[(&str, &str)],
    ) -> Result<UpstreamResponse, ForwardError> {
        info!(url = %url, "Requesting token from identity provider");
        let builder = self.client.post(url).form(form);
        self.finish(builder, &Method::POST, url).await
    }

    async fn finish(
        &self,
        builder: reqwest::RequestBuilder,
        method: &Method,
        url: &str,
    ) -> Result<UpstreamResponse, ForwardError> {
        let connect_err = |source| ForwardError::Connect {
            url: url.to_string(),
            source,
        };

        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(method = %method, url = %url, error = %e, "Upstream request failed");
                return Err(connect_err(e));
            }
        };

        let status = response.status();
        let body = response.bytes().await.map_err(connect_err)?.to_vec();

        info!(
            method = %method,
            url = %url,
            status = %status,
            bytes = body.len(),
            "Upstream responded"
        );

        Ok(UpstreamResponse { status, body })
    }
}
