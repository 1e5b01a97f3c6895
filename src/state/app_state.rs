//! 应用状态

use chrono::{DateTime, Utc};

use crate::config::BackendConfig;
use crate::infra::UpstreamClient;
use crate::services::Forwarder;

use super::controller_registry::ControllerRegistry;

/// 应用状态
///
/// 配置在启动时加载一次并分发给各组件；唯一可变的部分是 controller 注册表
pub struct AppState {
    /// 服务启动时间
    pub started_at: DateTime<Utc>,
    /// 上游请求转发器
    pub forwarder: Forwarder,
    /// lighthouse controller 列表
    pub controllers: ControllerRegistry,
}

impl AppState {
    /// 创建新的应用状态
    pub fn new(config: BackendConfig) -> Result<Self, reqwest::Error> {
        let upstream = UpstreamClient::new()?;

        tracing::info!(
            job_manager = %config.components.job_manager.server,
            aggregator = %config.components.aggregator.server,
            intelligence = %config.components.intelligence.server,
            keycloak = %config.components.keycloak.server,
            controller_count = config.controllers.len(),
            "Loaded configuration"
        );

        Ok(Self {
            forwarder: Forwarder::new(upstream, config.components),
            controllers: ControllerRegistry::new(config.controllers),
            started_at: Utc::now(),
        })
    }
}
