//! 后端配置加载
//!
//! 先读取 YAML 配置文件（可选），再用环境变量覆盖。启动时加载一次，之后只读

use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;
use std::path::Path;
use tracing::info;

use crate::domain::Controller;

/// 后端配置
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub server: ServerConfig,
    pub components: ComponentsConfig,
    /// lighthouse 模式下预置的 controller 列表
    pub controllers: Vec<Controller>,
}

/// 监听配置
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

/// 上游组件地址
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct ComponentsConfig {
    pub job_manager: JobManagerConfig,
    pub aggregator: AggregatorConfig,
    pub intelligence: IntelligenceConfig,
    pub keycloak: KeycloakConfig,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct JobManagerConfig {
    pub server: String,
    pub path_jobgroups: String,
}

impl Default for JobManagerConfig {
    fn default() -> Self {
        Self {
            server: "http://localhost:8082".to_string(),
            path_jobgroups: "/jobmanager/groups".to_string(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct AggregatorConfig {
    pub server: String,
    pub path_resources: String,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            server: "http://localhost:8083".to_string(),
            path_resources: "/resources".to_string(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct IntelligenceConfig {
    pub server: String,
    pub path_get: String,
    pub path_train: String,
    pub path_predict: String,
    pub path_delete: String,
}

impl Default for IntelligenceConfig {
    fn default() -> Self {
        Self {
            server: "http://localhost:3000".to_string(),
            path_get: "/models".to_string(),
            path_train: "/train".to_string(),
            path_predict: "/predict".to_string(),
            path_delete: "/delete".to_string(),
        }
    }
}

/// 身份服务（OpenID Connect password grant）
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct KeycloakConfig {
    pub server: String,
    pub realm: String,
    pub client_id: String,
    pub client_secret: Option<String>,
}

impl Default for KeycloakConfig {
    fn default() -> Self {
        Self {
            server: "http://localhost:8180".to_string(),
            realm: "icos".to_string(),
            client_id: "icos-shell".to_string(),
            client_secret: None,
        }
    }
}

impl KeycloakConfig {
    /// token 端点 URL
    pub fn token_url(&self) -> String {
        format!(
            "{}/realms/{}/protocol/openid-connect/token",
            self.server.trim_end_matches('/'),
            self.realm
        )
    }
}

impl BackendConfig {
    /// 从 YAML 文件加载（若提供），再应用环境变量覆盖
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config file {}", path.display()))?;
                let config: BackendConfig = serde_yaml::from_str(&raw)
                    .with_context(|| format!("Failed to parse config file {}", path.display()))?;
                info!(path = %path.display(), "Loaded backend config file");
                config
            }
            None => BackendConfig::default(),
        };

        config.apply_env();
        Ok(config)
    }

    /// 环境变量覆盖
    pub fn apply_env(&mut self) {
        if let Some(port) = env::var("SHELL_PORT").ok().and_then(|v| v.parse().ok()) {
            self.server.port = port;
        }

        let components = &mut self.components;
        override_from_env(&mut components.job_manager.server, "JOB_MANAGER_SERVER");
        override_from_env(
            &mut components.job_manager.path_jobgroups,
            "JOB_MANAGER_PATH_JOBGROUPS",
        );
        override_from_env(&mut components.aggregator.server, "AGGREGATOR_SERVER");
        override_from_env(&mut components.intelligence.server, "INTELLIGENCE_SERVER");
        override_from_env(&mut components.keycloak.server, "KEYCLOAK_SERVER");
        override_from_env(&mut components.keycloak.realm, "KEYCLOAK_REALM");
        override_from_env(&mut components.keycloak.client_id, "KEYCLOAK_CLIENT_ID");

        if let Some(secret) = env::var("KEYCLOAK_CLIENT_SECRET").ok().filter(|s| !s.is_empty()) {
            components.keycloak.client_secret = Some(secret);
        }
    }

    /// 监听地址
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn override_from_env(target: &mut String, key: &str) {
    if let Some(value) = env::var(key).ok().filter(|s| !s.is_empty()) {
        *target = value;
    }
}

/// 常量
pub mod constants {
    /// REST 路由前缀
    pub const API_PREFIX: &str = "/api/v3";

    /// 服务名
    pub const SERVICE_NAME: &str = "icos-shell-backend";

    /// 版本号
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_without_file() {
        let config = BackendConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.components.job_manager.path_jobgroups, "/jobmanager/groups");
        assert!(config.controllers.is_empty());
    }

    #[test]
    fn test_load_partial_yaml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "server:\n  port: 9090\ncomponents:\n  job_manager:\n    server: http://jm:8082\ncontrollers:\n  - name: ctrl-1\n    address: http://10.0.0.1:8080\n"
        )
        .unwrap();

        let config = BackendConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.components.job_manager.server, "http://jm:8082");
        // 未配置的字段保持默认值
        assert_eq!(config.components.job_manager.path_jobgroups, "/jobmanager/groups");
        assert_eq!(
            config.controllers,
            vec![Controller::new("ctrl-1", "http://10.0.0.1:8080")]
        );
    }

    #[test]
    fn test_load_missing_file_fails() {
        let result = BackendConfig::load(Some(Path::new("/nonexistent/icos/config.yaml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_override_from_env() {
        env::set_var("ICOS_TEST_OVERRIDE_KEY", "http://override");
        let mut value = "http://default".to_string();
        override_from_env(&mut value, "ICOS_TEST_OVERRIDE_KEY");
        assert_eq!(value, "http://override");

        env::remove_var("ICOS_TEST_OVERRIDE_KEY");
        let mut value = "http://default".to_string();
        override_from_env(&mut value, "ICOS_TEST_OVERRIDE_KEY");
        assert_eq!(value, "http://default");
    }

    #[test]
    fn test_keycloak_token_url() {
        let kc = KeycloakConfig {
            server: "https://kc.example/".to_string(),
            ..KeycloakConfig::default()
        };
        assert_eq!(
            kc.token_url(),
            "https://kc.example/realms/icos/protocol/openid-connect/token"
        );
    }
}
