//! CLI 配置文件
//!
//! ```yaml
//! controller: http://controller:8080
//! lighthouse: http://lighthouse:8080
//! auth_token: eyJhbGciOi...
//! keycloak:
//!   user: alice
//!   pass: secret
//! ```
//!
//! 未识别的键在重写时保留

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// 默认配置文件路径：`<config dir>/icos-shell/config.yaml`
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("icos-shell")
        .join("config.yaml")
}

/// 登录凭据
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Credentials {
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub pass: String,
}

/// CLI 持久化配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub controller: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lighthouse: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keycloak: Option<Credentials>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl ClientConfig {
    /// 读取配置；文件不存在时返回空配置
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&raw).with_context(|| format!("Failed to parse config {}", path.display()))
    }

    /// 写回配置文件（必要时创建目录）
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let raw = serde_yaml::to_string(self).context("Failed to encode config")?;
        fs::write(path, raw).with_context(|| format!("Failed to write config {}", path.display()))
    }

    pub fn credentials(&self) -> Credentials {
        self.keycloak.clone().unwrap_or_default()
    }
}
