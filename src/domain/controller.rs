//! Controller 领域模型

use serde::{Deserialize, Serialize};

/// 可供 CLI 连接的 controller（由 lighthouse 提供列表）
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Controller {
    pub name: String,
    pub address: String,
}

impl Controller {
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
        }
    }

    /// 校验必填字段，返回第一个缺失字段的名称
    pub fn missing_field(&self) -> Option<&'static str> {
        if self.name.trim().is_empty() {
            Some("name")
        } else if self.address.trim().is_empty() {
            Some("address")
        } else {
            None
        }
    }
}
