//! 部署相关领域模型

use serde::{Deserialize, Serialize};

/// Job manager 返回的部署对象
///
/// shell 只负责转发，不会构造或校验完整对象；除 `id` 外的字段一律透传
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Deployment {
    /// 部署唯一 ID
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optional_fields_are_skipped() {
        let d = Deployment {
            id: 7,
            name: None,
            status: Some("running".to_string()),
        };
        let v = serde_json::to_value(&d).unwrap();
        assert_eq!(v, serde_json::json!({"id": 7, "status": "running"}));
    }

    #[test]
    fn test_id_is_required() {
        let parsed: Result<Deployment, _> = serde_json::from_str(r#"{"name":"app"}"#);
        assert!(parsed.is_err());
    }
}
