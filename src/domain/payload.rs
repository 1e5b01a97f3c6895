//! 转发请求体
//!
//! CLI 把原始文档包在 `{"content": "..."}` 里发送，后端在转发前解包，
//! 保证 YAML 多文档分隔符等格式原样到达上游

use serde_json::{Map, Value};

/// 请求体中承载原始文档的字段名
pub const CONTENT_FIELD: &str = "content";

/// 发往上游的请求体
#[derive(Debug, Clone, PartialEq)]
pub enum UpstreamBody {
    Empty,
    /// 原始 YAML 文本
    Yaml(String),
    /// 原始 JSON 文本（不重新编码）
    RawJson(String),
    /// 需要序列化的 JSON 值
    Json(Value),
}

impl UpstreamBody {
    /// 部署创建：`content` 为必填字符串
    pub fn deployment_manifest(body: &Map<String, Value>) -> Result<Self, String> {
        match body.get(CONTENT_FIELD) {
            Some(Value::String(content)) => Ok(Self::Yaml(content.clone())),
            Some(_) => Err(format!("field '{}' must be a string", CONTENT_FIELD)),
            None => Err(format!("required field '{}' is missing", CONTENT_FIELD)),
        }
    }

    /// Metrics 请求：有 `content` 字符串则原样转发，否则转发整个对象
    pub fn metrics(body: Map<String, Value>) -> Self {
        match body.get(CONTENT_FIELD) {
            Some(Value::String(content)) => Self::RawJson(content.clone()),
            _ => Self::Json(Value::Object(body)),
        }
    }

    pub fn content_type(&self) -> Option<&'static str> {
        match self {
            Self::Empty => None,
            Self::Yaml(_) => Some("application/x-yaml"),
            Self::RawJson(_) | Self::Json(_) => Some("application/json"),
        }
    }

    /// 编码为请求字节
    pub fn into_bytes(self) -> Result<Vec<u8>, serde_json::Error> {
        match self {
            Self::Empty => Ok(Vec::new()),
            Self::Yaml(s) | Self::RawJson(s) => Ok(s.into_bytes()),
            Self::Json(v) => serde_json::to_vec(&v),
        }
    }
}

/// 把原始文档包装成 `{"content": ...}`，供 CLI 使用
pub fn wrap_content(raw: impl Into<String>) -> Value {
    let mut map = Map::new();
    map.insert(CONTENT_FIELD.to_string(), Value::String(raw.into()));
    Value::Object(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn as_map(v: Value) -> Map<String, Value> {
        match v {
            Value::Object(m) => m,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn test_deployment_manifest_keeps_document_separators() {
        let yaml = "name: a\n---\nname: b\n";
        let body = UpstreamBody::deployment_manifest(&as_map(wrap_content(yaml))).unwrap();
        assert_eq!(body, UpstreamBody::Yaml(yaml.to_string()));
        assert_eq!(body.content_type(), Some("application/x-yaml"));
        assert_eq!(body.into_bytes().unwrap(), yaml.as_bytes());
    }

    #[test]
    fn test_deployment_manifest_requires_content() {
        let err = UpstreamBody::deployment_manifest(&as_map(json!({"name": "x"}))).unwrap_err();
        assert!(err.contains("content"));

        let err = UpstreamBody::deployment_manifest(&as_map(json!({"content": 3}))).unwrap_err();
        assert!(err.contains("must be a string"));
    }

    #[test]
    fn test_metrics_body_variants() {
        let raw = UpstreamBody::metrics(as_map(wrap_content("{\"model\":\"cpu\"}")));
        assert_eq!(raw, UpstreamBody::RawJson("{\"model\":\"cpu\"}".to_string()));

        let plain = UpstreamBody::metrics(as_map(json!({"metric_id": "m1"})));
        assert_eq!(plain, UpstreamBody::Json(json!({"metric_id": "m1"})));
        assert_eq!(plain.content_type(), Some("application/json"));
    }
}
