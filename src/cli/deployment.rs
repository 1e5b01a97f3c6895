//! 部署命令

use anyhow::{Context, Result};
use serde_json::Value;
use std::fs;
use std::path::Path;

use crate::cli::output::print_result;
use crate::client::ShellClient;
use crate::domain::Deployment;

/// `create deployment --file`：YAML 原文发送，保留多文档分隔符
pub async fn create(client: &ShellClient, file: &Path) -> Result<()> {
    let manifest = read_file(file)?;
    let result = client.create_deployment(&manifest).await;
    if let Some(deployment) = result.as_ref().ok().and_then(|r| created_deployment(&r.body)) {
        eprintln!("Deployment {} created", deployment.id);
    }
    print_result(result)
}

pub async fn list(client: &ShellClient) -> Result<()> {
    print_result(client.get_deployments().await)
}

pub async fn get_by_id(client: &ShellClient, id: &str) -> Result<()> {
    print_result(client.get_deployment_by_id(id).await)
}

/// `update deployment --id --file`：YAML 解码为 JSON 对象后发送
pub async fn update(client: &ShellClient, id: &str, file: &Path) -> Result<()> {
    let raw = read_file(file)?;
    let body = yaml_to_json(&raw).with_context(|| format!("Invalid YAML in {}", file.display()))?;
    print_result(client.update_deployment(id, body).await)
}

pub async fn delete(client: &ShellClient, id: &str) -> Result<()> {
    print_result(client.delete_deployment_by_id(id).await)
}

pub async fn start(client: &ShellClient, id: &str) -> Result<()> {
    print_result(client.start_deployment_by_id(id).await)
}

pub async fn stop(client: &ShellClient, id: &str) -> Result<()> {
    print_result(client.stop_deployment_by_id(id).await)
}

pub(crate) fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// job manager 返回的对象带 `id` 时视为部署对象
fn created_deployment(body: &Value) -> Option<Deployment> {
    serde_json::from_value(body.clone()).ok()
}

fn yaml_to_json(raw: &str) -> Result<Value> {
    let yaml: serde_yaml::Value = serde_yaml::from_str(raw)?;
    Ok(serde_json::to_value(yaml)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_yaml_to_json() {
        let v = yaml_to_json("name: app\nreplicas: 2\nlabels:\n  - a\n").unwrap();
        assert_eq!(v, json!({"name": "app", "replicas": 2, "labels": ["a"]}));
    }

    #[test]
    fn test_created_deployment_needs_id() {
        let d = created_deployment(&json!({"id": 4, "name": "app", "jobs": []})).unwrap();
        assert_eq!(d.id, 4);
        assert_eq!(d.name.as_deref(), Some("app"));
        assert!(created_deployment(&json!({"name": "app"})).is_none());
        assert!(created_deployment(&json!("accepted")).is_none());
    }

    #[test]
    fn test_read_missing_file() {
        let err = read_file(Path::new("/nonexistent/app.yaml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read"));
    }
}
