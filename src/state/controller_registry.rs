//! Controller 注册表
//!
//! lighthouse 提供的 controller 列表：启动时由配置预置，可通过 API 追加

use tokio::sync::RwLock;

use crate::domain::Controller;

/// 追加失败原因
#[derive(Debug, PartialEq, Eq)]
pub enum RegisterError {
    /// 同名 controller 已存在
    Duplicate(String),
}

/// Controller 注册表
pub struct ControllerRegistry {
    controllers: RwLock<Vec<Controller>>,
}

impl ControllerRegistry {
    pub fn new(initial: Vec<Controller>) -> Self {
        Self {
            controllers: RwLock::new(initial),
        }
    }

    /// 按注册顺序返回所有 controller
    pub async fn list(&self) -> Vec<Controller> {
        let controllers = self.controllers.read().await;
        controllers.clone()
    }

    /// 追加 controller，名称必须唯一
    pub async fn register(&self, controller: Controller) -> Result<Controller, RegisterError> {
        let mut controllers = self.controllers.write().await;
        if controllers.iter().any(|c| c.name == controller.name) {
            return Err(RegisterError::Duplicate(controller.name));
        }
        controllers.push(controller.clone());
        Ok(controller)
    }
}

impl Default for ControllerRegistry {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_register_keeps_order() {
        let registry = ControllerRegistry::new(vec![Controller::new("a", "http://a")]);
        registry.register(Controller::new("b", "http://b")).await.unwrap();

        let names: Vec<String> = registry.list().await.into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(registry.list().await.len(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_name_rejected() {
        let registry = ControllerRegistry::default();
        registry.register(Controller::new("a", "http://a")).await.unwrap();

        let err = registry
            .register(Controller::new("a", "http://other"))
            .await
            .unwrap_err();
        assert_eq!(err, RegisterError::Duplicate("a".to_string()));
        assert_eq!(registry.list().await.len(), 1);
    }
}
