//! 配置模块
//!
//! 后端：YAML 文件 + 环境变量覆盖；CLI：用户目录下的 YAML 配置文件

pub mod backend;
pub mod client;

pub use backend::BackendConfig;
pub use client::{default_config_path, ClientConfig};
