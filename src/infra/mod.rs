//! 基础设施模块
//!
//! 封装外部依赖（上游 HTTP client）

pub mod upstream;

pub use upstream::{ForwardError, UpstreamClient, UpstreamRequest, UpstreamResponse};
