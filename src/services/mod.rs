//! 业务服务模块
//!
//! 请求转发与响应归一化

pub mod forwarder;
pub mod normalizer;

pub use forwarder::{Forwarder, UpstreamRoute};
