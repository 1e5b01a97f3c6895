//! 领域模型
//!
//! 后端与 CLI 共用的数据结构

pub mod controller;
pub mod deployment;
pub mod payload;
pub mod user;

pub use controller::Controller;
pub use deployment::Deployment;
pub use payload::UpstreamBody;
pub use user::LoginQuery;
