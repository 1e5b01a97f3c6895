//! ICOS Shell
//!
//! 后端（请求转发 + 响应归一化）与 CLI 客户端共用的库

pub mod error;
pub mod middleware;
pub mod infra;
pub mod domain;
pub mod config;
pub mod state;
pub mod api;
pub mod services;
pub mod server;
pub mod client;
pub mod cli;
