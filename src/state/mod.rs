//! 运行时状态模块

pub mod app_state;
pub mod controller_registry;

pub use app_state::AppState;
pub use controller_registry::ControllerRegistry;
