//! ICOS Shell 后端
//!
//! 把部署 / 资源 / metrics 请求转发到上游组件
//!
//! Usage:
//! - `icos-shell-backend --config config.yaml`
//! - `icos-shell-backend --port 8080`

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use icos_shell::config::BackendConfig;

#[derive(Parser, Debug)]
#[command(name = "icos-shell-backend")]
#[command(about = "ICOS shell backend (request forwarder)", long_about = None)]
struct Args {
    /// YAML 配置文件
    #[arg(long, env = "SHELL_CONFIG")]
    config: Option<PathBuf>,

    /// 覆盖监听端口
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut config = BackendConfig::load(args.config.as_deref())?;
    if let Some(port) = args.port {
        config.server.port = port;
    }

    icos_shell::server::run(config, icos_shell::server::shutdown_signal()).await
}
