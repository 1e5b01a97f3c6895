//! icos-shell 命令行
//!
//! 每个命令对应后端的一个端点：解析参数 → 一次请求 → 打印结果

pub mod auth;
pub mod controller;
pub mod deployment;
pub mod metrics;
pub mod output;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::client::ShellClient;
use crate::config::{default_config_path, ClientConfig};

#[derive(Parser, Debug)]
#[command(name = "icos-shell")]
#[command(about = "icos-shell - a CLI tool to interface with ICOS components", long_about = None)]
pub struct Args {
    /// 配置文件（默认 <config dir>/icos-shell/config.yaml）
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Controller 地址（覆盖配置文件）
    #[arg(long, env = "CONTROLLER", global = true)]
    pub controller: Option<String>,

    /// 认证 token（覆盖配置文件）
    #[arg(long = "token", env = "ICOS_AUTH_TOKEN", global = true, hide_env_values = true)]
    pub auth_token: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Login into ICOS and store the token in the config file
    Login {
        /// One Time Pad token in case user has 2FA enabled
        #[arg(long)]
        otp: Option<String>,
    },
    /// Create a resource
    Create {
        #[command(subcommand)]
        target: CreateTarget,
    },
    /// Display one or many resources
    Get {
        #[command(subcommand)]
        target: GetTarget,
    },
    /// Update a resource
    Update {
        #[command(subcommand)]
        target: UpdateTarget,
    },
    /// Delete a resource
    Delete {
        #[command(subcommand)]
        target: DeleteTarget,
    },
    /// Start existing resources related to a deployment
    Start {
        #[command(subcommand)]
        target: DeploymentTarget,
    },
    /// Remove all existing resources related to a deployment
    #[command(visible_alias = "unregister")]
    Stop {
        #[command(subcommand)]
        target: DeploymentTarget,
    },
    /// Train a model through the Intelligence API
    Train {
        #[command(subcommand)]
        target: MetricsTarget,
    },
    /// Predict values based on supplied data
    Predict {
        #[command(subcommand)]
        target: MetricsTarget,
    },
    /// Add a resource
    Add {
        #[command(subcommand)]
        target: AddTarget,
    },
}

#[derive(Subcommand, Debug)]
pub enum CreateTarget {
    /// Create a deployment from a YAML descriptor
    Deployment {
        #[arg(long, short)]
        file: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
pub enum GetTarget {
    /// List deployments, or show one with --id
    Deployment {
        #[arg(long)]
        id: Option<String>,
    },
    /// Show available resources
    Resource,
    /// Show trained metrics models
    Metrics,
    /// List controllers
    Controller,
}

#[derive(Subcommand, Debug)]
pub enum UpdateTarget {
    /// Update a deployment from a YAML descriptor
    Deployment {
        #[arg(long)]
        id: String,
        #[arg(long, short)]
        file: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
pub enum DeleteTarget {
    Deployment {
        #[arg(long)]
        id: String,
    },
    /// Delete metrics described by a JSON file
    Metrics {
        #[arg(long, short)]
        file: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
pub enum DeploymentTarget {
    Deployment {
        #[arg(long)]
        id: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum MetricsTarget {
    /// ML metrics descriptor JSON file
    Metrics {
        #[arg(long, short)]
        file: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
pub enum AddTarget {
    Controller {
        #[arg(long)]
        name: String,
        #[arg(long)]
        address: String,
    },
}

/// 一次 CLI 调用的上下文
pub struct Session {
    pub config_path: PathBuf,
    pub config: ClientConfig,
    /// 命令行 / 环境变量指定的 controller
    pub controller: Option<String>,
    /// 命令行 / 环境变量指定的 token
    pub auth_token: Option<String>,
}

impl Session {
    pub fn load(args: &Args) -> Result<Self> {
        let config_path = args.config.clone().unwrap_or_else(default_config_path);
        let config = ClientConfig::load(&config_path)?;

        Ok(Self {
            config_path,
            config,
            controller: args.controller.clone().filter(|s| !s.is_empty()),
            auth_token: args.auth_token.clone().filter(|s| !s.is_empty()),
        })
    }

    /// 生效的 controller 地址
    pub fn controller(&self) -> Option<String> {
        self.controller
            .clone()
            .or_else(|| self.config.controller.clone())
            .filter(|s| !s.is_empty())
    }

    /// 生效的 token
    pub fn token(&self) -> Option<String> {
        self.auth_token
            .clone()
            .or_else(|| self.config.auth_token.clone())
            .filter(|s| !s.is_empty())
    }

    /// 连接 controller 的客户端；未配置 controller 时向 lighthouse 询问
    pub async fn controller_client(&mut self) -> Result<ShellClient> {
        let address = match self.controller() {
            Some(address) => address,
            None => {
                eprintln!("Controller not defined, asking lighthouse for a controller...");
                controller::discover_and_save(self)
                    .await?
                    .context("No controllers in the lighthouse either")?
            }
        };

        Ok(ShellClient::new(&address)?.with_token(self.token()))
    }

    pub fn save(&self) -> Result<()> {
        self.config.save(&self.config_path)
    }
}

/// 执行 CLI
pub async fn run(args: Args) -> Result<()> {
    let mut session = Session::load(&args)?;

    let command = match args.command {
        Some(command) => command,
        None => return run_root(&mut session).await,
    };

    let client = session.controller_client().await?;
    if !matches!(command, Command::Login { .. }) && session.token().is_none() {
        eprintln!("No auth token found, run `icos-shell login` first");
    }

    match command {
        Command::Login { otp } => auth::login(&client, &mut session, otp).await.map(|_| ()),
        Command::Create {
            target: CreateTarget::Deployment { file },
        } => deployment::create(&client, &file).await,
        Command::Get { target } => match target {
            GetTarget::Deployment { id: Some(id) } => deployment::get_by_id(&client, &id).await,
            GetTarget::Deployment { id: None } => deployment::list(&client).await,
            GetTarget::Resource => output::print_result(client.get_resources().await),
            GetTarget::Metrics => metrics::get(&client).await,
            GetTarget::Controller => controller::list(&client).await,
        },
        Command::Update {
            target: UpdateTarget::Deployment { id, file },
        } => deployment::update(&client, &id, &file).await,
        Command::Delete { target } => match target {
            DeleteTarget::Deployment { id } => deployment::delete(&client, &id).await,
            DeleteTarget::Metrics { file } => metrics::delete(&client, &file).await,
        },
        Command::Start {
            target: DeploymentTarget::Deployment { id },
        } => deployment::start(&client, &id).await,
        Command::Stop {
            target: DeploymentTarget::Deployment { id },
        } => deployment::stop(&client, &id).await,
        Command::Train {
            target: MetricsTarget::Metrics { file },
        } => metrics::train(&client, &file).await,
        Command::Predict {
            target: MetricsTarget::Metrics { file },
        } => metrics::predict(&client, &file).await,
        Command::Add {
            target: AddTarget::Controller { name, address },
        } => controller::add(&client, name, address).await,
    }
}

/// 无子命令：有 controller 时做健康检查，否则向 lighthouse 获取 controller 列表
async fn run_root(session: &mut Session) -> Result<()> {
    if let Some(address) = session.controller() {
        let client = ShellClient::new(&address)?.with_token(session.token());
        return output::print_result(client.healthcheck().await);
    }

    if session.config.lighthouse.as_deref().map_or(true, str::is_empty) {
        bail!("Lighthouse not defined");
    }

    println!("Retrieving controllers from lighthouse...");
    if controller::discover_and_save(session).await?.is_none() {
        bail!("Please, add a controller to the config file");
    }
    Ok(())
}
