//! Metrics 命令
//!
//! 描述文件（JSON）原样包在 `content` 中发送

use anyhow::Result;
use std::path::Path;

use crate::cli::deployment::read_file;
use crate::cli::output::print_result;
use crate::client::ShellClient;

pub async fn get(client: &ShellClient) -> Result<()> {
    print_result(client.get_metrics().await)
}

pub async fn train(client: &ShellClient, file: &Path) -> Result<()> {
    let descriptor = read_file(file)?;
    print_result(client.train_metrics(&descriptor).await)
}

pub async fn predict(client: &ShellClient, file: &Path) -> Result<()> {
    let descriptor = read_file(file)?;
    print_result(client.predict_metrics(&descriptor).await)
}

pub async fn delete(client: &ShellClient, file: &Path) -> Result<()> {
    let descriptor = read_file(file)?;
    print_result(client.delete_metrics(&descriptor).await)
}
