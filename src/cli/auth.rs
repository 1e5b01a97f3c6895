//! 登录命令

use anyhow::{bail, Result};
use reqwest::StatusCode;

use crate::cli::Session;
use crate::client::ShellClient;
use crate::domain::LoginQuery;

/// 用配置文件中的凭据登录；成功时把 token 写回配置文件并返回
///
/// 任何失败都不会修改配置文件
pub async fn login(client: &ShellClient, session: &mut Session, otp: Option<String>) -> Result<String> {
    let credentials = session.config.credentials();
    if credentials.user.is_empty() || credentials.pass.is_empty() {
        bail!(
            "keycloak.user / keycloak.pass are not set in {}",
            session.config_path.display()
        );
    }

    let query = LoginQuery {
        username: Some(credentials.user),
        password: Some(credentials.pass),
        otp: otp.filter(|s| !s.is_empty()),
    };

    let response = match client.login_user(&query).await {
        Ok(response) => response,
        Err(e) => {
            tracing::debug!(error = %e, "Login request failed");
            return Err(e.into());
        }
    };

    if response.status != StatusCode::OK {
        bail!("Wrong status code received: {}", response.status);
    }
    if response.body.is_empty() {
        bail!("Token received is empty");
    }

    let token = response.body;
    println!("ICOS_AUTH_TOKEN={}", token);

    session.config.auth_token = Some(token.clone());
    session.save()?;
    eprintln!("Token received and added to the config file");

    Ok(token)
}
