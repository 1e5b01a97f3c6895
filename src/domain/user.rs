//! 登录相关模型

use serde::{Deserialize, Serialize};

/// `GET /user/login` 查询参数
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginQuery {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    /// 开启 2FA 时的一次性口令
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub otp: Option<String>,
}

/// 身份服务 token 端点响应（只取需要的字段）
#[derive(Debug, Clone, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
}
