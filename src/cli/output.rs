//! 输出格式化

use anyhow::Result;
use serde::Serialize;

use crate::client::{ApiResponse, ClientError};

/// 成功时把 body 以缩进 JSON 打印到 stdout；失败时把错误（及后端返回的 body）打印到 stderr
pub fn print_result<T: Serialize>(result: Result<ApiResponse<T>, ClientError>) -> Result<()> {
    match result {
        Ok(response) => {
            println!("{}", pretty_json(&response.body)?);
            Ok(())
        }
        Err(e) => {
            if let ClientError::UnexpectedStatus { body, .. } = &e {
                if !body.is_empty() {
                    eprintln!("{}", pretty_text(body));
                }
            }
            Err(e.into())
        }
    }
}

pub fn pretty_json<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// 若文本是 JSON 则缩进，否则原样返回
pub fn pretty_text(text: &str) -> String {
    serde_json::from_str::<serde_json::Value>(text)
        .ok()
        .and_then(|v| serde_json::to_string_pretty(&v).ok())
        .unwrap_or_else(|| text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pretty_text() {
        assert_eq!(pretty_text("{\"a\":1}"), "{\n  \"a\": 1\n}");
        assert_eq!(pretty_text("plain error"), "plain error");
    }
}
