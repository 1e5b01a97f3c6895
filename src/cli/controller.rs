//! Controller 命令与选择
//!
//! 未配置 controller 时从 lighthouse 获取列表，通过编号选择后写入配置文件

use anyhow::Result;
use std::io::{self, BufRead, Write};

use crate::cli::output::print_result;
use crate::cli::Session;
use crate::client::ShellClient;
use crate::domain::Controller;

pub async fn list(client: &ShellClient) -> Result<()> {
    print_result(client.get_controllers().await)
}

pub async fn add(client: &ShellClient, name: String, address: String) -> Result<()> {
    print_result(client.add_controller(&Controller::new(name, address)).await)
}

/// 向 lighthouse 获取 controller 并让用户选择，选中后写入配置文件
pub async fn discover_and_save(session: &mut Session) -> Result<Option<String>> {
    let lighthouse = match session.config.lighthouse.clone().filter(|s| !s.is_empty()) {
        Some(lighthouse) => lighthouse,
        None => {
            eprintln!("Lighthouse not defined");
            return Ok(None);
        }
    };

    let client = ShellClient::new(&lighthouse)?;
    let controllers = match client.get_controllers().await {
        Ok(response) => response.body,
        Err(e) => {
            eprintln!("Error fetching controllers: {}", e);
            return Ok(None);
        }
    };

    if controllers.is_empty() {
        eprintln!("No controllers found.");
        return Ok(None);
    }

    let stdin = io::stdin();
    let selected = select_controller(&controllers, &mut stdin.lock(), &mut io::stderr())?;

    let Some(selected) = selected else {
        return Ok(None);
    };

    session.config.controller = Some(selected.address.clone());
    session.save()?;
    println!("Controller selected: {} ({})", selected.name, selected.address);

    Ok(Some(selected.address))
}

/// 打印编号列表并读取选择；只有一个时直接选中，空输入表示取消
pub fn select_controller<R: BufRead, W: Write>(
    controllers: &[Controller],
    input: &mut R,
    output: &mut W,
) -> Result<Option<Controller>> {
    if let [only] = controllers {
        return Ok(Some(only.clone()));
    }

    writeln!(output, "Available controllers:\n")?;
    for (i, controller) in controllers.iter().enumerate() {
        writeln!(output, "  [{}] {} ({})", i + 1, controller.name, controller.address)?;
    }

    loop {
        write!(output, "\nSelect a controller (1-{}, empty to cancel): ", controllers.len())?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        match line.parse::<usize>() {
            Ok(n) if (1..=controllers.len()).contains(&n) => {
                return Ok(Some(controllers[n - 1].clone()));
            }
            _ => writeln!(output, "Invalid selection: {}", line)?,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn controllers() -> Vec<Controller> {
        vec![
            Controller::new("ctrl-a", "http://a:8080"),
            Controller::new("ctrl-b", "http://b:8080"),
        ]
    }

    #[test]
    fn test_select_by_number_after_invalid_input() {
        let mut input = Cursor::new("9\nfoo\n2\n");
        let mut output: Vec<u8> = Vec::new();

        let selected = select_controller(&controllers(), &mut input, &mut output).unwrap();
        assert_eq!(selected.map(|c| c.name), Some("ctrl-b".to_string()));

        let printed = String::from_utf8(output).unwrap();
        assert!(printed.contains("[1] ctrl-a (http://a:8080)"));
        assert!(printed.contains("Invalid selection: 9"));
    }

    #[test]
    fn test_empty_input_cancels() {
        let mut input = Cursor::new("\n");
        let selected = select_controller(&controllers(), &mut input, &mut Vec::<u8>::new()).unwrap();
        assert!(selected.is_none());
    }

    #[test]
    fn test_single_controller_is_selected_without_prompt() {
        let only = vec![Controller::new("solo", "http://solo")];
        let mut output: Vec<u8> = Vec::new();
        let selected = select_controller(&only, &mut Cursor::new(""), &mut output).unwrap();
        assert_eq!(selected, Some(only[0].clone()));
        assert!(output.is_empty());
    }
}
