//! Text console: stands in for the voice platform so orders can be taken
//! by typing tool calls.

use barista_core::IntentKind;
use serde_json::{Map, Value, json};

/// One line typed at the console.
#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleCommand {
    Empty,
    Help,
    Status,
    Order,
    Quit,
    Call { tool: String, params: Value },
}

pub const HELP: &str = "\
Type a tool call, one per line:
  set_drink_type latte
  set_size medium
  set_milk oat
  add_extra caramel
  set_name Sam Lee
  complete_order
Arguments may also be JSON, e.g. set_name {\"name\": \"Sam\"}.
Console commands: :status, :order, :help, :quit";

/// Parse a console line.
///
/// `<tool> <text>` passes the rest of the line verbatim as the tool's
/// single argument, so multi-word values like "whipped cream" need no
/// quoting.
pub fn parse_line(line: &str) -> Result<ConsoleCommand, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(ConsoleCommand::Empty);
    }

    match line {
        ":help" | ":h" => return Ok(ConsoleCommand::Help),
        ":status" => return Ok(ConsoleCommand::Status),
        ":order" => return Ok(ConsoleCommand::Order),
        ":quit" | ":q" | ":exit" => return Ok(ConsoleCommand::Quit),
        _ if line.starts_with(':') => return Err(format!("Unknown console command: {line}")),
        _ => {}
    }

    let (tool, rest) = match line.split_once(char::is_whitespace) {
        Some((tool, rest)) => (tool, rest.trim()),
        None => (line, ""),
    };

    let params = if rest.starts_with('{') {
        serde_json::from_str::<Value>(rest).map_err(|e| format!("Invalid JSON arguments: {e}"))?
    } else {
        match IntentKind::from_tool_name(tool).and_then(|kind| kind.argument()) {
            Some(arg) if !rest.is_empty() => json!({ arg: rest }),
            _ => Value::Object(Map::new()),
        }
    };

    Ok(ConsoleCommand::Call {
        tool: tool.to_string(),
        params,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_console_commands() {
        assert_eq!(parse_line("   ").unwrap(), ConsoleCommand::Empty);
        assert_eq!(parse_line(":status").unwrap(), ConsoleCommand::Status);
        assert_eq!(parse_line(":q").unwrap(), ConsoleCommand::Quit);
        assert!(parse_line(":dance").is_err());
    }

    #[test]
    fn test_tool_with_multi_word_argument() {
        assert_eq!(
            parse_line("add_extra whipped cream").unwrap(),
            ConsoleCommand::Call {
                tool: "add_extra".into(),
                params: json!({"extra": "whipped cream"}),
            }
        );
    }

    #[test]
    fn test_tool_with_json_arguments() {
        assert_eq!(
            parse_line(r#"set_name {"name": "Sam"}"#).unwrap(),
            ConsoleCommand::Call {
                tool: "set_name".into(),
                params: json!({"name": "Sam"}),
            }
        );
        assert!(parse_line("set_name {oops").is_err());
    }

    #[test]
    fn test_tool_without_argument() {
        assert_eq!(
            parse_line("complete_order").unwrap(),
            ConsoleCommand::Call {
                tool: "complete_order".into(),
                params: json!({}),
            }
        );
        // Missing argument is left for the tool to reject
        assert_eq!(
            parse_line("set_size").unwrap(),
            ConsoleCommand::Call {
                tool: "set_size".into(),
                params: json!({}),
            }
        );
    }
}
