//! Per-tool extraction of the path-like strings a tool call would touch.

use serde_json::{Map, Value};

use crate::parse;

/// Collect every path candidate from a tool invocation.
///
/// For `Bash` this is the parsed command's positional args, non-empty flag
/// values, and env assignment values; file tools contribute their target
/// fields. Non-filesystem tools yield nothing. Empty strings are dropped.
pub fn extract_paths(tool_name: &str, tool_input: &Map<String, Value>) -> Vec<String> {
    let mut paths = match tool_name {
        "Bash" => bash_paths(tool_input),
        "Read" | "Write" | "Edit" | "NotebookEdit" => field_values(tool_input, &["file_path"]),
        "Glob" => field_values(tool_input, &["path", "pattern"]),
        "Grep" => field_values(tool_input, &["path"]),
        _ => Vec::new(),
    };
    paths.retain(|p| !p.is_empty());
    paths
}

fn bash_paths(tool_input: &Map<String, Value>) -> Vec<String> {
    let Some(command) = tool_input.get("command").and_then(Value::as_str) else {
        return Vec::new();
    };
    let cmd = parse::parse(command);

    let mut paths = cmd.args;
    for (_, value) in cmd.flags {
        if !value.is_empty() {
            paths.push(value);
        }
    }
    for (_, value) in cmd.env {
        paths.push(value);
    }
    paths
}

fn field_values(tool_input: &Map<String, Value>, fields: &[&str]) -> Vec<String> {
    fields
        .iter()
        .filter_map(|f| tool_input.get(*f).and_then(Value::as_str))
        .map(String::from)
        .collect()
}
