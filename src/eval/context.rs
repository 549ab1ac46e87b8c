//! Per-invocation context handed to each rule.

/// Tools that touch the filesystem; everything else is allowed outright.
pub const FILESYSTEM_TOOLS: &[&str] = &["Bash", "Read", "Write", "Edit", "Glob", "Grep"];

/// Tools that modify files; scope, incremental, and invariant rules apply
/// only to these.
pub const MODIFICATION_TOOLS: &[&str] = &["Write", "Edit", "NotebookEdit"];

pub fn is_filesystem_tool(tool: &str) -> bool {
    FILESYSTEM_TOOLS.contains(&tool)
}

pub fn is_modification_tool(tool: &str) -> bool {
    MODIFICATION_TOOLS.contains(&tool)
}

/// Everything a rule may inspect about the current tool call.
#[derive(Debug)]
pub struct RuleContext<'a> {
    /// The tool being invoked.
    pub tool_name: &'a str,
    /// The shell command, present only for `Bash`.
    pub command: Option<&'a str>,
    /// Path candidates extracted for this invocation.
    pub paths: &'a [String],
    /// Incoming file content, when the tool supplies one.
    pub content: Option<&'a str>,
}
