//! Versioning rule: blocked VCS operations, workflow enforcement, protected
//! branches, and commit message constraints for `git`/`jj` commands.

use regex::Regex;

use crate::config::VersioningConfig;
use crate::eval::{Decision, RuleContext};

pub struct VersioningRule<'cfg> {
    cfg: &'cfg VersioningConfig,
}

impl<'cfg> VersioningRule<'cfg> {
    pub fn new(cfg: &'cfg VersioningConfig) -> Self {
        Self { cfg }
    }

    pub fn evaluate(&self, ctx: &RuleContext) -> Decision {
        let Some(command) = ctx.command else {
            return Decision::allow();
        };
        self.evaluate_command(command)
    }

    pub fn evaluate_command(&self, command: &str) -> Decision {
        if !is_vcs_command(command) {
            return Decision::allow();
        }

        if let Some(blocked) = self.blocked_operation(command) {
            return Decision::deny(format!("operation blocked by configuration: {blocked}"));
        }

        if let Some(reason) = self.violates_workflow(command) {
            return Decision::deny(reason);
        }

        if is_commit_command(command) {
            return self.evaluate_commit(command);
        }

        Decision::allow()
    }

    fn blocked_operation(&self, command: &str) -> Option<&str> {
        self.cfg
            .operations
            .block
            .iter()
            .find(|op| command.contains(op.as_str()))
            .map(String::as_str)
    }

    fn violates_workflow(&self, command: &str) -> Option<&'static str> {
        match self.cfg.workflow.as_str() {
            "linear" if command.contains("git merge") || command.contains("jj merge") => {
                Some("workflow is linear: use rebase instead of merge")
            }
            "merge" if command.contains("git rebase") || command.contains("jj rebase") => {
                Some("workflow is merge-based: use merge instead of rebase")
            }
            _ => None,
        }
    }

    fn evaluate_commit(&self, command: &str) -> Decision {
        if self.cfg.tool == "jj" && command.contains("git commit") {
            return Decision::deny("prefer jj over git: use 'jj commit' instead of 'git commit'");
        }

        if let Some(branch) = extract_branch(command)
            && self.cfg.branches.protected.iter().any(|p| p == branch)
        {
            return Decision::deny(format!(
                "cannot commit directly to protected branch: {branch}"
            ));
        }

        let Some(message) = extract_commit_message(command) else {
            return Decision::allow();
        };

        let commit = &self.cfg.commit;

        if commit.max_length > 0 && message.len() as i64 > commit.max_length {
            return Decision::deny(format!(
                "commit message exceeds max length of {}",
                commit.max_length
            ));
        }

        if commit.require_uppercase
            && let Some(first) = message.chars().next()
            && first.is_alphabetic()
            && !first.is_uppercase()
        {
            return Decision::deny("commit message must start with uppercase letter");
        }

        if commit.no_period && message.ends_with('.') {
            return Decision::deny("commit message must not end with period");
        }

        if commit.require_period && !message.ends_with('.') {
            return Decision::deny("commit message must end with period");
        }

        if commit.single_line && message.contains('\n') {
            return Decision::deny("commit message must be single line (no body)");
        }

        if commit.forbid_colons && message.contains(':') {
            return Decision::deny(
                "commit message must not contain colons (no conventional commit prefixes)",
            );
        }

        if !commit.prefix_pattern.is_empty()
            && let Ok(re) = Regex::new(&format!("^{}", commit.prefix_pattern))
            && !re.is_match(&message)
        {
            return Decision::deny(format!(
                "commit message must match prefix pattern: {}",
                commit.prefix_pattern
            ));
        }

        Decision::allow()
    }
}

fn is_vcs_command(command: &str) -> bool {
    command.contains("git ") || command.contains("jj ")
}

fn is_commit_command(command: &str) -> bool {
    command.contains("git commit") || command.contains("jj commit")
}

/// The token following ` -b `, used for branch-creation detection.
fn extract_branch(command: &str) -> Option<&str> {
    let (_, rest) = command.split_once(" -b ")?;
    rest.split_whitespace().next()
}

/// Pull the commit message out of a command, trying `-m`/`--message` forms
/// first and falling back to a bare heredoc.
///
/// Heuristic by design: arbitrarily nested quoting and command substitution
/// beyond `"$(cat <<DELIM ...)"` are not recovered.
fn extract_commit_message(command: &str) -> Option<String> {
    for marker in [" -m ", " --message ", " --message=", " -m="] {
        if let Some(idx) = command.find(marker) {
            return extract_quoted_or_word(&command[idx + marker.len()..]);
        }
    }

    if command.contains("<<") {
        return extract_heredoc_message(command);
    }

    None
}

fn extract_quoted_or_word(s: &str) -> Option<String> {
    let s = s.trim_start();
    if s.is_empty() {
        return None;
    }

    if let Some(rest) = s.strip_prefix("\"$(cat <<") {
        return extract_heredoc_body(rest);
    }

    if let Some(rest) = s.strip_prefix('"')
        && let Some(end) = find_closing_quote(rest, '"')
        && end > 0
    {
        return Some(rest[..end].to_string());
    }

    if let Some(rest) = s.strip_prefix('\'')
        && let Some(end) = find_closing_quote(rest, '\'')
        && end > 0
    {
        return Some(rest[..end].to_string());
    }

    s.split_whitespace().next().map(String::from)
}

/// Position of the closing quote, honoring backslash escapes.
fn find_closing_quote(s: &str, quote: char) -> Option<usize> {
    let mut escaped = false;
    for (i, c) in s.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        if c == '\\' {
            escaped = true;
            continue;
        }
        if c == quote {
            return Some(i);
        }
    }
    None
}

/// Extract the body of a `<<DELIM ... DELIM` heredoc in the command.
fn extract_heredoc_message(command: &str) -> Option<String> {
    let idx = command.find("<<")?;
    let rest = command[idx + 2..].trim_start();

    let (delimiter, body) = if let Some(quoted) = rest.strip_prefix('\'') {
        let end = quoted.find('\'')?;
        if end == 0 {
            return None;
        }
        (&quoted[..end], &quoted[end + 1..])
    } else {
        let delimiter = rest.split_whitespace().next()?;
        (delimiter, rest.strip_prefix(delimiter).unwrap_or(rest))
    };

    let body = body.trim_start();
    let end = body.find(delimiter)?;
    if end == 0 {
        return None;
    }
    Some(body[..end].trim().to_string())
}

/// Extract the body of `"$(cat <<DELIM ... DELIM)"`; `rest` starts right
/// after the `<<`.
fn extract_heredoc_body(rest: &str) -> Option<String> {
    let rest = rest.strip_prefix('\'').unwrap_or(rest);

    let delim_end = rest.find(['\'', '\n'])?;
    let delimiter = &rest[..delim_end];
    if delimiter.is_empty() {
        return None;
    }
    let body = &rest[delim_end + 1..];

    let end = body.find(delimiter)?;
    if end == 0 {
        return None;
    }
    Some(body[..end].trim().to_string())
}
