//! Incremental rule: cap the number of locally modified files so changes
//! stay reviewable.

use crate::config::IncrementalConfig;
use crate::eval::{Decision, RuleContext, is_modification_tool};

/// Counts changed files; negative means the count could not be determined.
pub type ChangeCounter = fn() -> i64;

pub struct IncrementalRule {
    max_files: i64,
    warn_ratio: f64,
    counter: ChangeCounter,
}

impl IncrementalRule {
    pub fn new(cfg: &IncrementalConfig) -> Self {
        Self::with_counter(cfg, count_changed_files)
    }

    /// Build the rule with an explicit counter. The production counter shells
    /// out to git; tests inject a fixed value.
    pub fn with_counter(cfg: &IncrementalConfig, counter: ChangeCounter) -> Self {
        Self {
            max_files: cfg.max_files,
            warn_ratio: cfg.warn_ratio,
            counter,
        }
    }

    pub fn evaluate(&self, ctx: &RuleContext) -> Decision {
        if !is_modification_tool(ctx.tool_name) {
            return Decision::allow();
        }
        if self.max_files <= 0 {
            return Decision::allow();
        }

        let count = (self.counter)();
        if count < 0 {
            // Could not determine, let the change proceed
            return Decision::allow();
        }

        if count >= self.max_files {
            return Decision::deny(format!(
                "maximum modified files reached ({count}/{}), commit or review changes before continuing",
                self.max_files
            ));
        }

        if count >= self.warn_threshold() {
            return Decision::advise(format!(
                "approaching file limit: {count}/{} files modified, consider committing soon",
                self.max_files
            ));
        }

        Decision::allow()
    }

    fn warn_threshold(&self) -> i64 {
        let ratio = if self.warn_ratio <= 0.0 || self.warn_ratio >= 1.0 {
            0.7
        } else {
            self.warn_ratio
        };
        (self.max_files as f64 * ratio) as i64
    }
}

/// Count changed files via `git status --porcelain`, excluding untracked
/// and ignored entries. Returns -1 when the count cannot be determined.
fn count_changed_files() -> i64 {
    let output = match std::process::Command::new("git")
        .args(["status", "--porcelain"])
        .output()
    {
        Ok(output) if output.status.success() => output,
        _ => return -1,
    };

    count_status_lines(&String::from_utf8_lossy(&output.stdout))
}

fn count_status_lines(status: &str) -> i64 {
    status
        .trim()
        .lines()
        .filter(|line| line.len() >= 2 && !line.starts_with("??") && !line.starts_with("!!"))
        .count() as i64
}
