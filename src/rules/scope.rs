//! Scope rule: file modifications must land inside the declared globs.

use crate::config::ScopeConfig;
use crate::eval::{Decision, RuleContext, is_modification_tool};
use crate::pattern;

pub struct ScopeRule<'cfg> {
    allow: &'cfg [String],
    block: &'cfg [String],
}

impl<'cfg> ScopeRule<'cfg> {
    pub fn new(cfg: &'cfg ScopeConfig) -> Self {
        Self {
            allow: &cfg.allow,
            block: &cfg.block,
        }
    }

    pub fn evaluate(&self, ctx: &RuleContext) -> Decision {
        if !is_modification_tool(ctx.tool_name) {
            return Decision::allow();
        }

        for path in ctx.paths {
            if self.is_blocked(path) {
                return Decision::deny(format!("path is blocked by scope configuration: {path}"));
            }
            if !self.is_in_scope(path) {
                return Decision::deny(format!("path is outside allowed scope: {path}"));
            }
        }
        Decision::allow()
    }

    fn is_blocked(&self, path: &str) -> bool {
        self.block.iter().any(|p| pattern::match_glob(path, p))
    }

    /// An empty allow list keeps every path in scope.
    fn is_in_scope(&self, path: &str) -> bool {
        self.allow.is_empty() || self.allow.iter().any(|p| pattern::match_glob(path, p))
    }
}
