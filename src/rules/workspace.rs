//! Workspace confinement: every path a tool touches must stay inside the
//! project root unless explicitly allowlisted.

use crate::config::WorkspaceConfig;
use crate::eval::{Decision, RuleContext};
use crate::pattern;
use crate::rules::protected::{PROTECTED_REASON, is_always_protected};

pub struct WorkspaceRule<'cfg> {
    allow: &'cfg [String],
    block: &'cfg [String],
}

impl<'cfg> WorkspaceRule<'cfg> {
    pub fn new(cfg: &'cfg WorkspaceConfig) -> Self {
        Self {
            allow: &cfg.allow,
            block: &cfg.block,
        }
    }

    pub fn evaluate(&self, ctx: &RuleContext) -> Decision {
        for path in ctx.paths {
            if is_always_protected(path) {
                return Decision::deny(PROTECTED_REASON);
            }
            if self.is_blocked(path) {
                return Decision::deny(format!("path is blocked by configuration: {path}"));
            }
            if self.violates_boundary(path) {
                return Decision::deny("cannot access paths outside the project workspace");
            }
        }
        Decision::allow()
    }

    fn is_blocked(&self, path: &str) -> bool {
        self.block.iter().any(|p| pattern::match_path(path, p))
    }

    fn is_allowed(&self, path: &str) -> bool {
        self.allow.iter().any(|p| pattern::match_path(path, p))
    }

    /// A path violates the boundary when its absolute form is neither the
    /// project root, under it, nor covered by an allow pattern. An
    /// undeterminable working directory fails closed.
    fn violates_boundary(&self, path: &str) -> bool {
        if path.is_empty() {
            return false;
        }

        let Ok(cwd) = std::env::current_dir() else {
            return true;
        };
        let cwd = pattern::clean(&cwd.to_string_lossy());
        let abs = pattern::resolve(path, &cwd);

        if abs == cwd || abs.starts_with(&format!("{cwd}/")) {
            return false;
        }

        !self.is_allowed(path)
    }
}
