//! Invariants rule: declarative structural checks applied to file
//! modifications (coexistence, content, imports, naming, required files).
//! Regex-based throughout; no syntax trees.

use std::path::Path;

use regex::Regex;

use crate::config::{
    CoexistenceCheck, ContentCheck, ImportCheck, InvariantsConfig, NamingCheck, RequiredCheck,
};
use crate::eval::{Decision, RuleContext, is_modification_tool};
use crate::pattern;

pub struct InvariantsRule<'cfg> {
    cfg: &'cfg InvariantsConfig,
}

impl<'cfg> InvariantsRule<'cfg> {
    pub fn new(cfg: &'cfg InvariantsConfig) -> Self {
        Self { cfg }
    }

    pub fn evaluate(&self, ctx: &RuleContext) -> Decision {
        if !is_modification_tool(ctx.tool_name) {
            return Decision::allow();
        }

        let content = ctx.content.unwrap_or("");
        for path in ctx.paths {
            let checks = [
                self.check_coexistence(path),
                self.check_content(path, content),
                self.check_imports(path, content),
                self.check_naming(path),
                self.check_required(path),
            ];
            if let Some(decision) = checks.into_iter().flatten().next() {
                return decision;
            }
        }
        Decision::allow()
    }

    /// A file matching `if` must be accompanied by its `require` counterpart
    /// on disk.
    fn check_coexistence(&self, path: &str) -> Option<Decision> {
        for check in &self.cfg.coexistence {
            if !pattern::match_glob(path, &check.if_pattern) {
                continue;
            }
            let required = render_requirement(&check.require, path);
            if !Path::new(&required).exists() {
                return Some(violation(
                    &check.name,
                    &check.message,
                    format!("required companion file is missing: {required}"),
                ));
            }
        }
        None
    }

    fn check_content(&self, path: &str, content: &str) -> Option<Decision> {
        for check in &self.cfg.content {
            if !pattern::match_glob_list(path, &check.paths) {
                continue;
            }
            if !check.require.is_empty()
                && let Ok(re) = Regex::new(&check.require)
                && !re.is_match(content)
            {
                return Some(violation(
                    &check.name,
                    &check.message,
                    format!("content must match: {}", check.require),
                ));
            }
            if !check.forbid.is_empty()
                && let Ok(re) = Regex::new(&check.forbid)
                && re.is_match(content)
            {
                return Some(violation(
                    &check.name,
                    &check.message,
                    format!("content must not match: {}", check.forbid),
                ));
            }
        }
        None
    }

    /// Line-wise forbidden-import scan; each entry's `forbid` regex defines
    /// what counts as an import statement.
    fn check_imports(&self, path: &str, content: &str) -> Option<Decision> {
        for check in &self.cfg.imports {
            if !pattern::match_glob_list(path, &check.paths) {
                continue;
            }
            let Ok(re) = Regex::new(&check.forbid) else {
                continue;
            };
            if let Some(line) = content.lines().find(|line| re.is_match(line)) {
                return Some(violation(
                    &check.name,
                    &check.message,
                    format!("forbidden import: {}", line.trim()),
                ));
            }
        }
        None
    }

    fn check_naming(&self, path: &str) -> Option<Decision> {
        for check in &self.cfg.naming {
            if !pattern::match_glob_list(path, &check.paths) {
                continue;
            }
            let Ok(re) = Regex::new(&check.pattern) else {
                continue;
            };
            let filename = pattern::basename(path);
            if !re.is_match(filename) {
                return Some(violation(
                    &check.name,
                    &check.message,
                    format!("filename {filename} does not match {}", check.pattern),
                ));
            }
        }
        None
    }

    /// Directories matching `dirs` must contain the `require` file, gated by
    /// an optional `when` trigger.
    fn check_required(&self, path: &str) -> Option<Decision> {
        let cleaned = pattern::clean(path);
        let dir = pattern::dirname(&cleaned);
        for check in &self.cfg.required {
            if !pattern::match_glob(dir, &check.dirs) {
                continue;
            }
            if !check.when.is_empty() && !dir_contains_match(dir, &check.when) {
                continue;
            }
            if !Path::new(dir).join(&check.require).exists() {
                return Some(violation(
                    &check.name,
                    &check.message,
                    format!("{dir} must contain {}", check.require),
                ));
            }
        }
        None
    }
}

/// Render a coexistence requirement template for a triggering path.
///
/// `${name}` is the file stem, `${ext}` the extension including its dot,
/// `${base}` the stem with a trailing `_test` stripped. A rendered value
/// with no separator resolves next to the triggering file.
fn render_requirement(template: &str, path: &str) -> String {
    let filename = pattern::basename(path);
    let (name, ext) = match filename.rfind('.') {
        Some(idx) if idx > 0 => (&filename[..idx], &filename[idx..]),
        _ => (filename, ""),
    };
    let base = name.strip_suffix("_test").unwrap_or(name);

    let rendered = template
        .replace("${name}", name)
        .replace("${ext}", ext)
        .replace("${base}", base);

    if rendered.contains('/') || rendered.starts_with('/') {
        rendered
    } else {
        let dir = pattern::dirname(path);
        if dir == "." {
            rendered
        } else {
            format!("{dir}/{rendered}")
        }
    }
}

fn dir_contains_match(dir: &str, when: &str) -> bool {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return false;
    };
    entries
        .flatten()
        .any(|e| pattern::match_glob(&e.file_name().to_string_lossy(), when))
}

fn violation(name: &str, message: &str, detail: String) -> Decision {
    let explanation = if message.is_empty() {
        detail
    } else {
        message.to_string()
    };
    Decision::deny(format!("invariant '{name}' violated: {explanation}"))
}
