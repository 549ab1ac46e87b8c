//! The evaluation pipeline: compose tool filters, the protected-path
//! oracle, the enabled semantic rules, and external hooks with fixed
//! precedence and first-denial-wins semantics.

pub mod context;
pub mod decision;

pub use context::{
    FILESYSTEM_TOOLS, MODIFICATION_TOOLS, RuleContext, is_filesystem_tool, is_modification_tool,
};
pub use decision::Decision;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::config::Config;
use crate::hooks;
use crate::paths::extract_paths;
use crate::rules::incremental::{ChangeCounter, IncrementalRule};
use crate::rules::{
    InvariantsRule, PROTECTED_REASON, Rule, ScopeRule, VersioningRule, WorkspaceRule,
    is_always_protected,
};

/// The request read from stdin, as delivered by the tool runtime.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct HookInput {
    pub hook_type: String,
    pub tool_name: String,
    pub tool_input: Map<String, Value>,
}

/// Evaluates one tool call against the loaded configuration.
pub struct Evaluator<'cfg> {
    cfg: &'cfg Config,
    counter: Option<ChangeCounter>,
}

impl<'cfg> Evaluator<'cfg> {
    pub fn new(cfg: &'cfg Config) -> Self {
        Self { cfg, counter: None }
    }

    /// Replace the changed-file counter (tests inject fixed counts).
    pub fn with_counter(cfg: &'cfg Config, counter: ChangeCounter) -> Self {
        Self {
            cfg,
            counter: Some(counter),
        }
    }

    pub fn evaluate(&self, input: &HookInput) -> Decision {
        let tool = input.tool_name.as_str();

        if self.is_tool_blocked(tool) {
            return Decision::deny(format!("tool is blocked by configuration: {tool}"));
        }
        if !self.is_tool_allowed(tool) {
            return Decision::deny(format!("tool is not in allowed list: {tool}"));
        }

        // Non-filesystem tools have nothing to gate
        if !is_filesystem_tool(tool) {
            return Decision::allow();
        }

        let command = if tool == "Bash" {
            input.tool_input.get("command").and_then(Value::as_str)
        } else {
            None
        };

        if let Some(cmd) = command
            && let Some(pattern) = self.blocked_command(cmd)
        {
            return Decision::deny(format!("command is blocked by configuration: {pattern}"));
        }

        let paths = extract_paths(tool, &input.tool_input);
        if paths.iter().any(|p| is_always_protected(p)) {
            return Decision::deny(PROTECTED_REASON);
        }

        let content = input.tool_input.get("content").and_then(Value::as_str);
        let ctx = RuleContext {
            tool_name: tool,
            command,
            paths: &paths,
            content,
        };

        let mut warnings = Vec::new();

        for rule in self.enabled_rules() {
            let decision = rule.evaluate(&ctx);
            if !decision.allowed {
                return decision;
            }
            if !decision.warning.is_empty() {
                warnings.push(decision.warning);
            }
        }

        if !self.cfg.hooks.is_empty() {
            let decision = hooks::run_hooks(&self.cfg.hooks, tool, &input.tool_input, &paths);
            if !decision.allowed {
                return decision;
            }
            if !decision.warning.is_empty() {
                warnings.push(decision.warning);
            }
        }

        if warnings.is_empty() {
            Decision::allow()
        } else {
            Decision::advise(warnings.join("; "))
        }
    }

    /// The enabled rules, in evaluation order.
    fn enabled_rules(&self) -> Vec<Rule<'cfg>> {
        let mut rules = Vec::new();
        if self.cfg.rules.workspace {
            rules.push(Rule::Workspace(WorkspaceRule::new(&self.cfg.workspace)));
        }
        if self.cfg.rules.scope {
            rules.push(Rule::Scope(ScopeRule::new(&self.cfg.scope)));
        }
        if self.cfg.rules.versioning {
            rules.push(Rule::Versioning(VersioningRule::new(&self.cfg.versioning)));
        }
        if self.cfg.rules.incremental {
            let rule = match self.counter {
                Some(counter) => IncrementalRule::with_counter(&self.cfg.incremental, counter),
                None => IncrementalRule::new(&self.cfg.incremental),
            };
            rules.push(Rule::Incremental(rule));
        }
        if self.cfg.rules.invariants {
            rules.push(Rule::Invariants(InvariantsRule::new(&self.cfg.invariants)));
        }
        rules
    }

    fn is_tool_blocked(&self, tool: &str) -> bool {
        self.cfg
            .tools
            .block
            .iter()
            .any(|t| t.eq_ignore_ascii_case(tool))
    }

    fn is_tool_allowed(&self, tool: &str) -> bool {
        self.cfg.tools.allow.is_empty()
            || self
                .cfg
                .tools
                .allow
                .iter()
                .any(|t| t.eq_ignore_ascii_case(tool))
    }

    /// Match a command against the block patterns: patterns with whitespace
    /// are substring matches, single words must appear in command position.
    fn blocked_command(&self, command: &str) -> Option<&str> {
        for pattern in &self.cfg.commands.block {
            if pattern.contains(char::is_whitespace) {
                if command.contains(pattern.as_str()) {
                    return Some(pattern);
                }
                continue;
            }
            if crate::parse::is_command_in_position(command, pattern) {
                return Some(pattern);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bash_input(command: &str) -> HookInput {
        HookInput {
            hook_type: "PreToolUse".into(),
            tool_name: "Bash".into(),
            tool_input: json!({"command": command}).as_object().unwrap().clone(),
        }
    }

    fn tool_input(tool: &str, fields: Value) -> HookInput {
        HookInput {
            hook_type: "PreToolUse".into(),
            tool_name: tool.into(),
            tool_input: fields.as_object().unwrap().clone(),
        }
    }

    fn bare_config() -> Config {
        // Everything off: isolates the pipeline stages under test
        Config::default()
    }

    #[test]
    fn tool_blocklist_denies_case_insensitively() {
        let mut cfg = bare_config();
        cfg.tools.block = vec!["webfetch".into()];
        let evaluator = Evaluator::new(&cfg);
        let d = evaluator.evaluate(&tool_input("WebFetch", json!({})));
        assert!(!d.allowed);
        assert!(d.reason.contains("blocked by configuration"));
    }

    #[test]
    fn tool_allowlist_denies_others() {
        let mut cfg = bare_config();
        cfg.tools.allow = vec!["read".into(), "bash".into()];
        let evaluator = Evaluator::new(&cfg);
        assert!(evaluator.evaluate(&bash_input("ls")).allowed);
        assert!(
            evaluator
                .evaluate(&tool_input("Read", json!({"file_path": "x"})))
                .allowed
        );
        let d = evaluator.evaluate(&tool_input("Write", json!({"file_path": "x"})));
        assert!(!d.allowed);
        assert!(d.reason.contains("not in allowed list"));
    }

    #[test]
    fn non_filesystem_tools_allowed() {
        let cfg = bare_config();
        let evaluator = Evaluator::new(&cfg);
        assert!(
            evaluator
                .evaluate(&tool_input("WebSearch", json!({"query": "rust"})))
                .allowed
        );
    }

    #[test]
    fn command_block_single_word_is_positional() {
        let mut cfg = bare_config();
        cfg.commands.block = vec!["dd".into()];
        let evaluator = Evaluator::new(&cfg);

        assert!(!evaluator.evaluate(&bash_input("dd if=/dev/zero")).allowed);
        assert!(!evaluator.evaluate(&bash_input("ls | dd of=x")).allowed);
        assert!(evaluator.evaluate(&bash_input("cd pkg/odd/file")).allowed);
    }

    #[test]
    fn command_block_with_space_is_substring() {
        let mut cfg = bare_config();
        cfg.commands.block = vec!["rm -rf /".into()];
        let evaluator = Evaluator::new(&cfg);

        assert!(!evaluator.evaluate(&bash_input("rm -rf / --no-preserve-root")).allowed);
        assert!(evaluator.evaluate(&bash_input("rm -rf ./build")).allowed);
    }

    #[test]
    fn protected_paths_denied_without_any_rules() {
        let cfg = bare_config();
        let evaluator = Evaluator::new(&cfg);
        let d = evaluator.evaluate(&tool_input(
            "Write",
            json!({"file_path": ".watchman.yml", "content": "rules: {}"}),
        ));
        assert!(!d.allowed);
        assert_eq!(d.reason, PROTECTED_REASON);
    }

    #[test]
    fn workspace_rule_gates_read() {
        let mut cfg = bare_config();
        cfg.rules.workspace = true;
        let evaluator = Evaluator::new(&cfg);

        let d = evaluator.evaluate(&tool_input("Read", json!({"file_path": "/etc/passwd"})));
        assert!(!d.allowed);
        assert_eq!(d.reason, "cannot access paths outside the project workspace");

        assert!(
            evaluator
                .evaluate(&tool_input("Read", json!({"file_path": "src/lib.rs"})))
                .allowed
        );
    }

    #[test]
    fn workspace_rule_gates_bash_env_values() {
        let mut cfg = bare_config();
        cfg.rules.workspace = true;
        let evaluator = Evaluator::new(&cfg);
        let d = evaluator.evaluate(&bash_input("GOMODCACHE=/var/cache/mod go test ./..."));
        assert!(!d.allowed);
    }

    #[test]
    fn scope_rule_applies_to_writes_only() {
        let mut cfg = bare_config();
        cfg.rules.scope = true;
        cfg.scope.allow = vec!["src/**/*.go".into()];
        let evaluator = Evaluator::new(&cfg);

        assert!(
            !evaluator
                .evaluate(&tool_input("Write", json!({"file_path": "vendor/lib.go"})))
                .allowed
        );
        assert!(
            evaluator
                .evaluate(&tool_input("Write", json!({"file_path": "src/app/main.go"})))
                .allowed
        );
        assert!(
            evaluator
                .evaluate(&tool_input("Read", json!({"file_path": "vendor/lib.go"})))
                .allowed
        );
    }

    #[test]
    fn versioning_rule_applies_to_bash() {
        let mut cfg = bare_config();
        cfg.rules.versioning = true;
        cfg.versioning.commit.require_uppercase = true;
        let evaluator = Evaluator::new(&cfg);

        let d = evaluator.evaluate(&bash_input("git commit -m \"lowercase\""));
        assert!(!d.allowed);
        assert!(
            evaluator
                .evaluate(&bash_input("git commit -m \"Uppercase\""))
                .allowed
        );
    }

    #[test]
    fn incremental_rule_denies_and_warns() {
        let mut cfg = bare_config();
        cfg.rules.incremental = true;
        cfg.incremental.max_files = 10;

        let evaluator = Evaluator::with_counter(&cfg, || 10);
        let d = evaluator.evaluate(&tool_input("Write", json!({"file_path": "a.txt"})));
        assert!(!d.allowed);

        let evaluator = Evaluator::with_counter(&cfg, || 8);
        let d = evaluator.evaluate(&tool_input("Write", json!({"file_path": "a.txt"})));
        assert!(d.allowed);
        assert!(d.warning.contains("8/10"));

        let evaluator = Evaluator::with_counter(&cfg, || -1);
        assert!(
            evaluator
                .evaluate(&tool_input("Write", json!({"file_path": "a.txt"})))
                .allowed
        );
    }

    #[test]
    fn first_denial_stops_pipeline() {
        // Workspace denies before versioning would even run
        let mut cfg = bare_config();
        cfg.rules.workspace = true;
        cfg.rules.versioning = true;
        cfg.versioning.operations.block = vec!["push".into()];
        let evaluator = Evaluator::new(&cfg);

        let d = evaluator.evaluate(&bash_input("git push /etc/passwd"));
        assert!(!d.allowed);
        assert_eq!(d.reason, "cannot access paths outside the project workspace");
    }

    #[test]
    fn hooks_run_after_rules() {
        let mut cfg = bare_config();
        cfg.hooks = vec![crate::config::HookConfig {
            name: "gatekeeper".into(),
            command: "sh".into(),
            args: vec![
                "-c".into(),
                r#"echo '{"decision":"deny","reason":"not today"}'"#.into(),
            ],
            tools: vec!["Write".into()],
            ..Default::default()
        }];
        let evaluator = Evaluator::new(&cfg);

        let d = evaluator.evaluate(&tool_input("Write", json!({"file_path": "src/a.rs"})));
        assert!(!d.allowed);
        assert_eq!(d.reason, "gatekeeper: not today");

        // The hook names only Write; Bash sails through
        assert!(evaluator.evaluate(&bash_input("ls")).allowed);
    }

    #[test]
    fn warnings_accumulate_across_rules_and_hooks() {
        let mut cfg = bare_config();
        cfg.rules.incremental = true;
        cfg.incremental.max_files = 10;
        cfg.hooks = vec![crate::config::HookConfig {
            name: "style".into(),
            command: "sh".into(),
            args: vec![
                "-c".into(),
                r#"echo '{"decision":"advise","warning":"tabs found"}'"#.into(),
            ],
            tools: vec!["Write".into()],
            ..Default::default()
        }];

        let evaluator = Evaluator::with_counter(&cfg, || 9);
        let d = evaluator.evaluate(&tool_input("Write", json!({"file_path": "a.txt"})));
        assert!(d.allowed);
        assert!(d.warning.contains("9/10"));
        assert!(d.warning.contains("style: tabs found"));
        assert!(d.warning.contains("; "));
    }

    #[test]
    fn notebook_edit_passes_the_filesystem_gate() {
        // NotebookEdit is a modification tool but not a filesystem tool, so
        // it is admitted before the path-based rules run
        let mut cfg = bare_config();
        cfg.rules.scope = true;
        cfg.scope.allow = vec!["src/**".into()];
        let evaluator = Evaluator::new(&cfg);
        assert!(
            evaluator
                .evaluate(&tool_input(
                    "NotebookEdit",
                    json!({"file_path": "elsewhere/nb.ipynb"})
                ))
                .allowed
        );
    }

    #[test]
    fn empty_command_is_allowed() {
        let mut cfg = bare_config();
        cfg.rules.workspace = true;
        cfg.rules.versioning = true;
        let evaluator = Evaluator::new(&cfg);
        assert!(evaluator.evaluate(&bash_input("")).allowed);
    }
}
