//! External validator hooks: user-supplied child programs that contribute
//! decisions for matching tool calls.
//!
//! Each configured hook receives a JSON request on stdin and answers either
//! with a JSON decision on stdout or through its exit status. Hooks run
//! sequentially in configuration order; the first denial stops the chain.

use std::io::Write;
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::HookConfig;
use crate::eval::Decision;
use crate::pattern;

/// Seconds a hook may run when its config does not say otherwise.
const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Poll interval while waiting for a hook child to exit.
const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Request written to a hook child's stdin.
#[derive(Debug, Serialize)]
pub struct HookRequest<'a> {
    pub tool_name: &'a str,
    pub tool_input: &'a Map<String, Value>,
    pub paths: &'a [String],
    pub working_dir: String,
}

/// Decision read from a hook child's stdout.
#[derive(Debug, Deserialize)]
struct HookResponse {
    decision: String,
    #[serde(default)]
    reason: String,
    #[serde(default)]
    warning: String,
}

/// Run every matching hook in order. Deny reasons and warnings are prefixed
/// with the hook's name; warnings are joined with `; `.
pub fn run_hooks(
    hooks: &[HookConfig],
    tool_name: &str,
    tool_input: &Map<String, Value>,
    paths: &[String],
) -> Decision {
    let working_dir = std::env::current_dir()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_default();

    let request = HookRequest {
        tool_name,
        tool_input,
        paths,
        working_dir,
    };

    let mut warnings = Vec::new();

    for hook in hooks {
        if !matches(hook, tool_name, paths) {
            continue;
        }

        let result = execute(hook, &request);
        let label = hook_label(hook);

        if !result.allowed {
            return Decision::deny(format!("{label}: {}", result.reason));
        }
        if !result.warning.is_empty() {
            warnings.push(format!("{label}: {}", result.warning));
        }
    }

    if warnings.is_empty() {
        Decision::allow()
    } else {
        Decision::advise(warnings.join("; "))
    }
}

/// A hook matches when its tool list names the tool exactly and, if it
/// declares path globs, at least one extracted path matches one of them.
pub fn matches(hook: &HookConfig, tool_name: &str, paths: &[String]) -> bool {
    if !hook.tools.iter().any(|t| t == tool_name) {
        return false;
    }
    if hook.paths.is_empty() {
        return true;
    }
    paths
        .iter()
        .any(|p| hook.paths.iter().any(|g| pattern::match_glob(p, g)))
}

/// Spawn one hook child and interpret its verdict.
pub fn execute(hook: &HookConfig, request: &HookRequest) -> Decision {
    let mut child = match Command::new(&hook.command)
        .args(&hook.args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
    {
        Ok(child) => child,
        Err(err) => return on_error(hook, format!("failed to start hook: {err}")),
    };

    if let Some(mut stdin) = child.stdin.take() {
        // A child that never reads its stdin produces a broken pipe here;
        // its exit status still decides.
        let _ = serde_json::to_vec(request).map(|body| stdin.write_all(&body));
    }

    let timeout = Duration::from_secs(if hook.timeout == 0 {
        DEFAULT_TIMEOUT_SECS
    } else {
        hook.timeout
    });

    if !wait_with_deadline(&mut child, timeout) {
        let _ = child.kill();
        let _ = child.wait();
        return on_error(hook, format!("hook timed out after {}s", timeout.as_secs()));
    }

    let output = match child.wait_with_output() {
        Ok(output) => output,
        Err(err) => return on_error(hook, format!("failed to collect hook output: {err}")),
    };

    if let Ok(response) = serde_json::from_slice::<HookResponse>(&output.stdout) {
        match response.decision.as_str() {
            "allow" => return Decision::allow(),
            "deny" => {
                let reason = if response.reason.is_empty() {
                    "denied by hook".to_string()
                } else {
                    response.reason
                };
                return Decision::deny(reason);
            }
            "advise" => return Decision::advise(response.warning),
            // Unrecognized decision value: fall through to the exit status
            _ => {}
        }
    }

    if output.status.success() {
        return Decision::allow();
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    let reason = stderr.trim();
    if reason.is_empty() {
        Decision::deny(format!("hook exited with status {}", output.status))
    } else {
        Decision::deny(reason.to_string())
    }
}

/// Poll until the child exits or the deadline passes. Returns false on
/// deadline expiry.
fn wait_with_deadline(child: &mut Child, timeout: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    loop {
        match child.try_wait() {
            Ok(Some(_)) => return true,
            Ok(None) => {}
            Err(_) => return true, // let wait_with_output surface the error
        }
        if Instant::now() >= deadline {
            return false;
        }
        std::thread::sleep(POLL_INTERVAL);
    }
}

/// Apply the hook's failure policy: deny when configured, otherwise allow
/// with a warning.
fn on_error(hook: &HookConfig, detail: String) -> Decision {
    if hook.on_error == "deny" {
        Decision::deny(detail)
    } else {
        Decision::advise(detail)
    }
}

fn hook_label(hook: &HookConfig) -> &str {
    if hook.name.is_empty() {
        &hook.command
    } else {
        &hook.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn hook(command: &str, args: &[&str]) -> HookConfig {
        HookConfig {
            name: "test-hook".into(),
            command: command.into(),
            args: args.iter().map(|s| s.to_string()).collect(),
            tools: vec!["Write".into()],
            ..Default::default()
        }
    }

    fn request<'a>(tool_input: &'a Map<String, Value>, paths: &'a [String]) -> HookRequest<'a> {
        HookRequest {
            tool_name: "Write",
            tool_input,
            paths,
            working_dir: "/tmp".into(),
        }
    }

    #[test]
    fn matching_by_tool_and_path() {
        let mut h = hook("/bin/true", &[]);
        let paths = vec!["src/lib.rs".to_string()];

        assert!(matches(&h, "Write", &paths));
        assert!(!matches(&h, "write", &paths)); // case-sensitive
        assert!(!matches(&h, "Edit", &paths));

        h.paths = vec!["**/*.rs".into()];
        assert!(matches(&h, "Write", &paths));
        h.paths = vec!["**/*.go".into()];
        assert!(!matches(&h, "Write", &paths));
        assert!(!matches(&h, "Write", &[]));
    }

    #[test]
    fn json_allow_response() {
        let h = hook("sh", &["-c", r#"echo '{"decision":"allow"}'"#]);
        let input = Map::new();
        let d = execute(&h, &request(&input, &[]));
        assert!(d.allowed);
        assert!(d.warning.is_empty());
    }

    #[test]
    fn json_deny_response() {
        let h = hook(
            "sh",
            &["-c", r#"echo '{"decision":"deny","reason":"bad change"}'"#],
        );
        let input = Map::new();
        let d = execute(&h, &request(&input, &[]));
        assert!(!d.allowed);
        assert_eq!(d.reason, "bad change");
    }

    #[test]
    fn json_advise_response() {
        let h = hook(
            "sh",
            &["-c", r#"echo '{"decision":"advise","warning":"look twice"}'"#],
        );
        let input = Map::new();
        let d = execute(&h, &request(&input, &[]));
        assert!(d.allowed);
        assert_eq!(d.warning, "look twice");
    }

    #[test]
    fn exit_status_fallback() {
        let input = Map::new();

        let d = execute(&hook("sh", &["-c", "exit 0"]), &request(&input, &[]));
        assert!(d.allowed);

        let d = execute(
            &hook("sh", &["-c", "echo 'lint failed' >&2; exit 1"]),
            &request(&input, &[]),
        );
        assert!(!d.allowed);
        assert_eq!(d.reason, "lint failed");
    }

    #[test]
    fn child_reads_request_from_stdin() {
        // The child echoes the tool name it was given back as a deny reason
        let h = hook(
            "sh",
            &[
                "-c",
                r#"name=$(sed 's/.*"tool_name":"\([^"]*\)".*/\1/'); echo "{\"decision\":\"deny\",\"reason\":\"saw $name\"}""#,
            ],
        );
        let input = Map::new();
        let d = execute(&h, &request(&input, &[]));
        assert!(!d.allowed);
        assert_eq!(d.reason, "saw Write");
    }

    #[test]
    fn spawn_failure_applies_on_error_policy() {
        let input = Map::new();

        let h = hook("/nonexistent/validator", &[]);
        let d = execute(&h, &request(&input, &[]));
        assert!(d.allowed);
        assert!(d.warning.contains("failed to start hook"));

        let mut h = hook("/nonexistent/validator", &[]);
        h.on_error = "deny".into();
        let d = execute(&h, &request(&input, &[]));
        assert!(!d.allowed);
    }

    #[test]
    fn timeout_kills_child() {
        let mut h = hook("sh", &["-c", "sleep 30"]);
        h.timeout = 1;
        let input = Map::new();

        let started = Instant::now();
        let d = execute(&h, &request(&input, &[]));
        assert!(started.elapsed() < Duration::from_secs(10));
        assert!(d.allowed);
        assert!(d.warning.contains("timed out"));

        h.on_error = "deny".into();
        let d = execute(&h, &request(&input, &[]));
        assert!(!d.allowed);
        assert!(d.reason.contains("timed out"));
    }

    #[test]
    fn run_hooks_first_deny_wins_and_prefixes_name() {
        let input = json!({"file_path": "src/lib.rs"})
            .as_object()
            .unwrap()
            .clone();
        let paths = vec!["src/lib.rs".to_string()];

        let allow = HookConfig {
            name: "first".into(),
            command: "sh".into(),
            args: vec!["-c".into(), r#"echo '{"decision":"allow"}'"#.into()],
            tools: vec!["Write".into()],
            ..Default::default()
        };
        let deny = HookConfig {
            name: "second".into(),
            command: "sh".into(),
            args: vec![
                "-c".into(),
                r#"echo '{"decision":"deny","reason":"stop"}'"#.into(),
            ],
            tools: vec!["Write".into()],
            ..Default::default()
        };

        let d = run_hooks(&[allow, deny], "Write", &input, &paths);
        assert!(!d.allowed);
        assert_eq!(d.reason, "second: stop");
    }

    #[test]
    fn run_hooks_accumulates_warnings() {
        let input = Map::new();
        let advise = |name: &str, warning: &str| HookConfig {
            name: name.into(),
            command: "sh".into(),
            args: vec![
                "-c".into(),
                format!(r#"echo '{{"decision":"advise","warning":"{warning}"}}'"#),
            ],
            tools: vec!["Write".into()],
            ..Default::default()
        };

        let d = run_hooks(
            &[advise("a", "one"), advise("b", "two")],
            "Write",
            &input,
            &[],
        );
        assert!(d.allowed);
        assert_eq!(d.warning, "a: one; b: two");
    }

    #[test]
    fn run_hooks_skips_non_matching() {
        let input = Map::new();
        let deny = HookConfig {
            name: "gate".into(),
            command: "sh".into(),
            args: vec!["-c".into(), "exit 1".into()],
            tools: vec!["Edit".into()],
            ..Default::default()
        };
        let d = run_hooks(&[deny], "Write", &input, &[]);
        assert!(d.allowed);
    }
}
