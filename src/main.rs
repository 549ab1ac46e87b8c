//! watchman: PreToolUse policy gate.
//!
//! Invoked without arguments it runs in hook mode: one JSON request on
//! stdin, a decision on stdout, exit code 0 (allow), 2 (deny), or 1
//! (engine failure). `init` writes a config template; `setup` registers
//! the binary as a PreToolUse hook in the agent's settings.

use std::io::Read;
use std::path::{Path, PathBuf};

use watchman::config::{self, Config};
use watchman::eval::{Decision, Evaluator, HookInput};
use watchman::logging;
use watchman::state::State;

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("init") => run_init(args.iter().any(|a| a == "--local")),
        Some("setup") => run_setup(),
        Some(other) => fatal(&format!("unknown command: {other}")),
        None => run_hook(),
    }
}

fn run_hook() {
    let cfg = match Config::load() {
        Ok(cfg) => cfg,
        Err(err) => fatal(&format!("cannot load config: {err}")),
    };

    let mut raw = String::new();
    if std::io::stdin().read_to_string(&mut raw).is_err() {
        fatal("cannot read stdin");
    }
    let input: HookInput = match serde_json::from_str(&raw) {
        Ok(input) => input,
        Err(err) => fatal(&format!("cannot decode input: {err}")),
    };

    let evaluator = Evaluator::new(&cfg);
    let mut decision = evaluator.evaluate(&input);

    if decision.allowed && !cfg.reminders.is_empty() {
        append_reminders(&cfg, &mut decision);
    }

    logging::log_decision(&input.tool_name, detail_of(&input), &decision);

    if decision.allowed {
        let mut output = serde_json::json!({"decision": "allow"});
        if !decision.warning.is_empty() {
            output["warning"] = serde_json::Value::String(decision.warning.clone());
            eprintln!("warning: {}", decision.warning);
        }
        println!("{output}");
        std::process::exit(0);
    }

    let output = serde_json::json!({"decision": "deny", "reason": decision.reason});
    println!("{output}");
    eprintln!("{}", decision.reason);
    std::process::exit(2);
}

/// Count this allowed invocation and surface any due reminders as warnings.
fn append_reminders(cfg: &Config, decision: &mut Decision) {
    let mut state = State::load();
    state.increment();
    let due = state.due_reminders(&cfg.reminders);
    state.save();

    if due.is_empty() {
        return;
    }
    let messages = due.join("; ");
    if decision.warning.is_empty() {
        decision.warning = messages;
    } else {
        decision.warning = format!("{}; {}", decision.warning, messages);
    }
}

/// A short human-readable handle on the request, for the decision log.
fn detail_of(input: &HookInput) -> &str {
    for field in ["command", "file_path", "path"] {
        if let Some(value) = input.tool_input.get(field).and_then(|v| v.as_str()) {
            return value;
        }
    }
    ""
}

fn run_init(local: bool) {
    let config_path: PathBuf;
    let mut config_dir: Option<PathBuf> = None;

    if local {
        let cwd = match std::env::current_dir() {
            Ok(cwd) => cwd,
            Err(err) => fatal(&format!("cannot get working directory: {err}")),
        };
        config_path = cwd.join(".watchman.yml");
    } else {
        let Some(home) = std::env::var_os("HOME") else {
            fatal("cannot get home directory");
        };
        let dir = Path::new(&home).join(".config/watchman");
        config_path = dir.join("config.yml");
        config_dir = Some(dir);
    }

    if config_path.exists() {
        println!("Config already exists: {}", config_path.display());
        std::process::exit(0);
    }

    if let Some(dir) = config_dir
        && let Err(err) = std::fs::create_dir_all(&dir)
    {
        fatal(&format!("cannot create config directory: {err}"));
    }

    if let Err(err) = std::fs::write(&config_path, config::DEFAULT_TEMPLATE) {
        fatal(&format!("cannot write config: {err}"));
    }

    println!("Created config: {}", config_path.display());
}

fn run_setup() {
    let Some(home) = std::env::var_os("HOME") else {
        fatal("cannot get home directory");
    };
    let claude_dir = Path::new(&home).join(".claude");
    let settings_path = claude_dir.join("settings.json");
    let binary_path = Path::new(&home).join(".cargo/bin/watchman");

    if let Err(err) = std::fs::create_dir_all(&claude_dir) {
        fatal(&format!("cannot create .claude directory: {err}"));
    }

    let mut settings: serde_json::Value = match std::fs::read_to_string(&settings_path) {
        Ok(data) if !data.is_empty() => match serde_json::from_str(&data) {
            Ok(value) => value,
            Err(err) => fatal(&format!("cannot parse settings.json: {err}")),
        },
        _ => serde_json::json!({}),
    };

    let Some(root) = settings.as_object_mut() else {
        fatal("settings.json root is not an object");
    };
    let hooks = root
        .entry("hooks")
        .or_insert_with(|| serde_json::json!({}));
    if !hooks.is_object() {
        *hooks = serde_json::json!({});
    }

    if has_watchman_hook(hooks.get("PreToolUse")) {
        println!("Watchman hook already configured");
        return;
    }

    hooks["PreToolUse"] = serde_json::json!([
        {
            "matcher": "*",
            "hooks": [
                {"type": "command", "command": binary_path.to_string_lossy()}
            ]
        }
    ]);

    let output = match serde_json::to_string_pretty(&settings) {
        Ok(output) => output,
        Err(err) => fatal(&format!("cannot marshal settings: {err}")),
    };
    if let Err(err) = std::fs::write(&settings_path, output) {
        fatal(&format!("cannot write settings.json: {err}"));
    }

    println!("Configured hook: {}", settings_path.display());
    println!("Run 'watchman init' to create watchman config");
}

fn has_watchman_hook(pre_tool_use: Option<&serde_json::Value>) -> bool {
    let Some(entries) = pre_tool_use.and_then(|v| v.as_array()) else {
        return false;
    };
    for entry in entries {
        let Some(hooks) = entry.get("hooks").and_then(|v| v.as_array()) else {
            continue;
        };
        for hook in hooks {
            if let Some(command) = hook.get("command").and_then(|v| v.as_str())
                && command.contains("watchman")
            {
                return true;
            }
        }
    }
    false
}

fn fatal(message: &str) -> ! {
    eprintln!("{message}");
    std::process::exit(1);
}
