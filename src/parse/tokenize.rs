//! Quote-aware tokenization and [`ParsedCommand`] assembly.

use super::types::{ParsedCommand, SUBCOMMAND_PROGRAMS};

/// Split a command into whitespace-separated tokens, respecting quotes.
///
/// Single quotes take everything literally up to the closing quote. Double
/// quotes suppress splitting but honor backslash escapes. A bare backslash
/// outside single quotes escapes the next character. Quote characters are
/// consumed, not emitted. Unterminated quotes run to end of input.
pub fn tokenize(cmd: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let (mut sq, mut dq, mut esc) = (false, false, false);

    for c in cmd.chars() {
        if esc {
            current.push(c);
            esc = false;
            continue;
        }
        match c {
            '\\' => {
                if sq {
                    current.push(c);
                } else {
                    esc = true;
                }
            }
            '\'' => {
                if dq {
                    current.push(c);
                } else {
                    sq = !sq;
                }
            }
            '"' => {
                if sq {
                    current.push(c);
                } else {
                    dq = !dq;
                }
            }
            ' ' | '\t' => {
                if sq || dq {
                    current.push(c);
                } else if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            _ => current.push(c),
        }
    }

    if !current.is_empty() {
        tokens.push(current);
    }

    tokens
}

/// Parse a shell command string into its components.
pub fn parse(cmd: &str) -> ParsedCommand {
    let mut result = ParsedCommand {
        raw: cmd.to_string(),
        ..Default::default()
    };

    let trimmed = cmd.trim();
    if trimmed.is_empty() {
        return result;
    }

    let tokens = tokenize(trimmed);
    let mut idx = 0;

    // Leading environment assignments
    while idx < tokens.len() {
        match split_env_assignment(&tokens[idx]) {
            Some((name, value)) => {
                insert_pair(&mut result.env, name.to_string(), value.to_string());
                idx += 1;
            }
            None => break,
        }
    }

    if idx >= tokens.len() {
        return result;
    }

    result.program = tokens[idx].clone();
    idx += 1;

    // Subcommand: non-flag token immediately after a known multi-command program
    if idx < tokens.len()
        && !tokens[idx].starts_with('-')
        && SUBCOMMAND_PROGRAMS.contains(&result.program.as_str())
    {
        result.subcommand = tokens[idx].clone();
        idx += 1;
    }

    // Remaining tokens: flags and positional args
    while idx < tokens.len() {
        let token = &tokens[idx];
        if token.starts_with('-') {
            let (key, mut value) = split_flag(token);
            // Adopt the next token as the flag value only when it cannot be
            // a path: path-like tokens must stay visible to path extraction.
            if value.is_empty()
                && idx + 1 < tokens.len()
                && !tokens[idx + 1].starts_with('-')
                && !tokens[idx + 1].starts_with('.')
                && !tokens[idx + 1].contains('/')
            {
                value = tokens[idx + 1].clone();
                idx += 1;
            }
            insert_pair(&mut result.flags, key.to_string(), value);
        } else {
            result.args.push(token.clone());
        }
        idx += 1;
    }

    result
}

/// Split `NAME=value` when `NAME` matches `[A-Z_][A-Z0-9_]*`.
fn split_env_assignment(token: &str) -> Option<(&str, &str)> {
    let eq = token.find('=')?;
    let name = &token[..eq];
    let mut chars = name.chars();
    let first = chars.next()?;
    if !(first.is_ascii_uppercase() || first == '_') {
        return None;
    }
    if !chars.all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_') {
        return None;
    }
    Some((name, &token[eq + 1..]))
}

/// Split a flag token at its first `=`, keeping the leading dashes.
fn split_flag(token: &str) -> (&str, String) {
    match token.find('=') {
        Some(eq) => (&token[..eq], token[eq + 1..].to_string()),
        None => (token, String::new()),
    }
}

/// Insert or overwrite a key in an insertion-ordered pair list.
fn insert_pair(pairs: &mut Vec<(String, String)>, key: String, value: String) {
    if let Some(existing) = pairs.iter_mut().find(|(k, _)| *k == key) {
        existing.1 = value;
    } else {
        pairs.push((key, value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenize_simple() {
        assert_eq!(tokenize("ls -la /tmp"), vec!["ls", "-la", "/tmp"]);
    }

    #[test]
    fn tokenize_tabs_and_runs_of_whitespace() {
        assert_eq!(tokenize("go\ttest\t./..."), vec!["go", "test", "./..."]);
        assert_eq!(tokenize("go   test   ./..."), vec!["go", "test", "./..."]);
        assert!(tokenize("").is_empty());
    }

    #[test]
    fn tokenize_single_quoted() {
        assert_eq!(tokenize("echo 'hello world'"), vec!["echo", "hello world"]);
    }

    #[test]
    fn tokenize_double_quoted_escape() {
        assert_eq!(tokenize(r#"echo "a \" b""#), vec!["echo", "a \" b"]);
    }

    #[test]
    fn tokenize_backslash_space() {
        assert_eq!(tokenize(r"cat my\ file"), vec!["cat", "my file"]);
    }

    #[test]
    fn tokenize_backslash_literal_in_single_quotes() {
        assert_eq!(tokenize(r"echo 'a\b'"), vec!["echo", r"a\b"]);
    }

    #[test]
    fn tokenize_unterminated_quote_runs_to_end() {
        assert_eq!(tokenize("echo \"a b c"), vec!["echo", "a b c"]);
        assert_eq!(tokenize("echo 'x y"), vec!["echo", "x y"]);
    }

    #[test]
    fn parse_empty() {
        let cmd = parse("");
        assert!(cmd.program.is_empty());
        assert!(cmd.args.is_empty());
        assert!(cmd.env.is_empty());
        assert!(cmd.flags.is_empty());
    }

    #[test]
    fn parse_program_and_args() {
        let cmd = parse("ls -la /tmp");
        assert_eq!(cmd.program, "ls");
        assert!(cmd.subcommand.is_empty());
        assert_eq!(cmd.args, vec!["/tmp"]);
        assert!(cmd.has_flag("-la"));
    }

    #[test]
    fn parse_env_assignments() {
        let cmd = parse("GOOS=linux GOARCH=arm64 go build ./...");
        assert_eq!(
            cmd.env,
            vec![
                ("GOOS".to_string(), "linux".to_string()),
                ("GOARCH".to_string(), "arm64".to_string()),
            ]
        );
        assert_eq!(cmd.program, "go");
        assert_eq!(cmd.subcommand, "build");
        assert_eq!(cmd.args, vec!["./..."]);
    }

    #[test]
    fn parse_lowercase_assignment_is_not_env() {
        let cmd = parse("foo=bar ls");
        assert!(cmd.env.is_empty());
        assert_eq!(cmd.program, "foo=bar");
    }

    #[test]
    fn parse_subcommand_only_for_known_programs() {
        assert_eq!(parse("git commit -m x").subcommand, "commit");
        assert_eq!(parse("docker run image").subcommand, "run");
        assert!(parse("rm -rf /tmp").subcommand.is_empty());
        assert!(parse("echo hello").subcommand.is_empty());
    }

    #[test]
    fn parse_no_subcommand_when_flag_follows() {
        let cmd = parse("git --version");
        assert!(cmd.subcommand.is_empty());
        assert!(cmd.has_flag("--version"));
    }

    #[test]
    fn parse_flag_with_embedded_value() {
        let cmd = parse("kubectl get pods --namespace=prod");
        assert_eq!(cmd.flag_value("namespace"), Some("prod"));

        let cmd = parse("go test -bench=. -benchmem ./...");
        assert_eq!(cmd.flag_value("bench"), Some("."));
        assert_eq!(cmd.flag_value("benchmem"), Some(""));
        assert_eq!(cmd.args, vec!["./..."]);
    }

    #[test]
    fn parse_env_only_command() {
        let cmd = parse("FOO=bar");
        assert_eq!(cmd.env, vec![("FOO".to_string(), "bar".to_string())]);
        assert!(cmd.program.is_empty());
    }

    #[test]
    fn parse_flag_adopts_following_word() {
        let cmd = parse("git commit -m message");
        assert_eq!(cmd.flag_value("m"), Some("message"));
        assert!(cmd.args.is_empty());
    }

    #[test]
    fn parse_flag_does_not_adopt_path_like_token() {
        // Tokens that look like paths stay in args so path checks see them.
        let cmd = parse("dd if=/dev/zero -o ./out.bin");
        assert_eq!(cmd.flag_value("o"), Some(""));
        assert_eq!(cmd.args, vec!["if=/dev/zero", "./out.bin"]);

        let cmd = parse("tar -C /srv/data -x");
        assert_eq!(cmd.flag_value("C"), Some(""));
        assert_eq!(cmd.args, vec!["/srv/data"]);
    }

    #[test]
    fn parse_quoted_arg_keeps_spaces() {
        let cmd = parse(r#"git commit -m "First commit""#);
        assert_eq!(cmd.flag_value("m"), Some("First commit"));
    }

    #[test]
    fn parse_duplicate_flag_overwrites() {
        let cmd = parse("cmd -n one -n two");
        assert_eq!(cmd.flag_value("n"), Some("two"));
        assert_eq!(cmd.flags.len(), 1);
    }

    #[test]
    fn parse_roundtrip_preserves_token_order() {
        let cmd = parse("CC=gcc make build target1 target2 -j 4");
        let mut rebuilt: Vec<String> = Vec::new();
        for (k, v) in &cmd.env {
            rebuilt.push(format!("{k}={v}"));
        }
        rebuilt.push(cmd.program.clone());
        rebuilt.push(cmd.subcommand.clone());
        rebuilt.extend(cmd.args.iter().cloned());
        for (k, v) in &cmd.flags {
            rebuilt.push(if v.is_empty() {
                k.clone()
            } else {
                format!("{k} {v}")
            });
        }
        assert_eq!(
            rebuilt.join(" "),
            "CC=gcc make build target1 target2 -j 4"
        );
    }
}
