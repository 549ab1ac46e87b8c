//! Types produced by the shell parser and consumed by the rule layer.

/// Programs whose first non-flag argument is treated as a subcommand.
pub const SUBCOMMAND_PROGRAMS: &[&str] = &[
    "go", "git", "make", "docker", "kubectl", "npm", "yarn", "cargo",
];

/// A shell command decomposed into its evaluable parts.
///
/// `env` and `flags` preserve insertion order so that downstream path
/// extraction iterates deterministically. Re-assigning an existing flag or
/// env name overwrites the stored value in place.
#[derive(Debug, Clone, Default)]
pub struct ParsedCommand {
    /// The original command text, untouched.
    pub raw: String,
    /// Leading `NAME=value` assignments, in order of appearance.
    pub env: Vec<(String, String)>,
    /// The first token after env assignments; empty for a blank command.
    pub program: String,
    /// Non-empty only when `program` is in [`SUBCOMMAND_PROGRAMS`] and the
    /// following token does not start with `-`.
    pub subcommand: String,
    /// Positional arguments, in order.
    pub args: Vec<String>,
    /// Flag tokens keyed with their leading dashes; value is empty when the
    /// flag carried none.
    pub flags: Vec<(String, String)>,
}

impl ParsedCommand {
    /// Check for a flag, ignoring the number of leading dashes.
    pub fn has_flag(&self, flag: &str) -> bool {
        let wanted = flag.trim_start_matches('-');
        self.flags
            .iter()
            .any(|(k, _)| k.trim_start_matches('-') == wanted)
    }

    /// Look up a flag value, ignoring the number of leading dashes.
    pub fn flag_value(&self, flag: &str) -> Option<&str> {
        let wanted = flag.trim_start_matches('-');
        self.flags
            .iter()
            .find(|(k, _)| k.trim_start_matches('-') == wanted)
            .map(|(_, v)| v.as_str())
    }

    /// Check for a leading environment assignment by name.
    pub fn has_env(&self, name: &str) -> bool {
        self.env.iter().any(|(k, _)| k == name)
    }

    /// Look up a leading environment assignment by name.
    pub fn env_value(&self, name: &str) -> Option<&str> {
        self.env
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ParsedCommand {
        ParsedCommand {
            raw: "GOOS=linux go build -o out ./cmd".into(),
            env: vec![("GOOS".into(), "linux".into())],
            program: "go".into(),
            subcommand: "build".into(),
            args: vec!["./cmd".into()],
            flags: vec![("-o".into(), "out".into())],
        }
    }

    #[test]
    fn flag_lookup_ignores_dashes() {
        let cmd = sample();
        assert!(cmd.has_flag("-o"));
        assert!(cmd.has_flag("o"));
        assert!(cmd.has_flag("--o"));
        assert!(!cmd.has_flag("-x"));
        assert_eq!(cmd.flag_value("o"), Some("out"));
        assert_eq!(cmd.flag_value("x"), None);
    }

    #[test]
    fn env_lookup() {
        let cmd = sample();
        assert!(cmd.has_env("GOOS"));
        assert!(!cmd.has_env("GOARCH"));
        assert_eq!(cmd.env_value("GOOS"), Some("linux"));
    }
}
