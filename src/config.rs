//! Configuration loading and merging.
//!
//! Two locations: the global file under `~/.config/watchman/config.yml` and
//! a per-project `.watchman.yml`. When the project file exists it is used
//! exclusively; there is no merging between the two. The chosen file is
//! merged onto the built-in default, which enables only the workspace rule.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Template written by `watchman init`.
pub const DEFAULT_TEMPLATE: &str = include_str!("../config.default.yml");

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("cannot parse config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub version: u32,
    pub rules: RulesConfig,
    pub workspace: WorkspaceConfig,
    pub scope: ScopeConfig,
    pub versioning: VersioningConfig,
    pub incremental: IncrementalConfig,
    pub invariants: InvariantsConfig,
    pub commands: CommandsConfig,
    pub tools: ToolsConfig,
    pub hooks: Vec<HookConfig>,
    pub reminders: Vec<ReminderConfig>,
}

/// Switches for the semantic rules.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    pub workspace: bool,
    pub scope: bool,
    pub versioning: bool,
    pub incremental: bool,
    pub invariants: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WorkspaceConfig {
    pub allow: Vec<String>,
    pub block: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ScopeConfig {
    pub allow: Vec<String>,
    pub block: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct VersioningConfig {
    pub commit: CommitConfig,
    pub branches: BranchesConfig,
    pub operations: OperationsConfig,
    /// `""`, `"linear"`, or `"merge"`.
    pub workflow: String,
    /// `""` or `"jj"`.
    pub tool: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CommitConfig {
    pub max_length: i64,
    pub require_uppercase: bool,
    pub no_period: bool,
    pub require_period: bool,
    pub single_line: bool,
    pub forbid_colons: bool,
    pub prefix_pattern: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BranchesConfig {
    pub protected: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OperationsConfig {
    pub block: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct IncrementalConfig {
    pub max_files: i64,
    /// Fraction of `max_files` at which warnings start; values outside
    /// (0, 1) fall back to 0.7.
    pub warn_ratio: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CommandsConfig {
    pub block: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub allow: Vec<String>,
    pub block: Vec<String>,
}

/// An external validator child program.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HookConfig {
    pub name: String,
    pub command: String,
    pub args: Vec<String>,
    /// Tool names this hook applies to (case-sensitive).
    pub tools: Vec<String>,
    /// Path globs; empty means any path.
    pub paths: Vec<String>,
    /// Seconds; 0 means the 5-second default.
    pub timeout: u64,
    /// `"allow"` (default) or `"deny"` on spawn failure or timeout.
    pub on_error: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ReminderConfig {
    pub name: String,
    /// Fire every N allowed invocations; 0 disables.
    pub every: u64,
    pub message: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct InvariantsConfig {
    pub coexistence: Vec<CoexistenceCheck>,
    pub content: Vec<ContentCheck>,
    pub imports: Vec<ImportCheck>,
    pub naming: Vec<NamingCheck>,
    pub required: Vec<RequiredCheck>,
}

/// Related files must exist together.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CoexistenceCheck {
    pub name: String,
    /// Glob that triggers the check.
    #[serde(rename = "if")]
    pub if_pattern: String,
    /// Required companion; supports `${name}`, `${ext}`, `${base}`.
    pub require: String,
    pub message: String,
}

/// File content must (not) match a pattern.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ContentCheck {
    pub name: String,
    /// Globs; a leading `!` excludes.
    pub paths: Vec<String>,
    pub require: String,
    pub forbid: String,
    pub message: String,
}

/// Forbidden import statements, matched line-wise.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ImportCheck {
    pub name: String,
    pub paths: Vec<String>,
    pub forbid: String,
    pub message: String,
}

/// Filenames must match a convention.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NamingCheck {
    pub name: String,
    pub paths: Vec<String>,
    pub pattern: String,
    pub message: String,
}

/// Certain files must exist in matching directories.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RequiredCheck {
    pub name: String,
    /// Glob for directories to check.
    pub dirs: String,
    /// Only check when a file matching this glob is present.
    pub when: String,
    /// Filename that must exist.
    pub require: String,
    pub message: String,
}

impl Config {
    /// The built-in default: workspace confinement on, everything else off.
    pub fn default_config() -> Self {
        Self {
            version: 1,
            rules: RulesConfig {
                workspace: true,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Load configuration. A per-project `.watchman.yml` is used
    /// exclusively when present; otherwise the global file is used if it
    /// exists. Either is merged onto the built-in default.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_paths(
            local_config_path().as_deref(),
            global_config_path().as_deref(),
        )
    }

    /// Resolution between an optional local and global file; the local file
    /// wins exclusively when it exists.
    pub fn load_from_paths(
        local: Option<&Path>,
        global: Option<&Path>,
    ) -> Result<Self, ConfigError> {
        let mut config = Self::default_config();

        if let Some(local) = local
            && local.exists()
        {
            config.merge_file(local)?;
            return Ok(config);
        }

        if let Some(global) = global
            && global.exists()
        {
            config.merge_file(global)?;
        }

        Ok(config)
    }

    /// Parse a file and merge it onto this config.
    pub fn merge_file(&mut self, path: &Path) -> Result<(), ConfigError> {
        let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let overlay: Config =
            serde_yaml::from_str(&data).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        self.merge(overlay);
        Ok(())
    }

    /// Overlay semantics: `rules` and scalar sections replace, list fields
    /// append without duplicates, named entries append keyed by name.
    fn merge(&mut self, overlay: Config) {
        if overlay.version > 0 {
            self.version = overlay.version;
        }
        self.rules = overlay.rules;
        append_unique(&mut self.workspace.allow, overlay.workspace.allow);
        append_unique(&mut self.workspace.block, overlay.workspace.block);
        append_unique(&mut self.scope.allow, overlay.scope.allow);
        append_unique(&mut self.scope.block, overlay.scope.block);
        self.versioning = overlay.versioning;
        self.incremental = overlay.incremental;
        append_named(
            &mut self.invariants.coexistence,
            overlay.invariants.coexistence,
            |c| &c.name,
        );
        append_named(&mut self.invariants.content, overlay.invariants.content, |c| {
            &c.name
        });
        append_named(&mut self.invariants.imports, overlay.invariants.imports, |c| {
            &c.name
        });
        append_named(&mut self.invariants.naming, overlay.invariants.naming, |c| {
            &c.name
        });
        append_named(
            &mut self.invariants.required,
            overlay.invariants.required,
            |c| &c.name,
        );
        append_unique(&mut self.commands.block, overlay.commands.block);
        append_unique(&mut self.tools.allow, overlay.tools.allow);
        append_unique(&mut self.tools.block, overlay.tools.block);
        append_named(&mut self.hooks, overlay.hooks, |h| &h.name);
        append_named(&mut self.reminders, overlay.reminders, |r| &r.name);
    }
}

fn append_unique(base: &mut Vec<String>, items: Vec<String>) {
    for item in items {
        if !base.contains(&item) {
            base.push(item);
        }
    }
}

fn append_named<T>(base: &mut Vec<T>, items: Vec<T>, name: fn(&T) -> &str) {
    for item in items {
        if !base.iter().any(|existing| name(existing) == name(&item)) {
            base.push(item);
        }
    }
}

/// `~/.config/watchman/config.yml`, when a home directory is known.
pub fn global_config_path() -> Option<PathBuf> {
    let home = std::env::var_os("HOME")?;
    Some(Path::new(&home).join(".config/watchman/config.yml"))
}

/// `./.watchman.yml`, when the working directory is known.
pub fn local_config_path() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    Some(cwd.join(".watchman.yml"))
}
