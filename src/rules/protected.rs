//! Hardcoded always-deny locations. Not overridable by configuration.

use crate::pattern;

/// Paths that are never accessible, regardless of config. Entries ending in
/// `/` protect a directory tree; the rest are exact files.
const ALWAYS_PROTECTED: &[&str] = &[
    "~/.claude/",          // agent settings, hooks
    "~/.ssh/",             // SSH keys
    "~/.aws/",             // AWS credentials
    "~/.gnupg/",           // GPG keys
    "~/.gpg/",             // GPG keys (alt)
    "~/.config/gh/",       // GitHub CLI credentials
    "~/.config/watchman/", // watchman global config
    "~/.netrc",            // network credentials
    "~/.git-credentials",  // git credentials
    "~/.cargo/bin/watchman", // the gate binary itself
];

/// Filenames protected in any directory.
const PROTECTED_FILENAMES: &[&str] = &[
    ".watchman.yml", // local watchman config
];

/// Reason reported for every protected-path denial.
pub const PROTECTED_REASON: &str =
    "path is protected and cannot be accessed. User must perform this action manually.";

/// Check whether a path hits the hardcoded protected set.
pub fn is_always_protected(path: &str) -> bool {
    if path.is_empty() {
        return false;
    }

    let abs = resolve_against_cwd(path);

    let filename = pattern::basename(&abs);
    if PROTECTED_FILENAMES.contains(&filename) {
        return true;
    }

    for entry in ALWAYS_PROTECTED {
        let is_dir = entry.ends_with('/');
        let expanded = pattern::expand_tilde(entry.trim_end_matches('/'));

        if is_dir {
            if abs == expanded || abs.starts_with(&format!("{expanded}/")) {
                return true;
            }
        } else if abs == expanded {
            return true;
        }
    }

    false
}

fn resolve_against_cwd(path: &str) -> String {
    if path.starts_with('/') {
        return pattern::clean(path);
    }
    match std::env::current_dir() {
        Ok(cwd) => pattern::resolve(path, &cwd.to_string_lossy()),
        Err(_) => pattern::clean(path),
    }
}
