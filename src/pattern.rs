//! Path matching: prefix patterns for workspace boundaries and globs for
//! scope, invariants, and hook filters.

use std::path::Path;

/// Glob options: `*` and `?` never cross a path separator.
const GLOB_OPTIONS: glob::MatchOptions = glob::MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Expand a leading `~/` against `$HOME`. Returns the input unchanged when
/// there is no tilde prefix or no home directory.
pub fn expand_tilde(pattern: &str) -> String {
    if let Some(rest) = pattern.strip_prefix("~/")
        && let Some(home) = std::env::var_os("HOME")
    {
        return Path::new(&home).join(rest).to_string_lossy().into_owned();
    }
    pattern.to_string()
}

/// Lexically normalize a path: collapse separators, drop `.` components,
/// resolve `..` against preceding components.
pub fn clean(path: &str) -> String {
    if path.is_empty() {
        return ".".to_string();
    }
    let rooted = path.starts_with('/');
    let mut out: Vec<&str> = Vec::new();

    for comp in path.split('/') {
        match comp {
            "" | "." => {}
            ".." => {
                let popped = matches!(out.last(), Some(last) if *last != "..");
                if popped {
                    out.pop();
                } else if !rooted {
                    // `/..` clamps at the root; a relative `..` is kept
                    out.push("..");
                }
            }
            c => out.push(c),
        }
    }

    let joined = out.join("/");
    match (rooted, joined.is_empty()) {
        (true, true) => "/".to_string(),
        (true, false) => format!("/{joined}"),
        (false, true) => ".".to_string(),
        (false, false) => joined,
    }
}

/// Resolve a path to cleaned absolute form against `cwd`.
pub fn resolve(path: &str, cwd: &str) -> String {
    if path.starts_with('/') {
        clean(path)
    } else {
        clean(&format!("{cwd}/{path}"))
    }
}

/// Matcher A: exact or prefix path matching with tilde expansion.
///
/// A pattern ending in `/` matches the trimmed pattern itself and anything
/// under it; otherwise the pattern matches exactly or as a directory prefix.
pub fn match_path(path: &str, pattern: &str) -> bool {
    let pattern = expand_tilde(pattern);

    if path == pattern {
        return true;
    }

    if let Some(trimmed) = pattern.strip_suffix('/') {
        return path.starts_with(&pattern) || path == trimmed;
    }

    path.starts_with(&format!("{pattern}/"))
}

/// Matcher B: glob matching with `?`, `*`, character classes, and a single
/// `**`. Patterns without a separator also match the candidate's basename.
pub fn match_glob(path: &str, pattern: &str) -> bool {
    let path = clean(path);
    let pattern = clean(pattern);

    if pattern.contains("**") {
        return match_doublestar(&path, &pattern);
    }

    let Ok(compiled) = glob::Pattern::new(&pattern) else {
        return false;
    };
    if compiled.matches_with(&path, GLOB_OPTIONS) {
        return true;
    }

    !pattern.contains('/') && compiled.matches_with(basename(&path), GLOB_OPTIONS)
}

/// Match a path against a pattern list where a leading `!` marks an
/// exclusion: the path must match some plain pattern and no excluded one.
pub fn match_glob_list(path: &str, patterns: &[String]) -> bool {
    let mut included = false;
    for pattern in patterns {
        if let Some(excluded) = pattern.strip_prefix('!') {
            if match_glob(path, excluded) {
                return false;
            }
        } else if match_glob(path, pattern) {
            included = true;
        }
    }
    included
}

/// Handle patterns containing `**`. Exactly one `**` is supported; more
/// never match.
fn match_doublestar(path: &str, pattern: &str) -> bool {
    let parts: Vec<&str> = pattern.split("**").collect();
    if parts.len() != 2 {
        return false;
    }

    let prefix = parts[0].trim_end_matches('/');
    let suffix = parts[1].trim_start_matches('/');

    if !prefix.is_empty() && !path.starts_with(prefix) {
        return false;
    }
    if suffix.is_empty() {
        return true;
    }

    let mut remaining = path;
    if !prefix.is_empty() {
        remaining = remaining.strip_prefix(prefix).unwrap_or(remaining);
        remaining = remaining.strip_prefix('/').unwrap_or(remaining);
    }

    let Ok(compiled) = glob::Pattern::new(suffix) else {
        return false;
    };

    // `**` swallows any number of leading components, so try every tail.
    let segments: Vec<&str> = remaining.split('/').collect();
    for start in 0..segments.len() {
        if compiled.matches_with(&segments[start..].join("/"), GLOB_OPTIONS) {
            return true;
        }
    }

    false
}

/// The final path component.
pub fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// The directory part of a path, `.` when there is none.
pub fn dirname(path: &str) -> &str {
    match path.rfind('/') {
        Some(0) => "/",
        Some(idx) => &path[..idx],
        None => ".",
    }
}
