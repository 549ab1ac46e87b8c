//! Compound-command segmentation for command-position matching.
//!
//! A blocked pattern like `dd` must match `dd if=/dev/zero` and
//! `ls | dd of=x` but not `cd pkg/odd/file`, so single-word patterns are
//! compared against the first non-assignment token of every pipeline
//! segment rather than substring-matched.

/// Split a command at unquoted `|`, `||`, `&&`, and `;`.
///
/// A lone `&` is a background marker and stays inside its segment. Quoted
/// spans (with backslash escapes) are copied through verbatim.
pub fn split_segments(cmd: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut buf = String::new();

    let chars: Vec<char> = cmd.chars().collect();
    let len = chars.len();
    let mut i = 0;
    let (mut sq, mut dq, mut esc) = (false, false, false);

    while i < len {
        let c = chars[i];

        if esc {
            buf.push(c);
            esc = false;
            i += 1;
            continue;
        }
        if c == '\\' && !sq {
            esc = true;
            buf.push(c);
            i += 1;
            continue;
        }
        if c == '\'' && !dq {
            sq = !sq;
            buf.push(c);
            i += 1;
            continue;
        }
        if c == '"' && !sq {
            dq = !dq;
            buf.push(c);
            i += 1;
            continue;
        }
        if sq || dq {
            buf.push(c);
            i += 1;
            continue;
        }

        match c {
            '|' => {
                segments.push(std::mem::take(&mut buf));
                // || is a single separator
                if i + 1 < len && chars[i + 1] == '|' {
                    i += 1;
                }
            }
            '&' if i + 1 < len && chars[i + 1] == '&' => {
                segments.push(std::mem::take(&mut buf));
                i += 1;
            }
            ';' => {
                segments.push(std::mem::take(&mut buf));
            }
            _ => buf.push(c),
        }
        i += 1;
    }

    if !buf.is_empty() {
        segments.push(buf);
    }

    segments
}

/// Extract the command word of a segment: the first token that is not a
/// `VAR=value` assignment.
pub fn first_command(segment: &str) -> String {
    let words = words(segment.trim());
    for tok in words {
        if tok.contains('=') && !tok.starts_with('-') {
            continue;
        }
        return tok;
    }
    String::new()
}

/// Check whether `pattern` appears in command position in any segment.
pub fn is_command_in_position(cmd: &str, pattern: &str) -> bool {
    split_segments(cmd)
        .iter()
        .map(|seg| first_command(seg))
        .any(|command| command == pattern)
}

/// POSIX word splitting via shlex, falling back to whitespace splitting
/// when the segment is not shlex-clean (e.g. an unterminated quote).
fn words(segment: &str) -> Vec<String> {
    shlex::split(segment)
        .unwrap_or_else(|| segment.split_whitespace().map(String::from).collect())
}
