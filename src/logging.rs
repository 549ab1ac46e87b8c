use std::io::Write;

use crate::eval::Decision;

/// Append a decision record to ~/.local/share/watchman/decisions.log.
/// Best-effort: failures are silently ignored (logging must never block the hook).
pub fn log_decision(tool_name: &str, detail: &str, decision: &Decision) {
    let Some(home) = std::env::var_os("HOME") else {
        return;
    };
    let log_dir = std::path::Path::new(&home).join(".local/share/watchman");
    let _ = std::fs::create_dir_all(&log_dir);

    let log_path = log_dir.join("decisions.log");
    let Ok(mut file) = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
    else {
        return;
    };

    // Compact single-line reason for the log (replace newlines with "; ")
    let reason_oneline = decision.reason.replace('\n', "; ");
    let detail_truncated: String = detail.chars().take(200).collect();
    let ts = timestamp_now();

    let _ = writeln!(
        file,
        "{ts}\t{label}\t{tool_name}\t{detail_truncated}\t{reason_oneline}",
        label = decision.label(),
    );
}

/// Format the current time as `YYYY-MM-DDThh:mm:ssZ`.
fn timestamp_now() -> String {
    let secs = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    let (year, month, day) = civil_date(secs / 86400);
    let clock = secs % 86400;
    format!(
        "{year:04}-{month:02}-{day:02}T{:02}:{:02}:{:02}Z",
        clock / 3600,
        clock % 3600 / 60,
        clock % 60,
    )
}

fn is_leap(year: u64) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

/// Convert days since the Unix epoch to (year, month, day) by walking
/// forward from 1970.
fn civil_date(mut days: u64) -> (u64, u64, u64) {
    let mut year = 1970;
    loop {
        let year_len = if is_leap(year) { 366 } else { 365 };
        if days < year_len {
            break;
        }
        days -= year_len;
        year += 1;
    }

    const MONTH_LENGTHS: [u64; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];
    let mut month = 1;
    for (index, &base_len) in MONTH_LENGTHS.iter().enumerate() {
        let month_len = if index == 1 && is_leap(year) {
            base_len + 1
        } else {
            base_len
        };
        if days < month_len {
            break;
        }
        days -= month_len;
        month += 1;
    }

    (year, month, days + 1)
}
