//! Human-readable durations for log lines.

const UNITS: [(u64, &str); 4] = [(86_400, "d"), (3_600, "h"), (60, "m"), (1, "s")];

/// Render `secs` using its two most significant non-zero units,
/// e.g. `"1d 4h"`, `"2m 5s"`, `"30s"`.
pub fn format_duration(secs: u64) -> String {
    if secs == 0 {
        return "0s".to_string();
    }
    let mut rest = secs;
    let mut parts = Vec::with_capacity(2);
    for (size, suffix) in UNITS {
        let n = rest / size;
        rest %= size;
        if n > 0 {
            parts.push(format!("{n}{suffix}"));
        } else if !parts.is_empty() {
            // A zero unit ends the run so "1h 0m 5s" prints as "1h".
            break;
        }
        if parts.len() == 2 {
            break;
        }
    }
    parts.join(" ")
}
