// ── Human-readable formatting helpers ──

const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Format a byte count in base-1024 units with at most two decimals.
///
/// `0 B`, `512 B`, `1.5 KB`, `15 MB`, `2.3 GB`.
#[allow(clippy::cast_precision_loss, clippy::as_conversions)]
pub fn format_bytes(bytes: u64) -> String {
    if bytes == 0 {
        return "0 B".into();
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let rounded = (value * 100.0).round() / 100.0;
    format!("{rounded} {}", UNITS[unit])
}

/// Format elapsed seconds as zero-padded `mm:ss`. Minutes do not wrap
/// into hours.
pub fn format_duration(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Format an average call length as `m:ss`, the way the daily report
/// prints it.
pub fn format_short_duration(secs: u64) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

/// Format an uptime as `15d 3h 22m`, dropping leading zero units.
pub fn format_uptime(secs: u64) -> String {
    let days = secs / 86_400;
    let hours = secs % 86_400 / 3_600;
    let mins = secs % 3_600 / 60;
    match (days, hours) {
        (0, 0) => format!("{mins}m"),
        (0, _) => format!("{hours}h {mins}m"),
        _ => format!("{days}d {hours}h {mins}m"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes_use_base_1024() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(15_728_640), "15 MB");
        assert_eq!(format_bytes(1_024_567_890), "977.1 MB");
        assert_eq!(format_bytes(1024 * 1024 * 1024 * 3), "3 GB");
    }

    #[test]
    fn durations_are_zero_padded() {
        assert_eq!(format_duration(0), "00:00");
        assert_eq!(format_duration(45), "00:45");
        assert_eq!(format_duration(180), "03:00");
        assert_eq!(format_duration(3725), "62:05");
    }

    #[test]
    fn short_durations_match_report() {
        assert_eq!(format_short_duration(222), "3:42");
        assert_eq!(format_short_duration(241), "4:01");
    }

    #[test]
    fn uptime_drops_leading_zero_units() {
        assert_eq!(format_uptime(1_308_120), "15d 3h 22m");
        assert_eq!(format_uptime(9_300), "2h 35m");
        assert_eq!(format_uptime(59), "0m");
    }
}
