use chrono::DateTime;
use chrono::Utc;
use std::time::Duration;

/// Convert a [`std::time::Duration`] into a human-readable, compact string.
///
/// Formatting rules:
/// * < 1 s  ->  "{milli}ms"
/// * < 60 s ->  "{sec}s"
/// * < 60 m ->  "{min}m {sec:02}s"
/// * >= 1 h ->  "{hour}h {min:02}m"
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs == 0 {
        return format!("{}ms", duration.as_millis());
    }
    if secs < 60 {
        return format!("{secs}s");
    }
    if secs < 3_600 {
        return format!("{}m {:02}s", secs / 60, secs % 60);
    }
    format!("{}h {:02}m", secs / 3_600, (secs % 3_600) / 60)
}

/// Render how long ago `when` happened, e.g. "just now", "5m ago", "2h ago".
pub fn format_ago(when: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - when).num_seconds();
    if secs < 0 {
        return "just now".to_string();
    }
    match secs {
        0..60 => "just now".to_string(),
        60..3_600 => format!("{}m ago", secs / 60),
        3_600..86_400 => format!("{}h ago", secs / 3_600),
        _ => format!("{}d ago", secs / 86_400),
    }
}

/// Render how long until `when`, used for quota reset timestamps.
/// Past or immediate timestamps render as "now".
pub fn format_until(when: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (when - now).num_seconds();
    if secs <= 0 {
        return "now".to_string();
    }
    if secs < 3_600 {
        format!("{}m", (secs + 59) / 60)
    } else if secs < 86_400 {
        format!("{}h {}m", secs / 3_600, (secs % 3_600) / 60)
    } else {
        format!("{}d {}h", secs / 86_400, (secs % 86_400) / 3_600)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).single().expect("timestamp")
    }

    #[test]
    fn duration_subsecond_renders_millis() {
        assert_eq!(format_duration(Duration::from_millis(250)), "250ms");
        assert_eq!(format_duration(Duration::from_millis(0)), "0ms");
    }

    #[test]
    fn duration_seconds_and_minutes() {
        assert_eq!(format_duration(Duration::from_secs(45)), "45s");
        assert_eq!(format_duration(Duration::from_secs(75)), "1m 15s");
        assert_eq!(format_duration(Duration::from_secs(3_661)), "1h 01m");
    }

    #[test]
    fn ago_buckets() {
        assert_eq!(format_ago(at(0), at(5)), "just now");
        assert_eq!(format_ago(at(0), at(300)), "5m ago");
        assert_eq!(format_ago(at(0), at(7_200)), "2h ago");
        assert_eq!(format_ago(at(0), at(172_800)), "2d ago");
    }

    #[test]
    fn ago_future_timestamp_is_just_now() {
        assert_eq!(format_ago(at(60), at(0)), "just now");
    }

    #[test]
    fn until_buckets() {
        assert_eq!(format_until(at(90), at(0)), "2m");
        assert_eq!(format_until(at(5_400), at(0)), "1h 30m");
        assert_eq!(format_until(at(90_000), at(0)), "1d 1h");
        assert_eq!(format_until(at(0), at(60)), "now");
    }
}
