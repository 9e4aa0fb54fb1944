//! Coarse relative-time labels for feed timestamps.

use chrono::{DateTime, Utc};

/// "há 42 s" / "há 5 min" / "há 3 h" / "há 2 d" — the label a feed
/// entry carries next to its author. Clock skew (a timestamp slightly
/// in the future) clamps to zero seconds.
pub fn time_ago(created_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - created_at).num_seconds().max(0);
    if seconds < 60 {
        return format!("há {seconds} s");
    }
    let minutes = seconds / 60;
    if minutes < 60 {
        return format!("há {minutes} min");
    }
    let hours = minutes / 60;
    if hours < 24 {
        return format!("há {hours} h");
    }
    format!("há {} d", hours / 24)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn label(seconds: i64) -> String {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        time_ago(now - chrono::Duration::seconds(seconds), now)
    }

    #[test]
    fn seconds_band() {
        assert_eq!(label(0), "há 0 s");
        assert_eq!(label(59), "há 59 s");
    }

    #[test]
    fn minutes_band() {
        assert_eq!(label(60), "há 1 min");
        assert_eq!(label(3599), "há 59 min");
    }

    #[test]
    fn hours_band() {
        assert_eq!(label(3600), "há 1 h");
        assert_eq!(label(86399), "há 23 h");
    }

    #[test]
    fn days_band() {
        assert_eq!(label(86400), "há 1 d");
        assert_eq!(label(86400 * 10), "há 10 d");
    }

    #[test]
    fn future_timestamps_clamp_to_zero() {
        assert_eq!(label(-30), "há 0 s");
    }
}
