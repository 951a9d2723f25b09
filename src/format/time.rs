/// Format seconds as a compact `"1h 30min"` string. Anything under a minute
/// formats to an empty string; leftover seconds are truncated.
pub fn format_time(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds - hours * 3600) / 60;

    let mut parts = Vec::with_capacity(2);
    if hours > 0 {
        parts.push(format!("{hours}h"));
    }
    if minutes > 0 {
        parts.push(format!("{minutes}min"));
    }
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn under_a_minute_is_empty() {
        assert_eq!(format_time(0), "");
        assert_eq!(format_time(59), "");
    }

    #[test]
    fn minutes_only() {
        assert_eq!(format_time(60), "1min");
        assert_eq!(format_time(119), "1min");
    }

    #[test]
    fn hours_only() {
        assert_eq!(format_time(3600), "1h");
        assert_eq!(format_time(7230), "2h");
    }

    #[test]
    fn hours_and_minutes() {
        assert_eq!(format_time(5400), "1h 30min");
        assert_eq!(format_time(90_061), "25h 1min");
    }
}
