//! Time formatting for player displays

/// Format seconds as `m:ss`
///
/// Non-finite and negative inputs render as `0:00`.
pub fn format_time(seconds: f64) -> String {
    let total = whole_seconds(seconds);
    format!("{}:{:02}", total / 60, total % 60)
}

/// Format seconds as `h:mm:ss`
pub fn format_time_long(seconds: f64) -> String {
    let total = whole_seconds(seconds);
    format!("{}:{:02}:{:02}", total / 3600, (total % 3600) / 60, total % 60)
}

/// Parse `m:ss` into seconds
pub fn parse_time(text: &str) -> Option<u64> {
    let (minutes, seconds) = text.trim().split_once(':')?;
    let minutes: u64 = minutes.parse().ok()?;
    let seconds: u64 = seconds.parse().ok()?;
    if seconds >= 60 {
        return None;
    }
    Some(minutes * 60 + seconds)
}

fn whole_seconds(seconds: f64) -> u64 {
    if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_minutes_and_seconds() {
        assert_eq!(format_time(0.0), "0:00");
        assert_eq!(format_time(9.9), "0:09");
        assert_eq!(format_time(215.4), "3:35");
        assert_eq!(format_time(3600.0), "60:00");
    }

    #[test]
    fn bad_inputs_render_zero() {
        assert_eq!(format_time(f64::NAN), "0:00");
        assert_eq!(format_time(f64::INFINITY), "0:00");
        assert_eq!(format_time(-5.0), "0:00");
    }

    #[test]
    fn formats_long() {
        assert_eq!(format_time_long(3725.0), "1:02:05");
        assert_eq!(format_time_long(f64::NAN), "0:00:00");
    }

    #[test]
    fn parses_minutes_and_seconds() {
        assert_eq!(parse_time("3:35"), Some(215));
        assert_eq!(parse_time(" 0:05 "), Some(5));
        assert_eq!(parse_time("1:75"), None);
        assert_eq!(parse_time("abc"), None);
        assert_eq!(parse_time(""), None);
    }
}
