/// Format a price held in currency minor units, e.g. 1234 -> "12.34".
pub fn format_price(minor: i64) -> String {
    let sign = if minor < 0 { "-" } else { "" };
    let abs = minor.unsigned_abs();
    format!("{sign}{}.{:02}", abs / 100, abs % 100)
}

/// Signed variant for deltas, e.g. 5 -> "+0.05".
pub fn format_delta(minor: i64) -> String {
    if minor > 0 {
        format!("+{}", format_price(minor))
    } else {
        format_price(minor)
    }
}

pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{truncated}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prices() {
        assert_eq!(format_price(0), "0.00");
        assert_eq!(format_price(7), "0.07");
        assert_eq!(format_price(1234), "12.34");
        assert_eq!(format_price(-250), "-2.50");
    }

    #[test]
    fn deltas() {
        assert_eq!(format_delta(5), "+0.05");
        assert_eq!(format_delta(-5), "-0.05");
        assert_eq!(format_delta(0), "0.00");
    }

    #[test]
    fn truncation() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a very long game name", 10), "a very ...");
    }
}
