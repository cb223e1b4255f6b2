//! Whole-dollar currency display strings, e.g. `$76,591`.

/// Format a whole-dollar amount with a `$` prefix and comma grouping.
pub fn format_usd(amount: u64) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    out.push('$');
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Parse a display string produced by [`format_usd`] (or a bare number).
///
/// `$` and `,` are ignored. Returns `None` for anything else that is not a
/// non-negative integer.
pub fn parse_usd(display: &str) -> Option<u64> {
    let cleaned: String = display
        .trim()
        .chars()
        .filter(|c| *c != '$' && *c != ',')
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_with_grouping() {
        assert_eq!(format_usd(0), "$0");
        assert_eq!(format_usd(999), "$999");
        assert_eq!(format_usd(1000), "$1,000");
        assert_eq!(format_usd(76_591), "$76,591");
        assert_eq!(format_usd(1_234_567), "$1,234,567");
    }

    #[test]
    fn parses_display_strings() {
        assert_eq!(parse_usd("$76,591"), Some(76_591));
        assert_eq!(parse_usd("6"), Some(6));
        assert_eq!(parse_usd(" $200,000 "), Some(200_000));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_usd(""), None);
        assert_eq!(parse_usd("$"), None);
        assert_eq!(parse_usd("MEDIUM"), None);
        assert_eq!(parse_usd("-$5"), None);
    }
}
