use serde::{Deserialize, Serialize};

/// How a parsed revenue keeps its fractional part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RevenueRounding {
    /// Round to the nearest whole unit.
    #[default]
    Nearest,
    /// Keep the floating-point value as parsed.
    Exact,
}

/// Suffix multipliers, checked in this order. Only the first hit applies.
const SUFFIXES: [(char, f64); 3] = [('B', 1_000_000_000.0), ('M', 1_000_000.0), ('K', 1_000.0)];

/// Parses revenue text such as `$1.5B`, `$250K` or `1200000` into whole units.
///
/// Never fails: text without a usable number yields `0`.
pub fn parse_revenue(raw: &str) -> u64 {
    // `as` saturates for floats, and parse_revenue_with never returns a negative.
    parse_revenue_with(raw, RevenueRounding::Nearest) as u64
}

/// Same as [`parse_revenue`] with an explicit rounding policy.
///
/// Every character other than ASCII digits and `.` is dropped, so currency
/// symbols, separators and signs are ignored. The longest leading
/// `digits[.digits]` run of what remains is the magnitude; anything after it
/// (a stray trailing period, a second decimal point) is ignored. Suffix
/// letters are matched case-sensitively anywhere in the original text.
pub fn parse_revenue_with(raw: &str, rounding: RevenueRounding) -> f64 {
    let digits: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    let magnitude = match leading_number(&digits) {
        Some(value) if value.is_finite() => value,
        _ => return 0.0,
    };

    let multiplier = SUFFIXES
        .iter()
        .find(|(suffix, _)| raw.contains(*suffix))
        .map(|(_, multiplier)| *multiplier)
        .unwrap_or(1.0);

    coerce_revenue(magnitude * multiplier, rounding)
}

// `digits` holds only ASCII digits and dots.
fn leading_number(digits: &str) -> Option<f64> {
    let int_len = digits.bytes().take_while(|b| b.is_ascii_digit()).count();
    let mut end = int_len;

    if digits.as_bytes().get(int_len) == Some(&b'.') {
        let frac_len = digits[int_len + 1..]
            .bytes()
            .take_while(|b| b.is_ascii_digit())
            .count();
        if int_len + frac_len > 0 {
            end = int_len + 1 + frac_len;
        }
    }

    digits[..end].parse::<f64>().ok()
}

/// Applies the same coercion to an already numeric revenue.
pub fn coerce_revenue(value: f64, rounding: RevenueRounding) -> f64 {
    if !value.is_finite() || value < 0.0 {
        return 0.0;
    }
    match rounding {
        RevenueRounding::Nearest => value.round(),
        RevenueRounding::Exact => value,
    }
}

/// Compact display form used in tooltips and reports.
pub fn format_revenue(value: f64) -> String {
    if value >= 1_000_000_000.0 {
        format!("${:.1}B", value / 1_000_000_000.0)
    } else if value >= 1_000_000.0 {
        format!("${:.1}M", value / 1_000_000.0)
    } else if value >= 1_000.0 {
        format!("${:.1}K", value / 1_000.0)
    } else {
        format!("${}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_suffixed_currency() {
        assert_eq!(parse_revenue("$1.5B"), 1_500_000_000);
        assert_eq!(parse_revenue("$250K"), 250_000);
        assert_eq!(parse_revenue("$12.3M"), 12_300_000);
    }

    #[test]
    fn parses_plain_numbers() {
        assert_eq!(parse_revenue("1200000"), 1_200_000);
        assert_eq!(parse_revenue("1,200,000"), 1_200_000);
        assert_eq!(parse_revenue(" 42 "), 42);
    }

    #[test]
    fn malformed_text_is_zero() {
        assert_eq!(parse_revenue(""), 0);
        assert_eq!(parse_revenue("garbage"), 0);
        assert_eq!(parse_revenue("N/A"), 0);
        assert_eq!(parse_revenue("—"), 0);
        assert_eq!(parse_revenue("."), 0);
        assert_eq!(parse_revenue("$..M"), 0);
    }

    #[test]
    fn takes_longest_leading_number() {
        assert_eq!(parse_revenue("$1.5M."), 1_500_000);
        assert_eq!(parse_revenue("$1.5B."), 1_500_000_000);
        assert_eq!(parse_revenue("1.2.3M"), 1_200_000);
        assert_eq!(parse_revenue("$.5K"), 500);
        assert_eq!(parse_revenue("7."), 7);
    }

    #[test]
    fn only_first_suffix_applies() {
        // Contains both B and M; B wins and M is not applied on top.
        assert_eq!(parse_revenue("2 BM"), 2_000_000_000);
        assert_eq!(parse_revenue("3MK"), 3_000_000);
    }

    #[test]
    fn lowercase_letters_are_not_suffixes() {
        assert_eq!(parse_revenue("5 bucks"), 5);
    }

    #[test]
    fn rounding_policy() {
        assert_eq!(parse_revenue("$1234.5"), 1_235);
        assert_eq!(parse_revenue_with("$1234.5", RevenueRounding::Exact), 1234.5);
        assert_eq!(parse_revenue_with("0.4", RevenueRounding::Nearest), 0.0);
    }

    #[test]
    fn coerces_bad_numbers() {
        assert_eq!(coerce_revenue(f64::NAN, RevenueRounding::Exact), 0.0);
        assert_eq!(coerce_revenue(-10.0, RevenueRounding::Nearest), 0.0);
        assert_eq!(coerce_revenue(10.6, RevenueRounding::Nearest), 11.0);
    }

    #[test]
    fn formats_compact_amounts() {
        assert_eq!(format_revenue(1_500_000_000.0), "$1.5B");
        assert_eq!(format_revenue(12_300_000.0), "$12.3M");
        assert_eq!(format_revenue(250_000.0), "$250.0K");
        assert_eq!(format_revenue(999.0), "$999");
    }
}
