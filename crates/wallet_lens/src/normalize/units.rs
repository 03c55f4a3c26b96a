//! Smallest-unit conversion and display formatting.

use tracing::warn;

pub const WEI_PER_NATIVE: f64 = 1e18;
pub const WEI_PER_GWEI: f64 = 1e9;
pub const LAMPORTS_PER_SOL: f64 = 1e9;
pub const SATOSHI_PER_BTC: f64 = 1e8;

/// Parse a smallest-unit amount rendered as a decimal string. Unparsable
/// values substitute zero with a warning; they never abort a query.
pub fn parse_amount(raw: &str, context: &str) -> f64 {
    match raw.trim().parse::<f64>() {
        Ok(v) => v,
        Err(_) => {
            warn!(value = raw, context, "unparsable amount, substituting 0");
            0.0
        }
    }
}

/// Divide a smallest-unit balance by 10^decimals. Zero or missing decimals
/// leave the value in smallest units; the missing case warns but does not fail.
pub fn scale_by_decimals(raw: f64, decimals: Option<u32>, context: &str) -> f64 {
    match decimals {
        Some(d) if d > 0 => raw / 10f64.powi(d as i32),
        Some(_) => raw,
        None => {
            warn!(context, "missing decimals, leaving balance in smallest units");
            raw
        }
    }
}

/// Fixed-point rendering with thousands separators: `1.5` at 4 places is
/// `"1.5000"`, `1234567.89` at 2 places is `"1,234,567.89"`.
pub fn format_grouped(value: f64, places: usize) -> String {
    let fixed = format!("{value:.places$}");
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };
    let (sign, digits) = match int_part.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", int_part),
    };
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    match frac_part {
        Some(f) => format!("{sign}{grouped}.{f}"),
        None => format!("{sign}{grouped}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wei_to_native() {
        let wei = parse_amount("1500000000000000000", "balance");
        assert_eq!(format_grouped(wei / WEI_PER_NATIVE, 4), "1.5000");
    }

    #[test]
    fn lamports_and_satoshi() {
        assert_eq!(2_500_000_000.0 / LAMPORTS_PER_SOL, 2.5);
        assert_eq!(150_000_000.0 / SATOSHI_PER_BTC, 1.5);
    }

    #[test]
    fn zero_decimals_keep_smallest_units() {
        assert_eq!(scale_by_decimals(42.0, Some(0), "t"), 42.0);
    }

    #[test]
    fn missing_decimals_fall_back_to_raw() {
        assert_eq!(scale_by_decimals(42.0, None, "t"), 42.0);
    }

    #[test]
    fn positive_decimals_divide() {
        assert_eq!(scale_by_decimals(1_000_000.0, Some(6), "t"), 1.0);
    }

    #[test]
    fn unparsable_amount_is_zero() {
        assert_eq!(parse_amount("not-a-number", "t"), 0.0);
    }

    #[test]
    fn grouping() {
        assert_eq!(format_grouped(1_234_567.8912, 4), "1,234,567.8912");
        assert_eq!(format_grouped(42.0, 0), "42");
        assert_eq!(format_grouped(-1234.5, 2), "-1,234.50");
        assert_eq!(format_grouped(999.0, 0), "999");
        assert_eq!(format_grouped(1000.0, 0), "1,000");
    }
}
