//! Money helpers.
//!
//! All amounts are integer minor currency units (paise, cents). Rates are
//! basis points: 100 bps = 1%.

/// Amount in minor currency units
pub type Money = i64;

/// Rate in basis points
pub type BasisPoints = u32;

const BPS_DENOMINATOR: i64 = 10_000;

/// `amount * rate / 10000`, rounded half up.
pub fn apply_rate(amount: Money, rate: BasisPoints) -> Money {
    let scaled = amount * i64::from(rate);
    if scaled >= 0 {
        (scaled + BPS_DENOMINATOR / 2) / BPS_DENOMINATOR
    } else {
        (scaled - BPS_DENOMINATOR / 2) / BPS_DENOMINATOR
    }
}

/// Formats minor units as `major.minor` with two decimals, e.g. `12345` -> `"123.45"`.
pub fn format_minor_units(amount: Money) -> String {
    let sign = if amount < 0 { "-" } else { "" };
    let abs = amount.unsigned_abs();
    format!("{}{}.{:02}", sign, abs / 100, abs % 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_rate_rounds_half_up() {
        // 5% of 1010 = 50.5 -> 51
        assert_eq!(apply_rate(1010, 500), 51);
        // 5% of 1009 = 50.45 -> 50
        assert_eq!(apply_rate(1009, 500), 50);
        assert_eq!(apply_rate(0, 500), 0);
        assert_eq!(apply_rate(10_000, 0), 0);
    }

    #[test]
    fn test_apply_rate_negative_amount() {
        assert_eq!(apply_rate(-1010, 500), -51);
    }

    #[test]
    fn test_format_minor_units() {
        assert_eq!(format_minor_units(0), "0.00");
        assert_eq!(format_minor_units(5), "0.05");
        assert_eq!(format_minor_units(12345), "123.45");
        assert_eq!(format_minor_units(-250), "-2.50");
    }
}
