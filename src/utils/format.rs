use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

/// `round(x * 10) / 10`, halves away from zero.
pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Display form of a score: two decimal places, midpoint away from zero,
/// trailing zeros dropped (`75.0` shows as `75`). Missing or non-finite
/// input shows as `0`.
///
/// Rounding happens on the shortest decimal text of the float, so `59.995`
/// rounds to `60` rather than to the binary neighbour `59.99`.
pub fn format_score(score: Option<f64>) -> Decimal {
    let Some(value) = score.filter(|v| v.is_finite()) else {
        return Decimal::ZERO;
    };
    Decimal::from_str(&value.to_string())
        .map(|d| {
            d.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
                .normalize()
        })
        .unwrap_or(Decimal::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_decimal_rounding() {
        assert_eq!(round_one_decimal(66.666_666), 66.7);
        assert_eq!(round_one_decimal(60.0), 60.0);
        assert_eq!(round_one_decimal(72.25), 72.3);
        assert_eq!(round_one_decimal(0.0), 0.0);
    }

    #[test]
    fn format_score_rounds_midpoint_up_and_strips_zeros() {
        assert_eq!(format_score(Some(59.995)).to_string(), "60");
        assert_eq!(format_score(Some(75.0)).to_string(), "75");
        assert_eq!(format_score(Some(200.0 / 3.0)).to_string(), "66.67");
        assert_eq!(format_score(Some(12.5)).to_string(), "12.5");
    }

    #[test]
    fn format_score_defaults_to_zero() {
        assert_eq!(format_score(None), Decimal::ZERO);
        assert_eq!(format_score(Some(f64::NAN)), Decimal::ZERO);
        assert_eq!(format_score(None).to_string(), "0");
    }
}
