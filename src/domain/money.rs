//! Monetary helpers. Amounts are EUR `BigDecimal`s stored as `NUMERIC(12, 2)`.

use bigdecimal::{BigDecimal, RoundingMode, Zero};

pub const CURRENCY: &str = "EUR";

/// Round half-up to whole cents.
pub fn round2(value: &BigDecimal) -> BigDecimal {
    value.with_scale_round(2, RoundingMode::HalfUp)
}

/// `base * percent / 100`, unrounded.
pub fn percent_of(base: &BigDecimal, percent: &BigDecimal) -> BigDecimal {
    base * percent / BigDecimal::from(100)
}

pub fn zero() -> BigDecimal {
    BigDecimal::zero()
}

pub fn sum<'a>(values: impl IntoIterator<Item = &'a BigDecimal>) -> BigDecimal {
    values.into_iter().fold(BigDecimal::zero(), |acc, v| acc + v)
}

/// Lossy conversion for statistics only (averages, percentages).
pub fn to_f64(value: &BigDecimal) -> f64 {
    value.to_string().parse().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).expect("valid decimal")
    }

    #[test]
    fn round2_rounds_half_up() {
        assert_eq!(round2(&dec("1.005")), dec("1.01"));
        assert_eq!(round2(&dec("1.004")), dec("1.00"));
        assert_eq!(round2(&dec("2")).to_string(), "2.00");
    }

    #[test]
    fn percent_of_is_exact() {
        assert_eq!(percent_of(&dec("100.00"), &dec("10")), dec("10"));
        assert_eq!(round2(&percent_of(&dec("33.33"), &dec("5"))), dec("1.67"));
    }

    #[test]
    fn sum_of_empty_is_zero() {
        let empty: Vec<BigDecimal> = vec![];
        assert!(sum(&empty).is_zero());
    }
}
