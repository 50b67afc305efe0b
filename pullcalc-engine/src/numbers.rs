//! Decimal helpers centralizing construction, rounding and fixed-point output.

use bigdecimal::num_bigint::{BigInt, Sign};
use bigdecimal::{BigDecimal, RoundingMode};
use num_traits::ToPrimitive;
use serde::{Deserialize, Serialize};

/// Significant decimal digits kept after every accumulated product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Precision(u64);

impl Precision {
    #[must_use]
    pub const fn new(digits: u64) -> Self {
        Self(digits)
    }

    #[must_use]
    pub const fn digits(self) -> u64 {
        self.0
    }

    /// Round to the configured number of significant digits, leaving shorter values untouched.
    #[must_use]
    pub fn round(self, value: BigDecimal) -> BigDecimal {
        if value.digits() > self.0 {
            value.with_prec(self.0)
        } else {
            value
        }
    }

    /// Smallest magnitude still distinguishable from zero around 1.0, padded by `slack` digits.
    #[must_use]
    pub fn tolerance(self, slack: u64) -> BigDecimal {
        let exponent = self.0.saturating_sub(slack);
        BigDecimal::new(BigInt::from(1), i64::try_from(exponent).unwrap_or(i64::MAX))
    }
}

impl Default for Precision {
    fn default() -> Self {
        Self(crate::constants::DEFAULT_PRECISION_DIGITS)
    }
}

/// Build `mantissa × 10^-scale` exactly.
#[must_use]
pub fn decimal(mantissa: i64, scale: i64) -> BigDecimal {
    BigDecimal::new(BigInt::from(mantissa), scale)
}

/// Convert a count into a decimal without a lossy cast.
#[must_use]
pub fn usize_to_decimal(value: usize) -> BigDecimal {
    BigDecimal::from(u64::try_from(value).unwrap_or(u64::MAX))
}

/// Lossy conversion for log output only, returning NaN when out of range.
#[must_use]
pub fn to_f64_lossy(value: &BigDecimal) -> f64 {
    value.to_f64().unwrap_or(f64::NAN)
}

/// Render a decimal in plain fixed-point notation with exactly `fraction_digits` digits after the point.
#[must_use]
pub fn to_fixed(value: &BigDecimal, fraction_digits: usize) -> String {
    let scale = i64::try_from(fraction_digits).unwrap_or(i64::MAX);
    let rounded = value.with_scale_round(scale, RoundingMode::HalfEven);
    let (mantissa, _) = rounded.as_bigint_and_exponent();

    let mut digits = mantissa.magnitude().to_string();
    if digits.len() <= fraction_digits {
        let padding = "0".repeat(fraction_digits + 1 - digits.len());
        digits.insert_str(0, &padding);
    }
    let (whole, fraction) = digits.split_at(digits.len() - fraction_digits);

    let mut out = String::with_capacity(digits.len() + 2);
    if mantissa.sign() == Sign::Minus {
        out.push('-');
    }
    out.push_str(whole);
    if fraction_digits > 0 {
        out.push('.');
        out.push_str(fraction);
    }
    out
}
