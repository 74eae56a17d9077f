//! Arbitrary-precision number carried as decimal text.
//!
//! DynamoDB numbers have up to 38 significant digits, more than any native
//! float holds. `Number` keeps the exact text it was built from and only
//! converts to a native type on request.

use std::fmt;
use std::str::FromStr;

use crate::error::CodecError;

/// A DynamoDB number, stored as validated decimal text.
///
/// Equality and ordering are textual: `1` and `1.0` are different `Number`s
/// even though the service treats them as the same value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Number(String);

impl Number {
    /// Returns the decimal text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the number and returns its decimal text.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }

    /// Returns `true` if the text starts with a minus sign.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.0.starts_with('-')
    }

    /// The same number without its sign.
    #[must_use]
    pub fn abs(&self) -> Self {
        Self(self.0.trim_start_matches(['-', '+']).to_owned())
    }

    /// Converts to `i64` if the value is integral and in range.
    ///
    /// Integral text with a zero fraction (`10.00`) converts; exponent
    /// notation does not.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        self.integral_text()?.parse().ok()
    }

    /// Converts to `u64` if the value is integral, non-negative and in range.
    #[must_use]
    pub fn as_u64(&self) -> Option<u64> {
        self.integral_text()?.parse().ok()
    }

    /// Converts to `f64`.
    ///
    /// Lossy: integers above 2^53 and most fractions are rounded to the
    /// nearest representable float, and values beyond `f64::MAX` become
    /// infinite.
    #[must_use]
    pub fn as_f64(&self) -> f64 {
        self.0.parse().unwrap_or(f64::NAN)
    }

    fn integral_text(&self) -> Option<&str> {
        if self.0.contains(['e', 'E']) {
            return None;
        }
        match self.0.split_once('.') {
            None => Some(&self.0),
            Some((int, frac)) if frac.bytes().all(|b| b == b'0') => Some(int),
            Some(_) => None,
        }
    }
}

/// Returns `true` if `text` is `[+-]digits[.digits][(e|E)[+-]digits]` with at
/// least one digit in the mantissa.
fn is_decimal(text: &str) -> bool {
    let bytes = text.as_bytes();
    let mut i = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        i += 1;
    }

    let int_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    let mut mantissa_digits = i - int_start;

    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        let frac_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        mantissa_digits += i - frac_start;
    }
    if mantissa_digits == 0 {
        return false;
    }

    if i < bytes.len() && matches!(bytes[i], b'e' | b'E') {
        i += 1;
        if matches!(bytes.get(i), Some(b'+' | b'-')) {
            i += 1;
        }
        let exp_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i == exp_start {
            return false;
        }
    }

    i == bytes.len()
}

impl FromStr for Number {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if is_decimal(s) {
            Ok(Self(s.to_owned()))
        } else {
            Err(CodecError::UnsupportedType {
                kind: "number".to_owned(),
                reason: format!("{s:?} is not a decimal number"),
            })
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

macro_rules! impl_from_integer {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Number {
                fn from(n: $ty) -> Self {
                    Self(n.to_string())
                }
            }
        )*
    };
}

impl_from_integer!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

impl TryFrom<f64> for Number {
    type Error = CodecError;

    fn try_from(n: f64) -> Result<Self, Self::Error> {
        if n.is_finite() {
            Ok(Self(n.to_string()))
        } else {
            Err(CodecError::UnsupportedType {
                kind: "f64".to_owned(),
                reason: format!("{n} has no decimal representation"),
            })
        }
    }
}

impl TryFrom<f32> for Number {
    type Error = CodecError;

    fn try_from(n: f32) -> Result<Self, Self::Error> {
        if n.is_finite() {
            Ok(Self(n.to_string()))
        } else {
            Err(CodecError::UnsupportedType {
                kind: "f32".to_owned(),
                reason: format!("{n} has no decimal representation"),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_accept_decimal_forms() {
        for text in ["0", "-1", "+7", "3.14", ".5", "5.", "1e10", "-2.5E-3", "12345678901234567890123456789012345678"] {
            assert!(text.parse::<Number>().is_ok(), "{text}");
        }
    }

    #[test]
    fn test_should_reject_non_decimal_text() {
        for text in ["", "-", ".", "abc", "1.2.3", "1e", "NaN", "inf", "0x10", " 1"] {
            assert!(text.parse::<Number>().is_err(), "{text}");
        }
    }

    #[test]
    fn test_should_preserve_exact_text() {
        let n: Number = "0.10000000000000000000000000000000000001".parse().unwrap();
        assert_eq!(n.as_str(), "0.10000000000000000000000000000000000001");
    }

    #[test]
    fn test_should_convert_integers_exactly() {
        assert_eq!(Number::from(i64::MIN).as_i64(), Some(i64::MIN));
        assert_eq!(Number::from(u64::MAX).as_u64(), Some(u64::MAX));
        assert_eq!(Number::from(u128::MAX).as_str(), "340282366920938463463374607431768211455");
    }

    #[test]
    fn test_should_refuse_lossy_integer_conversion() {
        let fractional: Number = "1.5".parse().unwrap();
        assert_eq!(fractional.as_i64(), None);
        let zero_fraction: Number = "10.00".parse().unwrap();
        assert_eq!(zero_fraction.as_i64(), Some(10));
        let too_big = Number::from(u64::MAX);
        assert_eq!(too_big.as_i64(), None);
        assert_eq!(Number::from(-1).as_u64(), None);
    }

    #[test]
    fn test_should_reject_non_finite_floats() {
        assert!(Number::try_from(f64::NAN).is_err());
        assert!(Number::try_from(f64::INFINITY).is_err());
        assert!(Number::try_from(f32::NEG_INFINITY).is_err());
        assert_eq!(Number::try_from(2.5_f64).unwrap().as_str(), "2.5");
    }

    #[test]
    fn test_should_strip_sign_for_abs() {
        let n = Number::from(-3);
        assert!(n.is_negative());
        assert_eq!(n.abs().as_str(), "3");
    }
}
