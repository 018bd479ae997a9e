//! Non-negative money amount with decimal precision.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! This type wraps `rust_decimal::Decimal` for arbitrary precision.
//!
//! Budget amounts arrive from forms and from a loosely-typed remote API, so
//! construction never fails: anything that is not a number degrades to zero
//! and negative values are clamped to zero.

use std::fmt;
use std::iter::Sum;
use std::ops::Add;
use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Number, Value};

/// A monetary amount that is never negative.
///
/// Uses `Decimal` internally to avoid floating-point precision errors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(Decimal);

impl Amount {
    /// The zero amount.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Creates an amount, clamping negative values to zero.
    #[must_use]
    pub fn new(value: Decimal) -> Self {
        if value.is_sign_negative() {
            Self::ZERO
        } else {
            Self(value)
        }
    }

    /// Parses user input the way a numeric form field does.
    ///
    /// Surrounding whitespace is ignored. Empty or non-numeric input yields
    /// zero, as does a negative number.
    #[must_use]
    pub fn parse_lenient(input: &str) -> Self {
        parse_decimal(input).map_or(Self::ZERO, Self::new)
    }

    /// Coerces an arbitrary JSON value.
    ///
    /// Numbers and numeric strings are accepted; `null`, booleans, arrays,
    /// objects and non-numeric strings all become zero.
    #[must_use]
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Number(n) => number_to_decimal(n).map_or(Self::ZERO, Self::new),
            Value::String(s) => Self::parse_lenient(s),
            _ => Self::ZERO,
        }
    }

    /// Returns the inner decimal value.
    #[must_use]
    pub const fn value(self) -> Decimal {
        self.0
    }

    /// Returns true if the amount is zero.
    #[must_use]
    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    /// Subtracts, flooring the result at zero.
    #[must_use]
    pub fn saturating_sub(self, other: Self) -> Self {
        Self::new(self.0 - other.0)
    }
}

fn parse_decimal(input: &str) -> Option<Decimal> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .ok()
}

fn number_to_decimal(n: &Number) -> Option<Decimal> {
    if let Some(i) = n.as_i64() {
        return Some(Decimal::from(i));
    }
    if let Some(u) = n.as_u64() {
        return Some(Decimal::from(u));
    }
    // Shortest round-trip text of the float keeps `0.1` as exactly 0.1.
    parse_decimal(&n.to_string()).or_else(|| n.as_f64().and_then(Decimal::from_f64))
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Self::new(value)
    }
}

impl Add for Amount {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0.checked_add(rhs.0).unwrap_or(Decimal::MAX))
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Amount> for Amount {
    fn sum<I: Iterator<Item = &'a Amount>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        // The remote API speaks plain JSON numbers.
        let normalized = self.0.normalize();
        if normalized.scale() == 0
            && let Some(whole) = normalized.to_i64()
        {
            return serializer.serialize_i64(whole);
        }
        serializer.serialize_f64(normalized.to_f64().unwrap_or_default())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::from_json(&value))
    }
}

#[cfg(test)]
#[path = "money_tests.rs"]
mod tests;
