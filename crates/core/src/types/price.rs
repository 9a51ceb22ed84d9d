//! Type-safe price representation using decimal arithmetic.
//!
//! Prices are stored in the currency's standard unit (rand, not cents). The
//! browser storage format writes them as JSON numbers, so [`Price`] reads
//! numbers or numeric strings and always writes a number.

use core::fmt;
use core::iter::Sum;
use core::ops::Add;
use core::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Symbol prefixed to every displayed amount (South African rand).
pub const CURRENCY_SYMBOL: &str = "R";

/// Errors that can occur when parsing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The input is not a decimal number.
    #[error("price must be a number: {0}")]
    NotANumber(String),
    /// The input is below zero.
    #[error("price cannot be negative")]
    Negative,
}

/// A non-negative price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Price(Decimal);

impl Price {
    /// A price of zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price from a decimal amount.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Negative`] if `amount` is below zero.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative);
        }
        Ok(Self(amount.normalize()))
    }

    /// Create a price from an integer number of cents.
    ///
    /// Negative input is clamped to zero.
    #[must_use]
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents.max(0), 2).normalize())
    }

    /// Parse a price from user input such as a form field.
    ///
    /// Accepts plain (`29.99`) and scientific (`2.999e1`) notation.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError`] if the input is not a number or is negative.
    pub fn parse(input: &str) -> Result<Self, PriceError> {
        let trimmed = input.trim();
        let amount = Decimal::from_str(trimmed)
            .or_else(|_| Decimal::from_scientific(trimmed))
            .map_err(|_| PriceError::NotANumber(trimmed.to_string()))?;
        Self::new(amount)
    }

    /// Get the underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Price of `qty` units.
    ///
    /// Saturates at the largest representable amount instead of overflowing.
    #[must_use]
    pub fn line_total(&self, qty: u32) -> Self {
        Self(self.0.saturating_mul(Decimal::from(qty)))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{CURRENCY_SYMBOL}{:.2}", self.0)
    }
}

impl FromStr for Price {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Add for Price {
    type Output = Self;

    /// Saturating, like [`Price::line_total`].
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0.to_f64() {
            Some(value) => serializer.serialize_f64(value),
            None => serializer.serialize_str(&self.0.to_string()),
        }
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(serde_json::Number),
            Text(String),
        }

        // Going through the number's shortest textual form keeps 29.99 exact
        // instead of inheriting the binary float expansion.
        let text = match Raw::deserialize(deserializer)? {
            Raw::Number(n) => n.to_string(),
            Raw::Text(s) => s,
        };
        Self::parse(&text).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_decimal() {
        let price = Price::parse("29.99").unwrap();
        assert_eq!(price.amount(), Decimal::new(2999, 2));
    }

    #[test]
    fn test_parse_rejects_negative() {
        assert_eq!(Price::parse("-1"), Err(PriceError::Negative));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            Price::parse("free"),
            Err(PriceError::NotANumber(_))
        ));
    }

    #[test]
    fn test_display_uses_rand_with_two_places() {
        assert_eq!(Price::parse("249").unwrap().to_string(), "R249.00");
        assert_eq!(Price::from_cents(6997).to_string(), "R69.97");
    }

    #[test]
    fn test_deserialize_number_is_exact() {
        let price: Price = serde_json::from_str("19.99").unwrap();
        assert_eq!(price, Price::from_cents(1999));
    }

    #[test]
    fn test_deserialize_numeric_string() {
        let price: Price = serde_json::from_str("\"149\"").unwrap();
        assert_eq!(price, Price::from_cents(14900));
    }

    #[test]
    fn test_serialize_as_number() {
        let json = serde_json::to_string(&Price::from_cents(2999)).unwrap();
        assert_eq!(json, "29.99");
    }

    #[test]
    fn test_line_total_and_sum() {
        let a = Price::from_cents(2999);
        let b = Price::from_cents(1999).line_total(2);
        let total: Price = [a, b].into_iter().sum();
        assert_eq!(total, Price::from_cents(6997));
    }

    #[test]
    fn test_arithmetic_saturates_instead_of_overflowing() {
        let huge = Price::parse("1e20").unwrap();
        let line = huge.line_total(u32::MAX);
        assert_eq!(line.amount(), Decimal::MAX);

        let total: Price = [line, huge, Price::from_cents(1)].into_iter().sum();
        assert_eq!(total.amount(), Decimal::MAX);
        assert!(total.to_string().starts_with("R79228162514264337593543950335"));
    }
}
