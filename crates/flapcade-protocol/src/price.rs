//! USD amounts as exact integer micro-units.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::PriceError;

const MICROS_PER_DOLLAR: u64 = 1_000_000;
const MAX_DECIMALS: usize = 6;

/// A price in USD, stored as micro-dollars so `$0.001` is exact.
///
/// On the wire a price is a string like `"$0.001"`. Parsing accepts the
/// amount with or without the leading `$`, which is how operators write it
/// in the `GAME_PRICE` environment variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Price(u64);

impl Price {
    /// Builds a price from micro-dollars.
    pub const fn from_micros(micros: u64) -> Self {
        Self(micros)
    }

    /// Whole cents, handy for fixed tiers like the `$1.00` continue fee.
    pub const fn from_cents(cents: u64) -> Self {
        Self(cents * 10_000)
    }

    pub const fn micros(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / MICROS_PER_DOLLAR;
        let frac = format!("{:06}", self.0 % MICROS_PER_DOLLAR);
        // Keep cents visible ("$1.00"), drop zeros past them ("$0.001").
        let trimmed = frac.trim_end_matches('0');
        let shown = if trimmed.len() < 2 { &frac[..2] } else { trimmed };
        write!(f, "${whole}.{shown}")
    }
}

impl FromStr for Price {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        let amount = raw.strip_prefix('$').unwrap_or(raw);
        if amount.is_empty() {
            return Err(PriceError::Empty);
        }

        let malformed = || PriceError::Malformed(s.to_string());
        let (whole, frac) = amount.split_once('.').unwrap_or((amount, ""));
        if whole.is_empty() && frac.is_empty() {
            return Err(malformed());
        }
        if !whole.chars().chain(frac.chars()).all(|c| c.is_ascii_digit()) {
            return Err(malformed());
        }
        if frac.len() > MAX_DECIMALS {
            return Err(PriceError::TooPrecise(s.to_string()));
        }

        let whole: u64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| malformed())?
        };
        let frac_micros: u64 = if frac.is_empty() {
            0
        } else {
            let padded = format!("{frac:0<width$}", width = MAX_DECIMALS);
            padded.parse().map_err(|_| malformed())?
        };

        whole
            .checked_mul(MICROS_PER_DOLLAR)
            .and_then(|m| m.checked_add(frac_micros))
            .map(Self)
            .ok_or_else(malformed)
    }
}

impl TryFrom<String> for Price {
    type Error = PriceError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Price> for String {
    fn from(price: Price) -> Self {
        price.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_game_price() {
        let price: Price = "0.001".parse().unwrap();
        assert_eq!(price.micros(), 1_000);
        assert_eq!(price.to_string(), "$0.001");
    }

    #[test]
    fn test_parse_with_dollar_sign_and_whitespace() {
        let price: Price = " $1.00 ".parse().unwrap();
        assert_eq!(price, Price::from_cents(100));
        assert_eq!(price.to_string(), "$1.00");
    }

    #[test]
    fn test_display_keeps_two_decimals() {
        assert_eq!(Price::from_micros(1_500_000).to_string(), "$1.50");
        assert_eq!(Price::from_micros(0).to_string(), "$0.00");
        assert_eq!(Price::from_micros(2_000_001).to_string(), "$2.000001");
    }

    #[test]
    fn test_parse_whole_and_leading_dot() {
        assert_eq!("3".parse::<Price>().unwrap(), Price::from_cents(300));
        assert_eq!(".5".parse::<Price>().unwrap(), Price::from_cents(50));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!("".parse::<Price>(), Err(PriceError::Empty));
        assert_eq!("$".parse::<Price>(), Err(PriceError::Empty));
        assert!(matches!("one".parse::<Price>(), Err(PriceError::Malformed(_))));
        assert!(matches!("-1".parse::<Price>(), Err(PriceError::Malformed(_))));
        assert!(matches!(".".parse::<Price>(), Err(PriceError::Malformed(_))));
        assert!(matches!(
            "0.0000001".parse::<Price>(),
            Err(PriceError::TooPrecise(_))
        ));
    }

    #[cfg(feature = "json")]
    #[test]
    fn test_price_serializes_as_dollar_string() {
        let json = serde_json::to_string(&Price::from_micros(1_000)).unwrap();
        assert_eq!(json, "\"$0.001\"");
        let back: Price = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Price::from_micros(1_000));
    }

    #[test]
    fn test_price_ordering_compares_amounts() {
        assert!(Price::from_cents(100) > "0.001".parse::<Price>().unwrap());
    }
}
