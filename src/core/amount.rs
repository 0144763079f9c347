//! Exact fixed-precision monetary amounts
//!
//! Every value in the ledger is an integer count of satoshis, the smallest
//! settlement unit. One coin is 100,000,000 satoshis, so amounts carry exactly
//! 8 fractional digits and never touch floating point.
//!
//! Arithmetic is checked only: `checked_add`/`checked_sub`/`checked_sum`
//! return `None` instead of wrapping, and parsing refuses anything that
//! cannot be represented exactly.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Number of satoshis in one coin (same as Bitcoin)
pub const SATOSHIS_PER_COIN: i64 = 100_000_000;

/// Number of fractional digits carried by an [`Amount`]
pub const AMOUNT_DECIMALS: usize = 8;

/// Currency suffix accepted (and ignored) when parsing user-typed amounts
const CURRENCY_SUFFIX: &str = "BTC";

/// A signed amount of satoshis.
///
/// Outputs must never be negative, but the type is signed so that the
/// validator can see and reject a negative output instead of it being
/// unrepresentable, and so that fees recomputed against a changed UTXO
/// set can go below zero without wrapping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(i64);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    pub const fn from_sats(sats: i64) -> Amount {
        Amount(sats)
    }

    /// Whole coins; intended for constants and test fixtures.
    pub const fn from_coins(coins: i64) -> Amount {
        Amount(coins * SATOSHIS_PER_COIN)
    }

    pub const fn to_sats(self) -> i64 {
        self.0
    }

    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, rhs: Amount) -> Option<Amount> {
        self.0.checked_add(rhs.0).map(Amount)
    }

    pub fn checked_sub(self, rhs: Amount) -> Option<Amount> {
        self.0.checked_sub(rhs.0).map(Amount)
    }

    /// Sum a sequence of amounts, `None` on overflow.
    pub fn checked_sum<I>(amounts: I) -> Option<Amount>
    where
        I: IntoIterator<Item = Amount>,
    {
        amounts
            .into_iter()
            .try_fold(Amount::ZERO, |acc, amount| acc.checked_add(amount))
    }
}

/// Errors produced while parsing an [`Amount`] from text
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountParseError {
    #[error("amount is empty")]
    Empty,
    #[error("invalid character in amount: {0:?}")]
    InvalidCharacter(String),
    #[error("amount has more than 8 fractional digits")]
    TooPrecise,
    #[error("amount is out of range")]
    OutOfRange,
}

impl FromStr for Amount {
    type Err = AmountParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut text = s.trim();
        if text.len() >= CURRENCY_SUFFIX.len() {
            let (head, tail) = text.split_at(text.len() - CURRENCY_SUFFIX.len());
            if tail.eq_ignore_ascii_case(CURRENCY_SUFFIX) {
                text = head.trim_end();
            }
        }

        let (negative, digits) = match text.as_bytes().first() {
            Some(b'-') => (true, &text[1..]),
            Some(b'+') => (false, &text[1..]),
            Some(_) => (false, text),
            None => return Err(AmountParseError::Empty),
        };

        let (whole, fraction) = match digits.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (digits, ""),
        };
        if whole.is_empty() && fraction.is_empty() {
            return Err(AmountParseError::Empty);
        }
        if let Some(bad) = whole
            .chars()
            .chain(fraction.chars())
            .find(|c| !c.is_ascii_digit())
        {
            return Err(AmountParseError::InvalidCharacter(bad.to_string()));
        }
        if fraction.len() > AMOUNT_DECIMALS {
            return Err(AmountParseError::TooPrecise);
        }

        let whole_sats = if whole.is_empty() {
            0
        } else {
            whole
                .parse::<i64>()
                .ok()
                .and_then(|w| w.checked_mul(SATOSHIS_PER_COIN))
                .ok_or(AmountParseError::OutOfRange)?
        };
        let fraction_sats = if fraction.is_empty() {
            0
        } else {
            let padded = format!("{fraction:0<width$}", width = AMOUNT_DECIMALS);
            padded
                .parse::<i64>()
                .map_err(|_| AmountParseError::OutOfRange)?
        };

        let sats = whole_sats
            .checked_add(fraction_sats)
            .ok_or(AmountParseError::OutOfRange)?;
        Ok(Amount(if negative { -sats } else { sats }))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let per_coin = SATOSHIS_PER_COIN as u64;
        write!(
            f,
            "{sign}{}.{:0width$}",
            abs / per_coin,
            abs % per_coin,
            width = AMOUNT_DECIMALS
        )
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_exact_decimals() {
        assert_eq!("50".parse::<Amount>().unwrap(), Amount::from_coins(50));
        assert_eq!(
            "39.999".parse::<Amount>().unwrap(),
            Amount::from_sats(3_999_900_000)
        );
        assert_eq!("0.001".parse::<Amount>().unwrap(), Amount::from_sats(100_000));
        assert_eq!(".5".parse::<Amount>().unwrap(), Amount::from_sats(50_000_000));
        assert_eq!("0.00000001".parse::<Amount>().unwrap(), Amount::from_sats(1));
        assert_eq!("-5.0".parse::<Amount>().unwrap(), Amount::from_coins(-5));
    }

    #[test]
    fn test_parse_currency_suffix() {
        assert_eq!("10.0 BTC".parse::<Amount>().unwrap(), Amount::from_coins(10));
        assert_eq!(" 2 btc ".parse::<Amount>().unwrap(), Amount::from_coins(2));
    }

    #[test]
    fn test_parse_rejects_inexact_or_garbage() {
        assert_eq!(
            "0.000000001".parse::<Amount>(),
            Err(AmountParseError::TooPrecise)
        );
        assert_eq!("".parse::<Amount>(), Err(AmountParseError::Empty));
        assert_eq!("BTC".parse::<Amount>(), Err(AmountParseError::Empty));
        assert_eq!(".".parse::<Amount>(), Err(AmountParseError::Empty));
        assert!(matches!(
            "1e5".parse::<Amount>(),
            Err(AmountParseError::InvalidCharacter(_))
        ));
        assert_eq!(
            "99999999999999".parse::<Amount>(),
            Err(AmountParseError::OutOfRange)
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(Amount::from_coins(1).to_string(), "1.00000000");
        assert_eq!(Amount::from_sats(100_000).to_string(), "0.00100000");
        assert_eq!(Amount::from_sats(-150_000_000).to_string(), "-1.50000000");
        assert_eq!(Amount::ZERO.to_string(), "0.00000000");
    }

    #[test]
    fn test_exact_arithmetic() {
        let fifty = Amount::from_coins(50);
        let outputs = Amount::checked_sum([
            Amount::from_coins(10),
            "39.999".parse::<Amount>().unwrap(),
        ])
        .unwrap();
        assert_eq!(fifty.checked_sub(outputs), Some(Amount::from_sats(100_000)));

        // 0.1 + 0.2 is exactly 0.3 here, unlike f64
        let a: Amount = "0.1".parse().unwrap();
        let b: Amount = "0.2".parse().unwrap();
        assert_eq!(a.checked_add(b), Some("0.3".parse().unwrap()));
    }

    #[test]
    fn test_overflow_is_reported() {
        let max = Amount::from_sats(i64::MAX);
        assert_eq!(max.checked_add(Amount::from_sats(1)), None);
        assert_eq!(Amount::checked_sum([max, max]), None);
        assert_eq!(Amount::from_sats(i64::MIN).checked_sub(Amount::from_sats(1)), None);
    }

    #[test]
    fn test_serde_as_exact_string() {
        let amount: Amount = "39.999".parse().unwrap();
        let json = serde_json::to_string(&amount).unwrap();
        assert_eq!(json, "\"39.99900000\"");
        let back: Amount = serde_json::from_str(&json).unwrap();
        assert_eq!(back, amount);
    }
}
