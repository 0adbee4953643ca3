//! Fixed-point decimal amounts and their on-chain integer representation.
//!
//! Human units (BTC, ETH, token units) are parsed from decimal strings and kept
//! as an exact `digits × 10^-scale` pair. Conversion to base units never goes
//! through floating point.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Largest decimal exponent that still fits a `u128`.
pub const MAX_DECIMALS: u32 = 38;

/// Satoshis per bitcoin.
pub const BTC_DECIMALS: u32 = 8;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AmountError {
    #[error("empty amount")]
    Empty,
    #[error("negative amount: {0}")]
    Negative(String),
    #[error("invalid amount: {0}")]
    Invalid(String),
    #[error("amount has more than {MAX_DECIMALS} fractional digits")]
    TooPrecise,
    #[error("amount overflows base units")]
    Overflow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Amount {
    digits: u128,
    scale: u32,
}

impl Amount {
    pub const ZERO: Self = Self { digits: 0, scale: 0 };

    /// Interprets `units` as an integer count of `10^-decimals` steps.
    pub fn from_base_units(units: u128, decimals: u32) -> Result<Self, AmountError> {
        if decimals > MAX_DECIMALS {
            return Err(AmountError::TooPrecise);
        }
        Ok(Self::normalized(units, decimals))
    }

    /// `self × 10^decimals`, rounded half-up to an integer.
    pub fn to_base_units(&self, decimals: u32) -> Result<u128, AmountError> {
        if decimals >= self.scale {
            let factor = pow10(decimals - self.scale)?;
            return self.digits.checked_mul(factor).ok_or(AmountError::Overflow);
        }

        let divisor = pow10(self.scale - decimals)?;
        let quotient = self.digits / divisor;
        let remainder = self.digits % divisor;
        if remainder.saturating_mul(2) >= divisor {
            Ok(quotient + 1)
        } else {
            Ok(quotient)
        }
    }

    /// Satoshi value of a BTC amount.
    pub fn to_sat(&self) -> Result<u64, AmountError> {
        let units = self.to_base_units(BTC_DECIMALS)?;
        u64::try_from(units).map_err(|_| AmountError::Overflow)
    }

    pub fn from_sat(sats: u64) -> Self {
        Self::normalized(u128::from(sats), BTC_DECIMALS)
    }

    pub fn is_zero(&self) -> bool {
        self.digits == 0
    }

    fn normalized(mut digits: u128, mut scale: u32) -> Self {
        if digits == 0 {
            return Self::ZERO;
        }
        while scale > 0 && digits % 10 == 0 {
            digits /= 10;
            scale -= 1;
        }
        Self { digits, scale }
    }
}

fn pow10(exp: u32) -> Result<u128, AmountError> {
    10u128.checked_pow(exp).ok_or(AmountError::Overflow)
}

impl From<u64> for Amount {
    fn from(whole: u64) -> Self {
        Self::normalized(u128::from(whole), 0)
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(AmountError::Empty);
        }
        if trimmed.starts_with('-') {
            return Err(AmountError::Negative(trimmed.to_string()));
        }
        let unsigned = trimmed.strip_prefix('+').unwrap_or(trimmed);

        let (whole, fraction) = match unsigned.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (unsigned, ""),
        };
        if whole.is_empty() && fraction.is_empty() {
            return Err(AmountError::Invalid(trimmed.to_string()));
        }
        let all_digits = |part: &str| part.bytes().all(|byte| byte.is_ascii_digit());
        if !all_digits(whole) || !all_digits(fraction) {
            return Err(AmountError::Invalid(trimmed.to_string()));
        }

        let fraction = fraction.trim_end_matches('0');
        let scale = u32::try_from(fraction.len()).map_err(|_| AmountError::TooPrecise)?;
        if scale > MAX_DECIMALS {
            return Err(AmountError::TooPrecise);
        }

        let mut digits: u128 = 0;
        for byte in whole.bytes().chain(fraction.bytes()) {
            digits = digits
                .checked_mul(10)
                .and_then(|value| value.checked_add(u128::from(byte - b'0')))
                .ok_or(AmountError::Overflow)?;
        }
        Ok(Self::normalized(digits, scale))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.scale == 0 {
            return write!(f, "{}", self.digits);
        }
        // scale <= MAX_DECIMALS, so the power always fits
        let divisor = 10u128.pow(self.scale);
        write!(
            f,
            "{}.{:0width$}",
            self.digits / divisor,
            self.digits % divisor,
            width = self.scale as usize
        )
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AmountRepr {
    Text(String),
    Whole(u64),
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match AmountRepr::deserialize(deserializer)? {
            AmountRepr::Text(text) => text.parse().map_err(serde::de::Error::custom),
            AmountRepr::Whole(whole) => Ok(Self::from(whole)),
        }
    }
}
