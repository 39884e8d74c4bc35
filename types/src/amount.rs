//! SEEDS token amounts.
//!
//! Amounts are fixed-point integers in the token's smallest unit
//! (10^-6 SEEDS). Human-facing decimal strings are converted at the API
//! boundary only; nothing below it touches floating point.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

use crate::error::TypesError;

/// Number of decimal places of the SEEDS token.
pub const DECIMALS: u32 = 6;

/// Smallest units per whole token.
pub const UNITS_PER_TOKEN: u128 = 10u128.pow(DECIMALS);

/// A SEEDS amount in smallest units.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct TokenAmount(u128);

impl TokenAmount {
    pub const ZERO: Self = Self(0);

    pub fn new(raw: u128) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u128 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    pub fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    pub fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }

    /// The amount as the ledger's native `u64`, if it fits.
    pub fn to_u64(&self) -> Option<u64> {
        u64::try_from(self.0).ok()
    }

    /// Parse a human decimal amount such as `"1.5"`, `"0.000001"` or `"2e-3"`.
    ///
    /// Digits beyond the sixth fractional place are truncated. Negative
    /// values, empty strings and non-numeric input are rejected.
    pub fn from_human(input: &str) -> Result<Self, TypesError> {
        let invalid = || TypesError::InvalidAmount(input.to_string());
        let s = input.trim();
        let s = s.strip_prefix('+').unwrap_or(s);
        if s.is_empty() || s.starts_with('-') {
            return Err(invalid());
        }

        let (mantissa, exponent) = match s.find(['e', 'E']) {
            Some(pos) => {
                let exp: i32 = s[pos + 1..].parse().map_err(|_| invalid())?;
                if exp.abs() > 64 {
                    return Err(invalid());
                }
                (&s[..pos], exp)
            }
            None => (s, 0),
        };

        let (int_part, frac_part) = match mantissa.split_once('.') {
            Some((i, f)) => (i, f),
            None => (mantissa, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(invalid());
        }
        if !int_part.bytes().all(|b| b.is_ascii_digit())
            || !frac_part.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }

        // Shift the decimal point by the exponent plus the token scale, then
        // drop whatever stays on the fractional side.
        let digits: String = format!("{int_part}{frac_part}");
        let point = int_part.len() as i64 + exponent as i64 + DECIMALS as i64;
        if point <= 0 {
            return Ok(Self::ZERO);
        }
        let point = point as usize;
        let whole = if point >= digits.len() {
            let mut padded = digits;
            padded.extend(std::iter::repeat('0').take(point - padded.len()));
            padded
        } else {
            digits[..point].to_string()
        };

        let trimmed = whole.trim_start_matches('0');
        if trimmed.is_empty() {
            return Ok(Self::ZERO);
        }
        trimmed.parse::<u128>().map(Self).map_err(|_| invalid())
    }

    /// Render as a decimal string with exactly six fractional digits.
    pub fn to_human(&self) -> String {
        format!(
            "{}.{:0width$}",
            self.0 / UNITS_PER_TOKEN,
            self.0 % UNITS_PER_TOKEN,
            width = DECIMALS as usize
        )
    }

    /// The amount in whole tokens as a float, for ratios and filters only.
    pub fn as_tokens_f64(&self) -> f64 {
        self.0 as f64 / UNITS_PER_TOKEN as f64
    }
}

impl Add for TokenAmount {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sub for TokenAmount {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl std::iter::Sum for TokenAmount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |acc, x| acc.saturating_add(x))
    }
}

impl From<u64> for TokenAmount {
    fn from(raw: u64) -> Self {
        Self(raw as u128)
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} SEEDS", self.to_human())
    }
}
