use std::{
    fmt,
    iter::Sum,
    ops::{Add, AddAssign, Sub, SubAssign},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::EngineError;

/// Money amount stored as **integer cents**.
///
/// Donations, expenditures and allocations all carry this type, so the
/// repeated `min()` and subtraction of a matching pass stays exact.
///
/// ```rust
/// use engine::MoneyCents;
///
/// let amount: MoneyCents = "$12.34".parse().unwrap();
/// assert_eq!(amount, MoneyCents::new(1234));
/// assert_eq!(amount.to_string(), "$12.34");
/// assert!("12.345".parse::<MoneyCents>().is_err());
/// ```
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct MoneyCents(i64);

impl MoneyCents {
    pub const ZERO: MoneyCents = MoneyCents(0);

    #[must_use]
    pub const fn new(cents: i64) -> Self {
        Self(cents)
    }

    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    #[must_use]
    pub fn checked_add(self, rhs: MoneyCents) -> Option<MoneyCents> {
        self.0.checked_add(rhs.0).map(Self)
    }

    #[must_use]
    pub fn checked_sub(self, rhs: MoneyCents) -> Option<MoneyCents> {
        self.0.checked_sub(rhs.0).map(Self)
    }

    /// Sum `amounts`, or `None` if the total does not fit in an `i64`.
    #[must_use]
    pub fn checked_sum<I: IntoIterator<Item = MoneyCents>>(amounts: I) -> Option<MoneyCents> {
        amounts
            .into_iter()
            .try_fold(Self::ZERO, |total, amount| total.checked_add(amount))
    }

    /// What is left of `self` once `used` is taken out, never below zero.
    #[must_use]
    pub fn saturating_remaining(self, used: MoneyCents) -> MoneyCents {
        Self(self.0.saturating_sub(used.0).max(0))
    }
}

impl fmt::Display for MoneyCents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let abs = self.0.unsigned_abs();
        if self.0 < 0 {
            f.write_str("-")?;
        }
        write!(f, "${}.{:02}", abs / 100, abs % 100)
    }
}

impl Add for MoneyCents {
    type Output = MoneyCents;

    fn add(self, rhs: MoneyCents) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for MoneyCents {
    fn add_assign(&mut self, rhs: MoneyCents) {
        self.0 += rhs.0;
    }
}

impl Sub for MoneyCents {
    type Output = MoneyCents;

    fn sub(self, rhs: MoneyCents) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl SubAssign for MoneyCents {
    fn sub_assign(&mut self, rhs: MoneyCents) {
        self.0 -= rhs.0;
    }
}

impl Sum for MoneyCents {
    fn sum<I: Iterator<Item = MoneyCents>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

fn invalid_amount(input: &str, reason: &str) -> EngineError {
    EngineError::Validation(format!("invalid amount {input:?}: {reason}"))
}

fn digits(part: &str) -> bool {
    !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit())
}

impl FromStr for MoneyCents {
    type Err = EngineError;

    /// Parse `[+|-][$]units[(.|,)cents]` with at most two fractional digits.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim();
        let (negative, unsigned) = match input.as_bytes().first() {
            Some(b'-') => (true, &input[1..]),
            Some(b'+') => (false, &input[1..]),
            _ => (false, input),
        };
        let unsigned = unsigned.trim_start();
        let body = unsigned.strip_prefix('$').unwrap_or(unsigned);
        if body.is_empty() {
            return Err(invalid_amount(s, "empty"));
        }

        let (units, fraction) = match body.split_once(['.', ',']) {
            Some((units, fraction)) => (units, fraction),
            None => (body, ""),
        };
        if !digits(units) {
            return Err(invalid_amount(s, "expected digits"));
        }
        let fraction_cents = match fraction.len() {
            0 => 0,
            1 | 2 if digits(fraction) => {
                let value: i64 = fraction
                    .parse()
                    .map_err(|_| invalid_amount(s, "expected digits"))?;
                if fraction.len() == 1 { value * 10 } else { value }
            }
            1 | 2 => return Err(invalid_amount(s, "expected digits")),
            _ => return Err(invalid_amount(s, "more than two decimals")),
        };

        let cents = units
            .parse::<i64>()
            .ok()
            .and_then(|u| u.checked_mul(100))
            .and_then(|c| c.checked_add(fraction_cents))
            .ok_or_else(|| invalid_amount(s, "too large"))?;

        Ok(Self(if negative { -cents } else { cents }))
    }
}
