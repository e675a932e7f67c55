//! Money type for representing currency amounts
//!
//! Amounts are stored as an integer count of minor units (cents) tagged with
//! a currency code. Arithmetic never touches floating point and never mixes
//! currencies; conversion to major units only happens when formatting.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::{BudgetError, BudgetResult};

/// Three-letter uppercase ISO 4217 currency code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Currency([u8; 3]);

impl Currency {
    pub const USD: Currency = Currency(*b"USD");
    pub const EUR: Currency = Currency(*b"EUR");
    pub const GBP: Currency = Currency(*b"GBP");

    /// Parse a currency code, accepting lowercase input
    pub fn parse(code: &str) -> BudgetResult<Self> {
        let code = code.trim();
        let bytes = code.as_bytes();
        if bytes.len() != 3 || !bytes.iter().all(u8::is_ascii_alphabetic) {
            return Err(BudgetError::InvalidCurrency(code.to_string()));
        }
        Ok(Self([
            bytes[0].to_ascii_uppercase(),
            bytes[1].to_ascii_uppercase(),
            bytes[2].to_ascii_uppercase(),
        ]))
    }

    /// The code as a string slice
    pub fn as_str(&self) -> &str {
        // Only ASCII letters are ever stored.
        std::str::from_utf8(&self.0).unwrap_or("???")
    }
}

impl Default for Currency {
    fn default() -> Self {
        Self::USD
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Currency {
    type Err = BudgetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Currency {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Currency {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = String::deserialize(deserializer)?;
        Self::parse(&code).map_err(de::Error::custom)
    }
}

/// A monetary amount in minor units of a single currency
///
/// Using i64 cents supports amounts up to roughly 92 quadrillion major units
/// either side of zero. Overflow is reported as `InvalidAmount`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Money {
    minor_units: i64,
    currency: Currency,
}

impl Money {
    /// Create an amount from minor units
    ///
    /// # Examples
    /// ```
    /// use budget_engine::models::{Currency, Money};
    /// let amount = Money::new(1050, Currency::USD); // 10.50 USD
    /// assert_eq!(amount.minor_units(), 1050);
    /// ```
    pub const fn new(minor_units: i64, currency: Currency) -> Self {
        Self {
            minor_units,
            currency,
        }
    }

    /// Create an amount from major and minor parts, e.g. (10, 50) for 10.50
    pub fn from_major_minor(major: i64, minor: i64, currency: Currency) -> BudgetResult<Self> {
        major
            .checked_mul(100)
            .and_then(|units| units.checked_add(minor))
            .map(|units| Self::new(units, currency))
            .ok_or_else(|| BudgetError::InvalidAmount(format!("{}.{:02} overflows", major, minor)))
    }

    /// A zero amount
    pub const fn zero(currency: Currency) -> Self {
        Self::new(0, currency)
    }

    pub const fn minor_units(&self) -> i64 {
        self.minor_units
    }

    pub const fn currency(&self) -> Currency {
        self.currency
    }

    /// Whole major units, truncated toward zero
    pub const fn major_part(&self) -> i64 {
        self.minor_units / 100
    }

    /// Minor-unit remainder (0-99)
    pub const fn minor_part(&self) -> i64 {
        (self.minor_units % 100).abs()
    }

    pub const fn is_zero(&self) -> bool {
        self.minor_units == 0
    }

    pub const fn is_positive(&self) -> bool {
        self.minor_units > 0
    }

    pub const fn is_negative(&self) -> bool {
        self.minor_units < 0
    }

    fn ensure_same_currency(&self, other: &Money) -> BudgetResult<()> {
        if self.currency != other.currency {
            return Err(BudgetError::CurrencyMismatch {
                left: self.currency,
                right: other.currency,
            });
        }
        Ok(())
    }

    /// Add two amounts of the same currency
    pub fn try_add(self, other: Money) -> BudgetResult<Money> {
        self.ensure_same_currency(&other)?;
        self.minor_units
            .checked_add(other.minor_units)
            .map(|units| Money::new(units, self.currency))
            .ok_or_else(|| BudgetError::InvalidAmount(format!("{} + {} overflows", self, other)))
    }

    /// Subtract an amount of the same currency; the result may be negative
    pub fn try_sub(self, other: Money) -> BudgetResult<Money> {
        self.ensure_same_currency(&other)?;
        self.minor_units
            .checked_sub(other.minor_units)
            .map(|units| Money::new(units, self.currency))
            .ok_or_else(|| BudgetError::InvalidAmount(format!("{} - {} overflows", self, other)))
    }

    /// Sum amounts that must all be in `currency`
    pub fn try_sum<I>(amounts: I, currency: Currency) -> BudgetResult<Money>
    where
        I: IntoIterator<Item = Money>,
    {
        amounts
            .into_iter()
            .try_fold(Money::zero(currency), |total, amount| total.try_add(amount))
    }

    /// `part / whole * 100`, unclamped
    ///
    /// Returns `None` when `whole` is zero. A zero result is always `+0.0`.
    pub fn percentage_of(part: Money, whole: Money) -> BudgetResult<Option<f64>> {
        part.ensure_same_currency(&whole)?;
        if whole.is_zero() {
            return Ok(None);
        }
        let percentage = part.minor_units as f64 / whole.minor_units as f64 * 100.0;
        Ok(Some(if percentage == 0.0 { 0.0 } else { percentage }))
    }

    /// Reject negative amounts, naming the offending field in the error
    pub fn ensure_non_negative(self, what: &str) -> BudgetResult<Money> {
        if self.is_negative() {
            return Err(BudgetError::InvalidAmount(format!(
                "{} cannot be negative ({})",
                what, self
            )));
        }
        Ok(self)
    }

    /// Split into `parts` amounts that sum exactly to `self`
    ///
    /// Integer division; the remainder goes to the first part.
    pub fn split_evenly(self, parts: usize) -> Vec<Money> {
        if parts == 0 {
            return Vec::new();
        }
        let count = i64::try_from(parts).unwrap_or(i64::MAX);
        let share = self.minor_units / count;
        let remainder = self.minor_units % count;

        let mut shares = vec![Money::new(share, self.currency); parts];
        shares[0] = Money::new(share + remainder, self.currency);
        shares
    }

    /// Parse an amount typed in major units
    ///
    /// Accepts formats: "10.50", "-10.50", "$10.50", "10", "10.5".
    /// More than two decimal places is rejected rather than truncated.
    pub fn parse(s: &str, currency: Currency) -> BudgetResult<Self> {
        let s = s.trim();
        let invalid = || BudgetError::InvalidAmount(format!("cannot parse '{}'", s));

        let (negative, rest) = match s.strip_prefix('-') {
            Some(stripped) => (true, stripped),
            None => (false, s),
        };
        let rest = rest.strip_prefix('$').unwrap_or(rest);
        let (whole, fraction) = rest.split_once('.').unwrap_or((rest, ""));

        let digits_only = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if (whole.is_empty() && fraction.is_empty()) || !digits_only(whole) || !digits_only(fraction)
        {
            return Err(invalid());
        }
        if fraction.len() > 2 {
            return Err(BudgetError::InvalidAmount(format!(
                "'{}' has more than two decimal places",
                s
            )));
        }

        let major: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid())?
        };
        let minor: i64 = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<i64>().map_err(|_| invalid())? * 10,
            _ => fraction.parse().map_err(|_| invalid())?,
        };

        let amount = Self::from_major_minor(major, minor, currency)?;
        Ok(if negative {
            Money::new(-amount.minor_units, currency)
        } else {
            amount
        })
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.is_negative() { "-" } else { "" };
        let units = self.minor_units.unsigned_abs();
        write!(
            f,
            "{}{}.{:02} {}",
            sign,
            units / 100,
            units % 100,
            self.currency
        )
    }
}
