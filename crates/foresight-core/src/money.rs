//! Money and calendar-month helpers
//!
//! `Money` stores amounts in minor units (hundredths) as `i64` so that no
//! currency arithmetic ever goes through floating point. Floats only show up
//! in derived ratios and percentages. Arithmetic saturates at the `i64`
//! bounds instead of panicking; amounts coming from users are checked
//! against `Money::MAX_INPUT` first.
//!
//! `YearMonth` is the `YYYY-MM` key used by monthly aggregates, forecast
//! targets and simulation timelines.

use std::fmt;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};
use std::str::FromStr;

use chrono::{DateTime, Datelike, Months, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, Result};

/// Symbol used by `Money`'s `Display` impl
pub const DEFAULT_CURRENCY_SYMBOL: &str = "$";

/// A monetary amount in minor currency units (e.g. cents)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Largest magnitude accepted from users: 10 trillion major units.
    /// Sums of a few of these over a simulation horizon stay far from
    /// `i64::MAX`.
    pub const MAX_INPUT: Money = Money(1_000_000_000_000_000);

    pub const fn from_minor(minor: i64) -> Self {
        Self(minor)
    }

    /// Whole major units (e.g. dollars) to minor units
    pub const fn from_major(major: i64) -> Self {
        Self(major.saturating_mul(100))
    }

    pub const fn zero() -> Self {
        Self(0)
    }

    pub const fn minor(&self) -> i64 {
        self.0
    }

    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    pub const fn abs(&self) -> Self {
        Self(self.0.saturating_abs())
    }

    /// Reject amounts whose magnitude exceeds `MAX_INPUT`
    pub fn check_input(self, field: &str) -> Result<Self> {
        if self.0.unsigned_abs() > Self::MAX_INPUT.0.unsigned_abs() {
            return Err(Error::InvalidData(format!(
                "{} is out of range (at most {} in either direction)",
                field,
                Self::MAX_INPUT.format_major()
            )));
        }
        Ok(self)
    }

    /// Amount in major units as a float, for display and ratios only
    pub fn as_major(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Clamp negative amounts to zero
    pub fn non_negative(self) -> Self {
        Self(self.0.max(0))
    }

    /// Number of whole `divisor` installments needed to cover this amount.
    ///
    /// Returns `None` when the divisor is zero or negative, so callers must
    /// decide explicitly what "never" means for them.
    pub fn ceil_div(&self, divisor: Money) -> Option<i64> {
        if divisor.0 <= 0 {
            return None;
        }
        let q = self.0 / divisor.0;
        if self.0 % divisor.0 > 0 {
            Some(q + 1)
        } else {
            Some(q)
        }
    }

    /// Split this amount into `parts` installments, rounding each one up
    pub fn div_ceil_by(&self, parts: u32) -> Money {
        if parts == 0 {
            return *self;
        }
        let parts = parts as i64;
        let q = self.0 / parts;
        if self.0 % parts > 0 {
            Money(q + 1)
        } else {
            Money(q)
        }
    }

    /// Multiply by a ratio, rounding to the nearest minor unit
    pub fn scale(&self, factor: f64) -> Money {
        Money((self.0 as f64 * factor).round() as i64)
    }

    /// `self / other` as a float. Callers guard against a zero denominator.
    pub fn ratio(&self, other: Money) -> f64 {
        self.0 as f64 / other.0 as f64
    }

    /// Parse an amount given in major units
    ///
    /// Accepts "1500", "1500.5", "1,500.50", "$1500.50", "-12.34", "-$12.34"
    /// and "$-12.34". Digits after the second decimal place are dropped.
    pub fn parse(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidData(format!("Invalid money amount: {}", s));

        let trimmed = s.trim();
        let (negative, rest) = if let Some(rest) = trimmed
            .strip_prefix("-$")
            .or_else(|| trimmed.strip_prefix("$-"))
        {
            (true, rest)
        } else if let Some(rest) = trimmed.strip_prefix('-') {
            (true, rest)
        } else {
            (false, trimmed.strip_prefix('$').unwrap_or(trimmed))
        };

        let digits = rest.replace(',', "");
        let (whole, frac) = match digits.split_once('.') {
            Some(parts) => parts,
            None => (digits.as_str(), ""),
        };
        if whole.is_empty() && frac.is_empty() {
            return Err(invalid());
        }
        if !whole.chars().chain(frac.chars()).all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }

        let whole: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid())?
        };
        let cents: i64 = match frac.len() {
            0 => 0,
            1 => frac.parse::<i64>().map_err(|_| invalid())? * 10,
            _ => frac[..2].parse().map_err(|_| invalid())?,
        };
        let minor = whole
            .checked_mul(100)
            .and_then(|m| m.checked_add(cents))
            .filter(|m| *m <= Self::MAX_INPUT.0)
            .ok_or_else(invalid)?;

        Ok(Self(if negative { -minor } else { minor }))
    }

    /// Format in major units with two decimals, e.g. "1500.00"
    pub fn format_major(&self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        format!("{}{}.{:02}", sign, (self.0 / 100).abs(), (self.0 % 100).abs())
    }

    /// Format with a currency symbol, e.g. "-$12.34"
    pub fn format_with_symbol(&self, symbol: &str) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        format!(
            "{}{}{}.{:02}",
            sign,
            symbol,
            (self.0 / 100).abs(),
            (self.0 % 100).abs()
        )
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_with_symbol(DEFAULT_CURRENCY_SYMBOL))
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_sub(other.0);
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self {
        Self(self.0.saturating_neg())
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    fn mul(self, rhs: i64) -> Self {
        Self(self.0.saturating_mul(rhs))
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

/// A calendar month, serialized as "YYYY-MM"
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    /// Create a month; `month` must be 1-12
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(Error::InvalidData(format!("Invalid month: {}", month)));
        }
        Ok(Self { year, month })
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// The current calendar month (UTC)
    pub fn current() -> Self {
        Self::from_date(Utc::now().date_naive())
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// Shift by a signed number of months, rolling the year over as needed
    pub fn add_months(&self, months: i32) -> Self {
        let index = self.year * 12 + (self.month as i32 - 1) + months;
        Self {
            year: index.div_euclid(12),
            month: index.rem_euclid(12) as u32 + 1,
        }
    }

    pub fn next(&self) -> Self {
        self.add_months(1)
    }

    pub fn prev(&self) -> Self {
        self.add_months(-1)
    }

    /// Signed number of months from `earlier` to `self`
    pub fn months_since(&self, earlier: YearMonth) -> i32 {
        (self.year - earlier.year) * 12 + (self.month as i32 - earlier.month as i32)
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).expect("Day 1 always valid")
    }

    pub fn last_day(&self) -> NaiveDate {
        self.next()
            .first_day()
            .pred_opt()
            .expect("First of month always has a predecessor")
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidData(format!("Invalid month (use YYYY-MM): {}", s));
        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(invalid());
        }
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        Self::new(year, month)
    }
}

impl Serialize for YearMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for YearMonth {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Shift a date by a signed number of months, clamping the day to the
/// length of the target month (Jan 31 + 1 month = Feb 28/29)
pub fn add_months(date: NaiveDate, months: i32) -> NaiveDate {
    let shifted = if months >= 0 {
        date.checked_add_months(Months::new(months as u32))
    } else {
        date.checked_sub_months(Months::new(months.unsigned_abs()))
    };
    shifted.unwrap_or(date)
}

/// Whole calendar months from `from` until `to`, counting a partial month
/// as a full one. Never less than 1, so it is always safe to divide by.
pub fn months_until(from: NaiveDate, to: NaiveDate) -> u32 {
    if to <= from {
        return 1;
    }
    let mut months =
        (to.year() - from.year()) * 12 + (to.month() as i32 - from.month() as i32);
    if to.day() > from.day() {
        months += 1;
    }
    months.max(1) as u32
}

/// Month label for a UTC timestamp
pub fn month_of(ts: DateTime<Utc>) -> YearMonth {
    YearMonth::from_date(ts.date_naive())
}
