//! Monetary amounts.
//!
//! Costs are held as whole cents so that budget comparisons are exact:
//! `30.00 + 25.00 > 50.00` must never be decided by floating point error.

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Currency marker written in front of amounts embedded in free text.
pub const CURRENCY_MARKER: &str = "S/";

/// Error returned when parsing an invalid amount.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid amount: {reason}")]
pub struct InvalidMoney {
    reason: &'static str,
}

impl InvalidMoney {
    fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

/// A non-negative amount of money with two decimal places.
///
/// # Examples
///
/// ```
/// use tour_planner::domain::Money;
///
/// let fee = Money::parse("30.5").unwrap();
/// assert_eq!(fee.to_string(), "30.50");
/// assert_eq!(fee.annotation(), "S/ 30.50");
///
/// assert!(Money::parse("-1").is_err());
/// assert!(Money::parse("1.234").is_err());
/// ```
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money {
    cents: u64,
}

impl Money {
    /// Zero.
    pub const ZERO: Money = Money { cents: 0 };

    /// Create an amount from a number of cents.
    pub const fn from_cents(cents: u64) -> Self {
        Self { cents }
    }

    /// Create an amount from whole currency units.
    pub const fn from_units(units: u64) -> Self {
        Self { cents: units * 100 }
    }

    /// Returns the amount in cents.
    pub fn cents(&self) -> u64 {
        self.cents
    }

    /// Returns the amount as a float, for scoring ratios only.
    pub fn as_f64(&self) -> f64 {
        self.cents as f64 / 100.0
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.cents == 0
    }

    /// Add, returning `None` on overflow.
    pub fn checked_add(self, other: Money) -> Option<Money> {
        self.cents.checked_add(other.cents).map(Money::from_cents)
    }

    /// Subtract, returning `None` if the result would be negative.
    pub fn checked_sub(self, other: Money) -> Option<Money> {
        self.cents.checked_sub(other.cents).map(Money::from_cents)
    }

    /// Subtract, clamping at zero.
    pub fn saturating_sub(self, other: Money) -> Money {
        Money::from_cents(self.cents.saturating_sub(other.cents))
    }

    /// Parse a plain decimal amount such as `"30"`, `"30.5"` or `"30.50"`.
    ///
    /// At most two decimal places are accepted. Signs, exponents and
    /// thousands separators are rejected.
    pub fn parse(s: &str) -> Result<Self, InvalidMoney> {
        let s = s.trim();
        let (whole, fraction) = match s.split_once('.') {
            Some((whole, fraction)) => (whole, Some(fraction)),
            None => (s, None),
        };

        if whole.is_empty() {
            return Err(InvalidMoney::new("missing whole part"));
        }
        if !whole.bytes().all(|b| b.is_ascii_digit()) {
            return Err(InvalidMoney::new("whole part must be digits"));
        }

        let units: u64 = whole
            .parse()
            .map_err(|_| InvalidMoney::new("amount too large"))?;

        let cents = match fraction {
            None => 0,
            Some(f) if f.is_empty() || f.len() > 2 => {
                return Err(InvalidMoney::new("expected one or two decimal places"));
            }
            Some(f) if !f.bytes().all(|b| b.is_ascii_digit()) => {
                return Err(InvalidMoney::new("decimal part must be digits"));
            }
            Some(f) => {
                let value: u64 = f
                    .parse()
                    .map_err(|_| InvalidMoney::new("decimal part must be digits"))?;
                if f.len() == 1 { value * 10 } else { value }
            }
        };

        units
            .checked_mul(100)
            .and_then(|c| c.checked_add(cents))
            .map(Money::from_cents)
            .ok_or_else(|| InvalidMoney::new("amount too large"))
    }

    /// Render the amount with its currency marker, e.g. `"S/ 30.00"`.
    pub fn annotation(&self) -> String {
        format!("{CURRENCY_MARKER} {self}")
    }

    /// Find the first well-formed `S/` amount in a piece of free text.
    ///
    /// Whitespace between the marker and the number is optional. Markers
    /// followed by something that is not an amount are skipped. Never fails:
    /// text without a usable annotation yields `None`.
    ///
    /// ```
    /// use tour_planner::domain::Money;
    ///
    /// let notes = "Activity: Guided tour (S/ 20.00)";
    /// assert_eq!(Money::find_annotation(notes), Some(Money::from_units(20)));
    /// assert_eq!(Money::find_annotation("free entry"), None);
    /// assert_eq!(Money::find_annotation("S/ abc"), None);
    /// ```
    pub fn find_annotation(text: &str) -> Option<Money> {
        let mut rest = text;
        while let Some(pos) = rest.find(CURRENCY_MARKER) {
            let after = &rest[pos + CURRENCY_MARKER.len()..];
            let number = after.trim_start();
            if let Some(amount) = leading_amount(number) {
                return Some(amount);
            }
            rest = after;
        }
        None
    }
}

/// Parse the amount at the start of `s`, ignoring anything after it.
fn leading_amount(s: &str) -> Option<Money> {
    let bytes = s.as_bytes();
    let whole_len = bytes.iter().take_while(|b| b.is_ascii_digit()).count();
    if whole_len == 0 {
        return None;
    }

    let mut end = whole_len;
    if bytes.get(whole_len) == Some(&b'.') {
        let fraction_len = bytes[whole_len + 1..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count();
        // A trailing full stop ends a sentence, it is not a decimal point.
        if fraction_len > 0 {
            end = whole_len + 1 + fraction_len;
        }
    }

    Money::parse(&s[..end]).ok()
}

/// Addition saturates at the largest representable amount.
impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money::from_cents(self.cents.saturating_add(rhs.cents))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        *self = *self + rhs;
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Money {
        iter.copied().sum()
    }
}

impl fmt::Debug for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Money({self})")
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.cents / 100, self.cents % 100)
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Catalog exports write amounts either as strings or as bare numbers.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawMoney {
    Text(String),
    Number(f64),
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match RawMoney::deserialize(deserializer)? {
            RawMoney::Text(s) => Money::parse(&s).map_err(serde::de::Error::custom),
            RawMoney::Number(n) if n.is_finite() && n >= 0.0 => {
                let cents = (n * 100.0).round();
                // 2^64: the first float past u64::MAX
                if cents >= 18_446_744_073_709_551_616.0 {
                    return Err(serde::de::Error::custom("invalid amount: amount too large"));
                }
                Ok(Money::from_cents(cents as u64))
            }
            RawMoney::Number(_) => Err(serde::de::Error::custom(
                "invalid amount: must be a non-negative number",
            )),
        }
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Annotations written by the planner are always read back exactly.
        #[test]
        fn annotation_roundtrip(cents in 0u64..10_000_000, prefix in "[a-zA-Z ]{0,20}") {
            let amount = Money::from_cents(cents);
            let notes = format!("{prefix}({})", amount.annotation());
            prop_assert_eq!(Money::find_annotation(&notes), Some(amount));
        }

        #[test]
        fn display_parse_roundtrip(cents in 0u64..10_000_000_000) {
            let amount = Money::from_cents(cents);
            prop_assert_eq!(Money::parse(&amount.to_string()).unwrap(), amount);
        }

        /// Arbitrary text never panics the annotation scanner.
        #[test]
        fn find_annotation_total(text in ".{0,64}") {
            let _ = Money::find_annotation(&text);
        }
    }
}
