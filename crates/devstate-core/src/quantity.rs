//! # Resource Quantities
//!
//! Parses Kubernetes-style quantity strings (`"512Mi"`, `"1Gi"`, `"250m"`,
//! `"0.5"`, `"1e3"`) into an exact amount expressed in milli-units so that
//! requests and limits can be compared numerically regardless of the unit
//! each side was written in.
//!
//! ## Grammar
//!
//! ```text
//! quantity := number suffix?
//! number   := digits ( "." digits? )? | "." digits
//! suffix   := "m" | "k" | "M" | "G" | "T" | "P" | "E"
//!           | "Ki" | "Mi" | "Gi" | "Ti" | "Pi" | "Ei"
//!           | ("e" | "E") digits
//! ```
//!
//! Fractions finer than one milli-unit are rounded up. The original text is
//! kept verbatim: equality and ordering use the amount, display uses the text.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::QuantityError;

/// A parsed resource quantity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Quantity {
    text: String,
    millis: u128,
}

impl Quantity {
    /// Parse a quantity string.
    ///
    /// # Errors
    ///
    /// Returns a [`QuantityError`] for empty or negative input, a malformed
    /// number, an unknown suffix, or an amount too large to represent.
    pub fn parse(text: &str) -> Result<Self, QuantityError> {
        if text.is_empty() {
            return Err(QuantityError::Empty);
        }
        if text.starts_with('-') {
            return Err(QuantityError::Negative(text.to_string()));
        }

        let split = text
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(text.len());
        let (number, suffix) = text.split_at(split);

        let (int_part, frac_part) = number.split_once('.').unwrap_or((number, ""));
        if (int_part.is_empty() && frac_part.is_empty()) || frac_part.contains('.') {
            return Err(QuantityError::InvalidNumber(text.to_string()));
        }

        let overflow = || QuantityError::Overflow(text.to_string());

        let multiplier = suffix_multiplier(text, suffix)?;
        let mut mantissa: u128 = 0;
        for digit in int_part.bytes().chain(frac_part.bytes()) {
            mantissa = mantissa
                .checked_mul(10)
                .and_then(|m| m.checked_add(u128::from(digit - b'0')))
                .ok_or_else(overflow)?;
        }
        let scale = u32::try_from(frac_part.len())
            .ok()
            .and_then(|len| 10u128.checked_pow(len))
            .ok_or_else(overflow)?;
        let numerator = mantissa.checked_mul(multiplier).ok_or_else(overflow)?;

        Ok(Self {
            text: text.to_string(),
            millis: numerator.div_ceil(scale),
        })
    }

    /// Parse an optional quantity: the empty string means "unset".
    pub fn parse_optional(text: &str) -> Result<Option<Self>, QuantityError> {
        if text.is_empty() {
            Ok(None)
        } else {
            Self::parse(text).map(Some)
        }
    }

    /// The original quantity text.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// The amount in milli-units (`"1"` is 1000, `"250m"` is 250).
    pub fn millis(&self) -> u128 {
        self.millis
    }
}

/// Milli-units per one unit of the given suffix.
fn suffix_multiplier(text: &str, suffix: &str) -> Result<u128, QuantityError> {
    const KIB: u128 = 1024;
    let binary = |power: u32| KIB.pow(power) * 1000;
    let decimal = |exp: u32| 10u128.pow(exp + 3);

    let multiplier = match suffix {
        "" => decimal(0),
        "m" => 1,
        "k" => decimal(3),
        "M" => decimal(6),
        "G" => decimal(9),
        "T" => decimal(12),
        "P" => decimal(15),
        "E" => decimal(18),
        "Ki" => binary(1),
        "Mi" => binary(2),
        "Gi" => binary(3),
        "Ti" => binary(4),
        "Pi" => binary(5),
        "Ei" => binary(6),
        other => {
            let exponent = other
                .strip_prefix('e')
                .or_else(|| other.strip_prefix('E'))
                .filter(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
                .ok_or_else(|| QuantityError::UnknownSuffix {
                    text: text.to_string(),
                    suffix: other.to_string(),
                })?;
            return exponent
                .parse::<u32>()
                .ok()
                .and_then(|exp| exp.checked_add(3))
                .and_then(|exp| 10u128.checked_pow(exp))
                .ok_or_else(|| QuantityError::Overflow(text.to_string()));
        }
    };
    Ok(multiplier)
}

impl PartialEq for Quantity {
    fn eq(&self, other: &Self) -> bool {
        self.millis == other.millis
    }
}

impl Eq for Quantity {}

impl Hash for Quantity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.millis.hash(state);
    }
}

impl PartialOrd for Quantity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Quantity {
    fn cmp(&self, other: &Self) -> Ordering {
        self.millis.cmp(&other.millis)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl FromStr for Quantity {
    type Err = QuantityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Quantity {
    type Error = QuantityError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Quantity> for String {
    fn from(value: Quantity) -> Self {
        value.text
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    const BINARY: &[(&str, u32)] = &[("Ki", 1), ("Mi", 2), ("Gi", 3), ("Ti", 4)];

    proptest! {
        /// Whole binary quantities convert exactly.
        #[test]
        fn binary_amounts_are_exact(n in 0u64..1_000_000, idx in 0usize..4) {
            let (suffix, power) = BINARY[idx];
            let parsed = Quantity::parse(&format!("{n}{suffix}")).unwrap();
            prop_assert_eq!(parsed.millis(), u128::from(n) * 1024u128.pow(power) * 1000);
        }

        /// Ordering of parsed quantities matches ordering of the amounts.
        #[test]
        fn ordering_follows_amount(a in 0u64..10_000, b in 0u64..10_000) {
            let qa = Quantity::parse(&format!("{a}Mi")).unwrap();
            let qb = Quantity::parse(&format!("{b}Mi")).unwrap();
            prop_assert_eq!(qa.cmp(&qb), a.cmp(&b));
        }

        /// The same amount written in milli-units and whole units is equal.
        #[test]
        fn milli_and_whole_agree(n in 0u64..1_000_000) {
            let whole = Quantity::parse(&n.to_string()).unwrap();
            let milli = Quantity::parse(&format!("{}m", u128::from(n) * 1000)).unwrap();
            prop_assert_eq!(whole, milli);
        }

        /// Parsing never panics on arbitrary short input.
        #[test]
        fn parse_never_panics(s in "[0-9.a-zA-Z-]{0,12}") {
            let _ = Quantity::parse(&s);
        }
    }
}
