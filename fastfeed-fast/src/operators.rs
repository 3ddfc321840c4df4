/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! FAST field operators.
//!
//! Operators define how field values are resolved relative to previous
//! values held in the [`FieldDictionary`].

use crate::error::FastError;
use fastfeed_dictionary::WireType;
use std::collections::HashMap;
use std::fmt;

/// A resolved field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// ASCII string.
    Ascii(String),
    /// Unsigned integer.
    UInt(u64),
    /// Signed integer.
    Int(i64),
    /// Decimal mantissa; the exponent comes from the catalog.
    Decimal(i64),
}

impl FieldValue {
    /// Parses a configured constant as the given wire type.
    ///
    /// # Errors
    /// Returns `FastError::InvalidConstant` if the text does not parse.
    pub fn parse_constant(
        field_id: u32,
        wire_type: WireType,
        text: &str,
    ) -> Result<Self, FastError> {
        let invalid = || FastError::InvalidConstant {
            field_id,
            value: text.to_string(),
        };
        Ok(match wire_type {
            WireType::Ascii => Self::Ascii(text.to_string()),
            WireType::UnsignedInt => Self::UInt(text.parse().map_err(|_| invalid())?),
            WireType::SignedInt => Self::Int(text.parse().map_err(|_| invalid())?),
            WireType::Decimal => Self::Decimal(text.parse().map_err(|_| invalid())?),
        })
    }

    /// Returns the value as a string slice, if it is ASCII.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Ascii(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the value as an i64, converting numeric variants.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(v) | Self::Decimal(v) => Some(*v),
            Self::UInt(v) => i64::try_from(*v).ok(),
            Self::Ascii(s) => s.trim().parse().ok(),
        }
    }

    /// Returns the value as a u64, converting numeric variants.
    #[must_use]
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::UInt(v) => Some(*v),
            Self::Int(v) | Self::Decimal(v) => u64::try_from(*v).ok(),
            Self::Ascii(s) => s.trim().parse().ok(),
        }
    }

    fn as_i128(&self) -> Option<i128> {
        match self {
            Self::UInt(v) => Some(i128::from(*v)),
            Self::Int(v) | Self::Decimal(v) => Some(i128::from(*v)),
            Self::Ascii(_) => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ascii(s) => f.write_str(s),
            Self::UInt(v) => write!(f, "{v}"),
            Self::Int(v) | Self::Decimal(v) => write!(f, "{v}"),
        }
    }
}

/// Previous values for carry-forward fields, keyed by field id.
///
/// One dictionary belongs to one channel. Channels never share a
/// dictionary since carry-forward state is per transport.
#[derive(Debug, Clone, Default)]
pub struct FieldDictionary {
    values: HashMap<u32, FieldValue>,
}

impl FieldDictionary {
    /// Creates an empty dictionary.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets the previous value for a field.
    #[must_use]
    pub fn get(&self, field_id: u32) -> Option<&FieldValue> {
        self.values.get(&field_id)
    }

    /// Stores the value for a field.
    pub fn set(&mut self, field_id: u32, value: FieldValue) {
        self.values.insert(field_id, value);
    }

    /// Clears all state, as on a channel reset.
    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Returns the number of stored fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Applies a transmitted Tail value to the previous value.
///
/// For strings the transmitted value replaces the suffix of equal length.
/// Other types replace the whole value.
#[must_use]
pub fn apply_tail(previous: Option<&FieldValue>, tail: FieldValue) -> FieldValue {
    match (previous, tail) {
        (Some(FieldValue::Ascii(prev)), FieldValue::Ascii(suffix)) if prev.len() > suffix.len() => {
            match prev.get(..prev.len() - suffix.len()) {
                Some(head) => FieldValue::Ascii(format!("{head}{suffix}")),
                None => FieldValue::Ascii(suffix),
            }
        }
        (_, tail) => tail,
    }
}

/// Applies a signed delta to the previous value.
///
/// A missing previous value seeds from zero. The result keeps the field's
/// wire type.
///
/// # Errors
/// Returns `FastError::InvalidOperator` for ASCII fields and
/// `FastError::IntegerOverflow` if the result leaves the type's range.
pub fn apply_delta(
    field_id: u32,
    wire_type: WireType,
    previous: Option<&FieldValue>,
    delta: i64,
) -> Result<FieldValue, FastError> {
    if wire_type == WireType::Ascii {
        return Err(FastError::InvalidOperator {
            field_id,
            reason: "delta on ascii field".to_string(),
        });
    }
    let base = match previous {
        None => 0,
        Some(value) => value.as_i128().ok_or_else(|| FastError::InvalidOperator {
            field_id,
            reason: "previous value is not numeric".to_string(),
        })?,
    };
    let sum = base + i128::from(delta);

    match wire_type {
        WireType::UnsignedInt => u64::try_from(sum)
            .map(FieldValue::UInt)
            .map_err(|_| FastError::IntegerOverflow),
        WireType::SignedInt => i64::try_from(sum)
            .map(FieldValue::Int)
            .map_err(|_| FastError::IntegerOverflow),
        WireType::Decimal | WireType::Ascii => i64::try_from(sum)
            .map(FieldValue::Decimal)
            .map_err(|_| FastError::IntegerOverflow),
    }
}
