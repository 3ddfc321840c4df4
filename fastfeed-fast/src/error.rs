/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! FAST protocol error types.

use thiserror::Error;

/// Errors that can occur during FAST encoding/decoding.
///
/// Every variant is scoped to a single payload; the caller discards the
/// payload and keeps decoding the stream.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FastError {
    /// Buffer ended before a stop bit.
    #[error("truncated input")]
    TruncatedInput,

    /// Integer does not fit the target type.
    #[error("integer overflow")]
    IntegerOverflow,

    /// Invalid string encoding.
    #[error("invalid string encoding")]
    InvalidString,

    /// Copy or Tail field absent with no previous value.
    #[error("field {field_id} has no initial value")]
    MissingInitialValue {
        /// Field id.
        field_id: u32,
    },

    /// Delta field absent from the presence map.
    #[error("delta field {field_id} absent from presence map")]
    InvalidDeltaAbsence {
        /// Field id.
        field_id: u32,
    },

    /// Operator cannot be applied to the field.
    #[error("invalid operator on field {field_id}: {reason}")]
    InvalidOperator {
        /// Field id.
        field_id: u32,
        /// Reason.
        reason: String,
    },

    /// Constant value does not parse as the field's wire type.
    #[error("invalid constant for field {field_id}: {value}")]
    InvalidConstant {
        /// Field id.
        field_id: u32,
        /// Configured constant.
        value: String,
    },

    /// Decoded value cannot be mapped onto the event attribute.
    #[error("invalid value for field {field_id}: {reason}")]
    InvalidFieldValue {
        /// Field id.
        field_id: u32,
        /// Reason.
        reason: String,
    },

    /// Fallback scan pattern failed to compile.
    #[error("invalid scan pattern: {0}")]
    InvalidPattern(String),
}

impl From<regex::Error> for FastError {
    fn from(err: regex::Error) -> Self {
        Self::InvalidPattern(err.to_string())
    }
}
