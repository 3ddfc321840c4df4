/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Core types for the feed.
//!
//! - [`Symbol`]: Fixed-capacity instrument identifier
//! - [`parse_sending_time`] / [`format_sending_time`]: The feed's timestamp format

use arrayvec::ArrayString;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maximum length for instrument symbols in bytes.
pub const SYMBOL_MAX_LEN: usize = 32;

/// Length of the `YYYYMMDD-HH:MM:SS` prefix of a sending time.
const SENDING_TIME_LEN: usize = 17;

/// Instrument symbol (tag 55), e.g. `FNBB-EQ`.
///
/// Stored inline so it can be copied cheaply and used as a map key on the
/// per-instrument sequence path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
#[serde(transparent)]
pub struct Symbol(ArrayString<SYMBOL_MAX_LEN>);

impl Symbol {
    /// Creates a symbol from a string slice.
    ///
    /// # Returns
    /// `None` if the string is empty or longer than [`SYMBOL_MAX_LEN`].
    #[must_use]
    pub fn new(s: &str) -> Option<Self> {
        if s.is_empty() {
            return None;
        }
        ArrayString::from(s).ok().map(Self)
    }

    /// Returns the symbol as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Symbol {
    type Err = arrayvec::CapacityError<()>;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or_else(|| arrayvec::CapacityError::new(()))
    }
}

/// Parses a sending time in the feed's `YYYYMMDD-HH:MM:SS` format.
///
/// Any fractional-second suffix is ignored. The value is interpreted as UTC.
///
/// # Returns
/// `None` if the input does not start with a valid timestamp.
#[must_use]
pub fn parse_sending_time(s: &str) -> Option<DateTime<Utc>> {
    let prefix = s.get(..SENDING_TIME_LEN)?;
    NaiveDateTime::parse_from_str(prefix, "%Y%m%d-%H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Formats a timestamp as `YYYYMMDD-HH:MM:SS.sss` for outgoing messages.
#[must_use]
pub fn format_sending_time(time: DateTime<Utc>) -> String {
    time.format("%Y%m%d-%H:%M:%S%.3f").to_string()
}
