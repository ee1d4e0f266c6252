//! Schedule codec: active periods as `HHMM-HHMM` tokens.
//!
//! An empty period list means automatic triggering is always allowed.
//! `0000-0000` marks a row that exists in the form but was never filled in;
//! it is neither written nor read back. Ordering and overlap are left to the
//! timer engine.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Step between selectable minutes in the schedule form.
pub const MINUTE_STEP: u8 = 5;

const PERIOD_SEPARATOR: char = ',';
const RANGE_SEPARATOR: u8 = b'-';
const TOKEN_LEN: usize = 9;

/// Time of day with minute resolution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ClockTime {
    hour: u8,
    minute: u8,
}

impl ClockTime {
    /// Midnight.
    pub const MIDNIGHT: Self = Self { hour: 0, minute: 0 };

    /// Build a time of day.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidClockTime`] when `hour > 23` or
    /// `minute > 59`.
    pub fn new(hour: u8, minute: u8) -> Result<Self, ValidationError> {
        if hour > 23 || minute > 59 {
            return Err(ValidationError::InvalidClockTime { hour, minute });
        }
        Ok(Self { hour, minute })
    }

    #[must_use]
    pub const fn hour(self) -> u8 {
        self.hour
    }

    #[must_use]
    pub const fn minute(self) -> u8 {
        self.minute
    }

    /// Whether the minute is one the form offers.
    #[must_use]
    pub const fn is_on_grid(self) -> bool {
        self.minute % MINUTE_STEP == 0
    }

    fn parse_digits(digits: &[u8]) -> Option<Self> {
        let &[h1, h0, m1, m0] = digits else {
            return None;
        };
        let value = |hi: u8, lo: u8| (hi - b'0') * 10 + (lo - b'0');
        Self::new(value(h1, h0), value(m1, m0)).ok()
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}{:02}", self.hour, self.minute)
    }
}

/// Hours offered by the schedule form, `0..=23`.
pub fn hour_options() -> impl Iterator<Item = u8> {
    0..24
}

/// Minutes offered by the schedule form, `0, 5, …, 55`.
pub fn minute_options() -> impl Iterator<Item = u8> {
    (0..60).step_by(usize::from(MINUTE_STEP))
}

/// A window of the day during which automatic triggering is permitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SchedulePeriod {
    pub from: ClockTime,
    pub to: ClockTime,
}

impl SchedulePeriod {
    /// Build a period from hour/minute pairs.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidClockTime`] if either end is not a
    /// valid time of day.
    pub fn new(
        from_hour: u8,
        from_minute: u8,
        to_hour: u8,
        to_minute: u8,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            from: ClockTime::new(from_hour, from_minute)?,
            to: ClockTime::new(to_hour, to_minute)?,
        })
    }

    /// `00:00–00:00`, the placeholder for an unfilled form row.
    #[must_use]
    pub fn is_unset(&self) -> bool {
        self.from == ClockTime::MIDNIGHT && self.to == ClockTime::MIDNIGHT
    }
}

impl fmt::Display for SchedulePeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.from, self.to)
    }
}

impl FromStr for SchedulePeriod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidPeriod(s.to_string());
        let bytes = s.as_bytes();
        if bytes.len() != TOKEN_LEN || bytes[4] != RANGE_SEPARATOR {
            return Err(invalid());
        }
        let (from, to) = (&bytes[..4], &bytes[5..]);
        if !from.iter().chain(to).all(u8::is_ascii_digit) {
            return Err(invalid());
        }
        Ok(Self {
            from: ClockTime::parse_digits(from).ok_or_else(invalid)?,
            to: ClockTime::parse_digits(to).ok_or_else(invalid)?,
        })
    }
}

/// Encode periods, leaving out unset (`0000-0000`) rows.
#[must_use]
pub fn encode(periods: &[SchedulePeriod]) -> String {
    periods
        .iter()
        .filter(|period| !period.is_unset())
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(&PERIOD_SEPARATOR.to_string())
}

/// Decode periods. Tokens that are not `DDDD-DDDD` with a valid time on each
/// side are dropped, as is the unset sentinel.
#[must_use]
pub fn decode(s: &str) -> Vec<SchedulePeriod> {
    if s.is_empty() {
        return Vec::new();
    }
    s.split(PERIOD_SEPARATOR)
        .filter_map(|token| token.trim().parse::<SchedulePeriod>().ok())
        .filter(|period| !period.is_unset())
        .collect()
}
