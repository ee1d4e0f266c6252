//! Field-level validation applied to raw form input before encoding.
//!
//! None of these functions touch persisted state. Callers decide what a
//! rejection means: keep the previous value, flag the field, or fall back.

use crate::error::ValidationError;

/// Highest dimming level a device list entry can carry.
pub const MAX_LEVEL: u8 = 100;

/// Parse a delay field (seconds).
///
/// Surrounding whitespace is ignored. Anything other than a run of ASCII
/// digits that fits in a `u32` is rejected.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidDelay`] naming `field` when the input
/// is blank, signed, fractional or otherwise non-numeric.
pub fn parse_delay(field: &'static str, input: &str) -> Result<u32, ValidationError> {
    let trimmed = input.trim();
    let invalid = || ValidationError::InvalidDelay {
        field,
        input: input.to_string(),
    };
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    trimmed.parse().map_err(|_| invalid())
}

/// Parse a dimming level.
///
/// A blank input means "no explicit level" and yields `Ok(None)`.
///
/// # Errors
///
/// Returns [`ValidationError::LevelOutOfRange`] when the input is not a run
/// of ASCII digits in `0..=100`.
pub fn parse_level(input: &str) -> Result<Option<u8>, ValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let out_of_range = || ValidationError::LevelOutOfRange(input.to_string());
    if !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(out_of_range());
    }
    match trimmed.parse::<u8>() {
        Ok(level) if level <= MAX_LEVEL => Ok(Some(level)),
        _ => Err(out_of_range()),
    }
}

/// Result of [`parse_quieting`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quieting {
    /// Seconds to persist.
    pub seconds: u32,
    /// `true` when the input was unusable and the field was reset to zero.
    pub reset: bool,
}

/// Parse the trigger quieting period.
///
/// Unlike the other delays, an invalid value is not rejected. The field
/// snaps back to zero and zero is what gets persisted.
#[must_use]
pub fn parse_quieting(input: &str) -> Quieting {
    match parse_delay("TriggerQuieting", input) {
        Ok(seconds) => Quieting {
            seconds,
            reset: false,
        },
        Err(_) => Quieting {
            seconds: 0,
            reset: true,
        },
    }
}
