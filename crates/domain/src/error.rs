//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`DelayLightError`] via `#[from]`.

use crate::device_list::ListKind;
use crate::state::StateKey;

/// Top-level error shared by the domain, application and adapter layers.
#[derive(Debug, thiserror::Error)]
pub enum DelayLightError {
    /// A value failed a domain invariant.
    #[error("validation error")]
    Validation(#[from] ValidationError),

    /// A referenced record does not exist.
    #[error("not found")]
    NotFound(#[from] NotFoundError),

    /// The persistence or host layer failed.
    #[error("storage error")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Reasons a user-supplied value is rejected before it is encoded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// A delay field did not parse as a non-negative integer.
    #[error("{field} must be a non-negative integer, got {input:?}")]
    InvalidDelay { field: &'static str, input: String },

    /// A dimming level was not an integer in `0..=100`.
    #[error("dimming level must be an integer between 0 and 100, got {0:?}")]
    LevelOutOfRange(String),

    /// A hold-over mode other than 0, 1 or 2.
    #[error("hold-over mode must be 0, 1 or 2, got {0:?}")]
    InvalidHoldOverMode(String),

    /// A house mode outside `1..=4`.
    #[error("house mode must be between 1 and 4, got {0:?}")]
    InvalidHouseMode(String),

    /// A clock time outside `00:00..=23:59`.
    #[error("invalid time of day {hour:02}:{minute:02}")]
    InvalidClockTime { hour: u8, minute: u8 },

    /// A schedule token that does not look like `HHMM-HHMM`.
    #[error("invalid schedule period {0:?}")]
    InvalidPeriod(String),

    /// A device row with nothing selected.
    #[error("device id must not be empty")]
    EmptyDeviceId,

    /// A device id containing a list delimiter or a leading invert marker.
    #[error("device id {0:?} contains a reserved character")]
    ReservedCharacter(String),

    /// A scene reference in a list that only accepts devices.
    #[error("scenes are not allowed in the {0} list")]
    SceneNotAllowed(ListKind),

    /// The invert flag on a list that has no trigger semantics.
    #[error("invert is not allowed in the {0} list")]
    InvertNotAllowed(ListKind),

    /// A field the configured plugin variant does not use.
    #[error("{0} is not used by this plugin variant")]
    UnsupportedField(StateKey),

    /// A dimming level on a list or entry that cannot carry one.
    #[error("a dimming level is not allowed on {id:?} in the {kind} list")]
    LevelNotAllowed { kind: ListKind, id: String },
}

/// A lookup by id found nothing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    /// Kind of record looked up, e.g. `"Device"`.
    pub entity: &'static str,
    /// The id that was requested.
    pub id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_display_invalid_delay_with_field_name() {
        let err = ValidationError::InvalidDelay {
            field: "AutoDelay",
            input: "abc".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "AutoDelay must be a non-negative integer, got \"abc\""
        );
    }

    #[test]
    fn should_display_clock_time_zero_padded() {
        let err = ValidationError::InvalidClockTime { hour: 7, minute: 5 };
        assert_eq!(err.to_string(), "invalid time of day 07:05");
    }

    #[test]
    fn should_display_not_found_error() {
        let err = NotFoundError {
            entity: "Device",
            id: "42".to_string(),
        };
        assert_eq!(err.to_string(), "Device 42 not found");
    }

    #[test]
    fn should_wrap_validation_error_via_from() {
        let err: DelayLightError = ValidationError::EmptyDeviceId.into();
        assert!(matches!(
            err,
            DelayLightError::Validation(ValidationError::EmptyDeviceId)
        ));
    }

    #[test]
    fn should_name_list_kind_in_scene_error() {
        let err = ValidationError::SceneNotAllowed(ListKind::Trigger);
        assert_eq!(err.to_string(), "scenes are not allowed in the trigger list");
    }
}
