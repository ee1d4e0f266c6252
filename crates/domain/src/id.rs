//! Typed identifier newtypes backed by the host's numeric ids.

use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[doc = $doc:expr])* $name:ident) => {
        $(#[doc = $doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u32);

        impl $name {
            /// Wrap a raw host id.
            #[must_use]
            pub const fn new(raw: u32) -> Self {
                Self(raw)
            }

            /// Access the raw host id.
            #[must_use]
            pub const fn get(self) -> u32 {
                self.0
            }
        }

        impl From<u32> for $name {
            fn from(raw: u32) -> Self {
                Self(raw)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.parse().map(Self)
            }
        }
    };
}

define_id!(
    /// Host device number, as used in device lists (`"12"`).
    DeviceNum
);

define_id!(
    /// Host scene number. Referenced from on/off lists as `"S<id>"`.
    SceneId
);

define_id!(
    /// Host room number. Room `0` is the catch-all "No Room".
    RoomId
);

/// Prefix marking a scene reference inside an on/off list.
pub const SCENE_PREFIX: char = 'S';

impl SceneId {
    /// Render as a list reference, e.g. `S42`.
    #[must_use]
    pub fn to_reference(self) -> String {
        format!("{SCENE_PREFIX}{}", self.0)
    }

    /// Parse a list reference such as `S42`. Returns `None` for anything else.
    #[must_use]
    pub fn from_reference(reference: &str) -> Option<Self> {
        reference
            .strip_prefix(SCENE_PREFIX)
            .and_then(|rest| rest.parse().ok())
    }
}

impl RoomId {
    /// The host's "No Room" bucket.
    pub const NONE: Self = Self(0);
}

impl Default for RoomId {
    fn default() -> Self {
        Self::NONE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_roundtrip_through_display_and_from_str() {
        let id = DeviceNum::new(117);
        let parsed: DeviceNum = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn should_serialize_as_bare_number() {
        let json = serde_json::to_string(&RoomId::new(3)).unwrap();
        assert_eq!(json, "3");
    }

    #[test]
    fn should_return_error_when_parsing_non_numeric_id() {
        assert!(DeviceNum::from_str("abc").is_err());
    }

    #[test]
    fn should_render_scene_reference_with_prefix() {
        assert_eq!(SceneId::new(42).to_reference(), "S42");
    }

    #[test]
    fn should_parse_scene_reference_when_prefixed() {
        assert_eq!(SceneId::from_reference("S42"), Some(SceneId::new(42)));
    }

    #[test]
    fn should_reject_scene_reference_without_number() {
        assert_eq!(SceneId::from_reference("S"), None);
        assert_eq!(SceneId::from_reference("42"), None);
        assert_eq!(SceneId::from_reference("S42=10"), None);
    }
}
