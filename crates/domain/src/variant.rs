//! Plugin variant: the full timer panel or the classic DelayLight panel.
//!
//! Both variants persist the same field formats. The variant picks the
//! service id and a handful of behaviours that differ between the two.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::device_list::ListKind;

/// Which DelayLight flavour a panel is configuring.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PluginVariant {
    /// `DelayLightTimer`: inhibitors, active periods and quieting.
    #[default]
    Timer,
    /// The base `DelayLight` plugin.
    Classic,
}

impl PluginVariant {
    /// Service id under which configuration state variables live.
    #[must_use]
    pub const fn service_id(self) -> &'static str {
        match self {
            Self::Timer => "urn:toggledbits-com:serviceId:DelayLightTimer",
            Self::Classic => "urn:toggledbits-com:serviceId:DelayLight",
        }
    }

    /// Host device type of plugin instances.
    #[must_use]
    pub const fn device_type(self) -> &'static str {
        match self {
            Self::Timer => "urn:schemas-toggledbits-com:device:DelayLightTimer:1",
            Self::Classic => "urn:schemas-toggledbits-com:device:DelayLight:1",
        }
    }

    /// Level the classic panel treats as implicit for a list kind.
    ///
    /// Entries at this level are written without `=level`. The timer
    /// variant always keeps explicit levels.
    #[must_use]
    pub const fn implicit_level(self, kind: ListKind) -> Option<u8> {
        match (self, kind) {
            (Self::Classic, ListKind::On) => Some(100),
            (Self::Classic, ListKind::Off) => Some(0),
            _ => None,
        }
    }

    /// Whether the panel exposes inhibitors, active periods and quieting.
    #[must_use]
    pub const fn has_timer_options(self) -> bool {
        matches!(self, Self::Timer)
    }

    /// Whether editing delays and modes needs a host reload to take effect.
    #[must_use]
    pub const fn timing_edits_need_reload(self) -> bool {
        matches!(self, Self::Classic)
    }
}

impl fmt::Display for PluginVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timer => f.write_str("timer"),
            Self::Classic => f.write_str("classic"),
        }
    }
}

/// Error returned when a variant name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown plugin variant {0:?} (expected \"timer\" or \"classic\")")]
pub struct UnknownVariant(pub String);

impl FromStr for PluginVariant {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "timer" => Ok(Self::Timer),
            "classic" => Ok(Self::Classic),
            other => Err(UnknownVariant(other.to_string())),
        }
    }
}
