//! Names of the persisted state variables.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A configuration state variable on the plugin device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StateKey {
    Triggers,
    InhibitDevices,
    OnList,
    OffList,
    ActivePeriods,
    AutoDelay,
    ManualDelay,
    OnDelay,
    HoldOn,
    HouseModes,
    TriggerQuieting,
    SceneData,
}

impl StateKey {
    pub const ALL: [Self; 12] = [
        Self::Triggers,
        Self::InhibitDevices,
        Self::OnList,
        Self::OffList,
        Self::ActivePeriods,
        Self::AutoDelay,
        Self::ManualDelay,
        Self::OnDelay,
        Self::HoldOn,
        Self::HouseModes,
        Self::TriggerQuieting,
        Self::SceneData,
    ];

    /// Variable name as stored by the host.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Triggers => "Triggers",
            Self::InhibitDevices => "InhibitDevices",
            Self::OnList => "OnList",
            Self::OffList => "OffList",
            Self::ActivePeriods => "ActivePeriods",
            Self::AutoDelay => "AutoDelay",
            Self::ManualDelay => "ManualDelay",
            Self::OnDelay => "OnDelay",
            Self::HoldOn => "HoldOn",
            Self::HouseModes => "HouseModes",
            Self::TriggerQuieting => "TriggerQuieting",
            Self::SceneData => "SceneData",
        }
    }
}

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned for a variable name this panel does not manage.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown state variable {0:?}")]
pub struct UnknownStateKey(pub String);

impl FromStr for StateKey {
    type Err = UnknownStateKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| UnknownStateKey(s.to_string()))
    }
}
