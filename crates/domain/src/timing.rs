//! Timing parameters: delays, hold-over mode and house-mode restriction.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::state::StateKey;

/// When the off-delay timer may start and finish relative to sensor reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum HoldOverMode {
    /// (0) Turn off the "off" devices when the timer expires.
    #[default]
    TurnOffAtExpiry,
    /// (1) Wait until the timer expires and every triggered sensor has reset.
    WaitForSensorReset,
    /// (2) Do not start the off-delay timer until triggered sensors reset.
    DeferTimerUntilReset,
}

impl HoldOverMode {
    pub const ALL: [Self; 3] = [
        Self::TurnOffAtExpiry,
        Self::WaitForSensorReset,
        Self::DeferTimerUntilReset,
    ];

    /// Persisted numeric value.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::TurnOffAtExpiry => 0,
            Self::WaitForSensorReset => 1,
            Self::DeferTimerUntilReset => 2,
        }
    }

    /// Human-readable description shown in the mode picker.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::TurnOffAtExpiry => "Turn off \"Off Devices\" upon timer expiration",
            Self::WaitForSensorReset => {
                "Do not turn off until timer expires and all triggered sensors have reset"
            }
            Self::DeferTimerUntilReset => "Do not start off-delay timer until triggered sensors reset",
        }
    }
}

impl TryFrom<u8> for HoldOverMode {
    type Error = ValidationError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.code() == code)
            .ok_or_else(|| ValidationError::InvalidHoldOverMode(code.to_string()))
    }
}

impl From<HoldOverMode> for u8 {
    fn from(mode: HoldOverMode) -> Self {
        mode.code()
    }
}

impl fmt::Display for HoldOverMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for HoldOverMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u8>()
            .map_err(|_| ValidationError::InvalidHoldOverMode(s.to_string()))
            .and_then(Self::try_from)
    }
}

/// Host house mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HouseMode {
    Home,
    Away,
    Night,
    Vacation,
}

impl HouseMode {
    pub const ALL: [Self; 4] = [Self::Home, Self::Away, Self::Night, Self::Vacation];

    /// Host mode number, `1..=4`.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Home => 1,
            Self::Away => 2,
            Self::Night => 3,
            Self::Vacation => 4,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Home => "Home",
            Self::Away => "Away",
            Self::Night => "Night",
            Self::Vacation => "Vacation",
        }
    }
}

impl FromStr for HouseMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code: u8 = s
            .trim()
            .parse()
            .map_err(|_| ValidationError::InvalidHouseMode(s.to_string()))?;
        Self::ALL
            .into_iter()
            .find(|mode| mode.code() == code)
            .ok_or_else(|| ValidationError::InvalidHouseMode(s.to_string()))
    }
}

/// Modes in which automatic triggering is allowed. Empty means any mode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HouseModes(BTreeSet<HouseMode>);

impl HouseModes {
    #[must_use]
    pub fn new(modes: impl IntoIterator<Item = HouseMode>) -> Self {
        Self(modes.into_iter().collect())
    }

    /// Whether triggering is restricted at all.
    #[must_use]
    pub fn is_unrestricted(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn contains(&self, mode: HouseMode) -> bool {
        self.0.contains(&mode)
    }

    pub fn insert(&mut self, mode: HouseMode) -> bool {
        self.0.insert(mode)
    }

    pub fn remove(&mut self, mode: HouseMode) -> bool {
        self.0.remove(&mode)
    }

    /// Modes in ascending code order.
    pub fn iter(&self) -> impl Iterator<Item = HouseMode> + '_ {
        self.0.iter().copied()
    }

    /// Encode as an ascending comma-joined list of mode numbers.
    #[must_use]
    pub fn encode(&self) -> String {
        self.iter()
            .map(|mode| mode.code().to_string())
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Decode a comma-joined list. Unknown tokens are dropped.
    #[must_use]
    pub fn decode(s: &str) -> Self {
        Self::new(s.split(',').filter_map(|token| token.parse().ok()))
    }
}

/// A delay field of the timing section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DelayField {
    /// Off delay after sensor-triggered (automatic) timing.
    Auto,
    /// Off delay after load-triggered (manual) timing.
    Manual,
    /// Wait after a trigger trips before turning the "on" devices on.
    On,
}

impl DelayField {
    pub const ALL: [Self; 3] = [Self::Auto, Self::Manual, Self::On];

    #[must_use]
    pub const fn state_key(self) -> StateKey {
        match self {
            Self::Auto => StateKey::AutoDelay,
            Self::Manual => StateKey::ManualDelay,
            Self::On => StateKey::OnDelay,
        }
    }

    /// Value assumed when the state variable has never been written.
    #[must_use]
    pub const fn default_seconds(self) -> u32 {
        match self {
            Self::Auto => 60,
            Self::Manual => 3600,
            Self::On => 0,
        }
    }
}

/// Scalar timing configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimingConfig {
    pub auto_delay: u32,
    pub manual_delay: u32,
    pub on_delay: u32,
    pub trigger_quieting: u32,
    pub hold_on: HoldOverMode,
    pub house_modes: HouseModes,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            auto_delay: DelayField::Auto.default_seconds(),
            manual_delay: DelayField::Manual.default_seconds(),
            on_delay: DelayField::On.default_seconds(),
            trigger_quieting: 0,
            hold_on: HoldOverMode::default(),
            house_modes: HouseModes::default(),
        }
    }
}

impl TimingConfig {
    #[must_use]
    pub const fn delay(&self, field: DelayField) -> u32 {
        match field {
            DelayField::Auto => self.auto_delay,
            DelayField::Manual => self.manual_delay,
            DelayField::On => self.on_delay,
        }
    }

    pub fn set_delay(&mut self, field: DelayField, seconds: u32) {
        match field {
            DelayField::Auto => self.auto_delay = seconds,
            DelayField::Manual => self.manual_delay = seconds,
            DelayField::On => self.on_delay = seconds,
        }
    }
}
