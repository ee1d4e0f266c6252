//! Panel configuration: every persisted field, decoded.
//!
//! [`PanelConfig::decode`] rebuilds the configuration from raw state values
//! each time a panel opens; [`PanelConfig::encode_field`] produces the value
//! to write back for one variable.

use serde::{Deserialize, Serialize};

use crate::device_list::{self, DecodeIssue, DeviceEntry, ListKind};
use crate::schedule::{self, SchedulePeriod};
use crate::scene_data::SceneData;
use crate::state::StateKey;
use crate::timing::{DelayField, HoldOverMode, HouseModes, TimingConfig};
use crate::validate::parse_delay;
use crate::variant::PluginVariant;

/// Decoded configuration of one DelayLight device.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PanelConfig {
    pub variant: PluginVariant,
    pub triggers: Vec<DeviceEntry>,
    pub inhibitors: Vec<DeviceEntry>,
    pub on_devices: Vec<DeviceEntry>,
    pub off_devices: Vec<DeviceEntry>,
    pub active_periods: Vec<SchedulePeriod>,
    pub timing: TimingConfig,
    pub scene_data: SceneData,
}

impl PanelConfig {
    /// Empty configuration with defaults for `variant`.
    #[must_use]
    pub fn new(variant: PluginVariant) -> Self {
        Self {
            variant,
            ..Self::default()
        }
    }

    /// Decode from raw state values. `lookup` returns `None` (or an empty
    /// string) for variables that were never written.
    ///
    /// Never fails: malformed list tokens are dropped and unreadable scalars
    /// fall back to their defaults.
    #[must_use]
    pub fn decode(variant: PluginVariant, lookup: impl Fn(StateKey) -> Option<String>) -> Self {
        Self::decode_with_issues(variant, lookup).0
    }

    /// Same as [`PanelConfig::decode`], also returning every list token that
    /// was dropped or repaired, tagged with its list.
    #[must_use]
    pub fn decode_with_issues(
        variant: PluginVariant,
        lookup: impl Fn(StateKey) -> Option<String>,
    ) -> (Self, Vec<(ListKind, DecodeIssue)>) {
        let read = |key: StateKey| lookup(key).unwrap_or_default();
        let mut config = Self::new(variant);
        let mut issues = Vec::new();

        for kind in ListKind::ALL {
            let decoded = device_list::decode_with_issues(&read(kind.state_key()), kind);
            *config.list_mut(kind) = decoded.entries;
            issues.extend(decoded.issues.into_iter().map(|issue| (kind, issue)));
        }
        config.active_periods = schedule::decode(&read(StateKey::ActivePeriods));

        for field in DelayField::ALL {
            let raw = read(field.state_key());
            let seconds = parse_delay(field.state_key().as_str(), &raw)
                .unwrap_or_else(|_| field.default_seconds());
            config.timing.set_delay(field, seconds);
        }
        config.timing.trigger_quieting =
            parse_delay(StateKey::TriggerQuieting.as_str(), &read(StateKey::TriggerQuieting))
                .unwrap_or_default();
        config.timing.hold_on = read(StateKey::HoldOn).parse().unwrap_or_default();
        config.timing.house_modes = HouseModes::decode(&read(StateKey::HouseModes));
        config.scene_data = SceneData::decode(&read(StateKey::SceneData));
        (config, issues)
    }

    /// Entries of one list.
    #[must_use]
    pub fn list(&self, kind: ListKind) -> &[DeviceEntry] {
        match kind {
            ListKind::Trigger => &self.triggers,
            ListKind::Inhibit => &self.inhibitors,
            ListKind::On => &self.on_devices,
            ListKind::Off => &self.off_devices,
        }
    }

    pub fn list_mut(&mut self, kind: ListKind) -> &mut Vec<DeviceEntry> {
        match kind {
            ListKind::Trigger => &mut self.triggers,
            ListKind::Inhibit => &mut self.inhibitors,
            ListKind::On => &mut self.on_devices,
            ListKind::Off => &mut self.off_devices,
        }
    }

    #[must_use]
    pub fn hold_on(&self) -> HoldOverMode {
        self.timing.hold_on
    }

    /// Persisted value for one variable.
    #[must_use]
    pub fn encode_field(&self, key: StateKey) -> String {
        let list = |kind: ListKind| device_list::encode_for(self.variant, self.list(kind), kind);
        match key {
            StateKey::Triggers => list(ListKind::Trigger),
            StateKey::InhibitDevices => list(ListKind::Inhibit),
            StateKey::OnList => list(ListKind::On),
            StateKey::OffList => list(ListKind::Off),
            StateKey::ActivePeriods => schedule::encode(&self.active_periods),
            StateKey::AutoDelay => self.timing.auto_delay.to_string(),
            StateKey::ManualDelay => self.timing.manual_delay.to_string(),
            StateKey::OnDelay => self.timing.on_delay.to_string(),
            StateKey::HoldOn => self.timing.hold_on.to_string(),
            StateKey::HouseModes => self.timing.house_modes.encode(),
            StateKey::TriggerQuieting => self.timing.trigger_quieting.to_string(),
            StateKey::SceneData => self.scene_data.encode(),
        }
    }

    /// Take the field stored under `key` from `other`, leaving the rest.
    pub fn adopt_field(&mut self, other: &Self, key: StateKey) {
        match key {
            StateKey::Triggers => self.triggers.clone_from(&other.triggers),
            StateKey::InhibitDevices => self.inhibitors.clone_from(&other.inhibitors),
            StateKey::OnList => self.on_devices.clone_from(&other.on_devices),
            StateKey::OffList => self.off_devices.clone_from(&other.off_devices),
            StateKey::ActivePeriods => self.active_periods.clone_from(&other.active_periods),
            StateKey::AutoDelay => self.timing.auto_delay = other.timing.auto_delay,
            StateKey::ManualDelay => self.timing.manual_delay = other.timing.manual_delay,
            StateKey::OnDelay => self.timing.on_delay = other.timing.on_delay,
            StateKey::HoldOn => self.timing.hold_on = other.timing.hold_on,
            StateKey::HouseModes => self.timing.house_modes.clone_from(&other.timing.house_modes),
            StateKey::TriggerQuieting => {
                self.timing.trigger_quieting = other.timing.trigger_quieting;
            }
            StateKey::SceneData => self.scene_data.clone_from(&other.scene_data),
        }
    }

    /// Variables this variant manages, in persistence order.
    #[must_use]
    pub fn managed_keys(&self) -> Vec<StateKey> {
        StateKey::ALL
            .into_iter()
            .filter(|key| {
                self.variant.has_timer_options()
                    || !matches!(
                        key,
                        StateKey::InhibitDevices
                            | StateKey::ActivePeriods
                            | StateKey::TriggerQuieting
                    )
            })
            .collect()
    }

    /// All managed variables with their encoded values.
    #[must_use]
    pub fn encode(&self) -> Vec<(StateKey, String)> {
        self.managed_keys()
            .into_iter()
            .map(|key| (key, self.encode_field(key)))
            .collect()
    }
}
