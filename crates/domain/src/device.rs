//! Device: a host device record and its typed classification.
//!
//! The host describes devices by a loose category number, a device type URN
//! and the service ids they implement. [`DeviceRecord::classify`] turns that
//! into the handful of roles the panel cares about.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::id::{DeviceNum, RoomId};
use crate::variant::PluginVariant;

/// Host category numbers the classification looks at.
pub mod category {
    pub const DIMMABLE_LIGHT: u32 = 2;
    pub const SWITCH: u32 = 3;
    pub const SECURITY_SENSOR: u32 = 4;
    pub const DOOR_LOCK: u32 = 7;
}

const VSWITCH_DEVICE_TYPE: &str = "urn:schemas-upnp-org:device:VSwitch:1";

/// A control interface a device declares.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Capability {
    SecuritySensor,
    Dimming,
    SwitchPower,
    DoorLock,
    /// Any service the panel does not classify on.
    Other(String),
}

impl Capability {
    /// Service id of the capability.
    #[must_use]
    pub fn service_id(&self) -> &str {
        match self {
            Self::SecuritySensor => "urn:micasaverde-com:serviceId:SecuritySensor1",
            Self::Dimming => "urn:upnp-org:serviceId:Dimming1",
            Self::SwitchPower => "urn:upnp-org:serviceId:SwitchPower1",
            Self::DoorLock => "urn:micasaverde-com:serviceId:DoorLock1",
            Self::Other(service) => service,
        }
    }
}

impl From<String> for Capability {
    fn from(service: String) -> Self {
        [
            Self::SecuritySensor,
            Self::Dimming,
            Self::SwitchPower,
            Self::DoorLock,
        ]
        .into_iter()
        .find(|known| known.service_id() == service)
        .unwrap_or(Self::Other(service))
    }
}

impl From<&str> for Capability {
    fn from(service: &str) -> Self {
        Self::from(service.to_string())
    }
}

impl From<Capability> for String {
    fn from(capability: Capability) -> Self {
        capability.service_id().to_string()
    }
}

/// A device as listed by the host directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceRecord {
    pub id: DeviceNum,
    pub name: String,
    #[serde(default)]
    pub friendly_name: Option<String>,
    #[serde(default)]
    pub room: RoomId,
    #[serde(default)]
    pub category: u32,
    #[serde(default)]
    pub device_type: String,
    #[serde(default)]
    pub services: BTreeSet<Capability>,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub invisible: bool,
}

/// Roles a device can play in a DelayLight configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct DeviceClass {
    pub sensor: bool,
    pub dimmer: bool,
    pub switch: bool,
    pub trigger: bool,
    pub controllable: bool,
}

impl DeviceRecord {
    /// Minimal record; the rest is filled through the builder-style setters.
    #[must_use]
    pub fn new(id: DeviceNum, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            friendly_name: None,
            room: RoomId::NONE,
            category: 0,
            device_type: String::new(),
            services: BTreeSet::new(),
            hidden: false,
            invisible: false,
        }
    }

    #[must_use]
    pub fn in_room(mut self, room: RoomId) -> Self {
        self.room = room;
        self
    }

    #[must_use]
    pub fn with_category(mut self, category: u32) -> Self {
        self.category = category;
        self
    }

    #[must_use]
    pub fn with_device_type(mut self, device_type: impl Into<String>) -> Self {
        self.device_type = device_type.into();
        self
    }

    #[must_use]
    pub fn with_capability(mut self, capability: Capability) -> Self {
        self.services.insert(capability);
        self
    }

    #[must_use]
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Name shown in menus.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.friendly_name.as_deref().unwrap_or(&self.name)
    }

    #[must_use]
    pub fn implements(&self, capability: &Capability) -> bool {
        self.services.contains(capability)
    }

    /// Hidden devices are never offered in menus.
    #[must_use]
    pub fn is_hidden(&self) -> bool {
        self.hidden || self.invisible
    }

    /// Whether this device is itself a DelayLight timer.
    #[must_use]
    pub fn is_delay_light(&self) -> bool {
        [PluginVariant::Timer, PluginVariant::Classic]
            .iter()
            .any(|variant| variant.device_type() == self.device_type)
    }

    /// Derive the device's roles.
    ///
    /// Another DelayLight counts as a sensor, a trigger and a controllable
    /// load, so timers can be chained.
    #[must_use]
    pub fn classify(&self) -> DeviceClass {
        let delay_light = self.is_delay_light();
        let sensor = delay_light
            || self.category == category::SECURITY_SENSOR
            || self.implements(&Capability::SecuritySensor);
        let dimmer =
            self.category == category::DIMMABLE_LIGHT || self.implements(&Capability::Dimming);
        let switch = self.category == category::SWITCH
            || self.device_type == VSWITCH_DEVICE_TYPE
            || self.implements(&Capability::SwitchPower);
        let trigger = sensor
            || self.category == category::DOOR_LOCK
            || self.implements(&Capability::DoorLock);
        DeviceClass {
            sensor,
            dimmer,
            switch,
            trigger,
            controllable: delay_light || switch || dimmer,
        }
    }
}
