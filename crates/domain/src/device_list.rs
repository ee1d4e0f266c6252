//! Device list codec: trigger, inhibitor, on and off lists.
//!
//! Persisted form is a comma-joined sequence of entries:
//!
//! | Kind | Entry | Example |
//! |------|-------|---------|
//! | trigger / inhibit | `[-]id` | `12,-31` |
//! | on / off | `id[=level]` or `S<scene>` | `12=55,40` / `S42` |
//!
//! Decoding is total: malformed tokens are dropped (and reported through
//! [`decode_with_issues`]) instead of failing the whole list. Device ids are
//! opaque and kept verbatim even when the host no longer knows them.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::id::{DeviceNum, SCENE_PREFIX, SceneId};
use crate::state::StateKey;
use crate::validate::{MAX_LEVEL, parse_level};
use crate::variant::PluginVariant;

/// Separator between entries.
pub const ENTRY_SEPARATOR: char = ',';
/// Prefix marking an inverted trigger or inhibitor.
pub const INVERT_PREFIX: char = '-';
/// Separator between a device id and its dimming level.
pub const LEVEL_SEPARATOR: char = '=';

/// Which list an entry belongs to. Decides which entry fields are meaningful.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListKind {
    /// Sensors whose tripped state starts automatic timing.
    Trigger,
    /// Devices whose tripped state suppresses automatic triggering.
    Inhibit,
    /// Devices (or one scene) turned on by the timer.
    On,
    /// Devices (or one scene) turned off when the timer resets.
    Off,
}

impl ListKind {
    /// Every list kind, in panel order.
    pub const ALL: [Self; 4] = [Self::Trigger, Self::Inhibit, Self::On, Self::Off];

    /// State variable holding this list.
    #[must_use]
    pub const fn state_key(self) -> StateKey {
        match self {
            Self::Trigger => StateKey::Triggers,
            Self::Inhibit => StateKey::InhibitDevices,
            Self::On => StateKey::OnList,
            Self::Off => StateKey::OffList,
        }
    }

    /// Trigger and inhibit entries may be inverted.
    #[must_use]
    pub const fn allows_invert(self) -> bool {
        matches!(self, Self::Trigger | Self::Inhibit)
    }

    /// On and off entries may carry a dimming level.
    #[must_use]
    pub const fn allows_level(self) -> bool {
        matches!(self, Self::On | Self::Off)
    }

    /// Only on and off lists may reference a scene.
    #[must_use]
    pub const fn allows_scenes(self) -> bool {
        matches!(self, Self::On | Self::Off)
    }

    /// The list a device cannot appear in at the same time as this one.
    #[must_use]
    pub const fn exclusive_with(self) -> Option<Self> {
        match self {
            Self::Trigger => Some(Self::Inhibit),
            Self::Inhibit => Some(Self::Trigger),
            Self::On | Self::Off => None,
        }
    }
}

impl fmt::Display for ListKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Trigger => "trigger",
            Self::Inhibit => "inhibit",
            Self::On => "on",
            Self::Off => "off",
        })
    }
}

/// One row of a device list.
///
/// `invert` only matters for trigger/inhibit lists and `level` only for
/// on/off lists; the codec ignores whichever does not apply to the kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceEntry {
    /// Device number, or `S<scene>` for a scene reference.
    pub id: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub invert: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<u8>,
}

impl DeviceEntry {
    /// Entry with the given raw id and no options.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            invert: false,
            level: None,
        }
    }

    /// Entry for a host device.
    #[must_use]
    pub fn device(num: DeviceNum) -> Self {
        Self::new(num.to_string())
    }

    /// Entry referencing a scene.
    #[must_use]
    pub fn scene(id: SceneId) -> Self {
        Self::new(id.to_reference())
    }

    #[must_use]
    pub fn inverted(mut self, invert: bool) -> Self {
        self.invert = invert;
        self
    }

    #[must_use]
    pub fn with_level(mut self, level: u8) -> Self {
        self.level = Some(level);
        self
    }

    /// Whether the id is a scene reference.
    #[must_use]
    pub fn is_scene(&self) -> bool {
        self.id.starts_with(SCENE_PREFIX)
    }

    /// Scene referenced by this entry, if any.
    #[must_use]
    pub fn scene_id(&self) -> Option<SceneId> {
        SceneId::from_reference(&self.id)
    }

    /// Host device number, if the id is numeric.
    #[must_use]
    pub fn device_num(&self) -> Option<DeviceNum> {
        self.id.parse().ok()
    }

    /// Check that the entry fits `kind`.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] that applies:
    /// - empty id ([`ValidationError::EmptyDeviceId`])
    /// - delimiter in the id ([`ValidationError::ReservedCharacter`])
    /// - scene in a trigger/inhibit list ([`ValidationError::SceneNotAllowed`])
    /// - invert in an on/off list ([`ValidationError::InvertNotAllowed`])
    /// - level where none is allowed ([`ValidationError::LevelNotAllowed`])
    /// - level above 100 ([`ValidationError::LevelOutOfRange`])
    pub fn validate(&self, kind: ListKind) -> Result<(), ValidationError> {
        if self.id.is_empty() {
            return Err(ValidationError::EmptyDeviceId);
        }
        if !is_representable(&self.id, kind) {
            return Err(ValidationError::ReservedCharacter(self.id.clone()));
        }
        if self.is_scene() && !kind.allows_scenes() {
            return Err(ValidationError::SceneNotAllowed(kind));
        }
        if self.invert && !kind.allows_invert() {
            return Err(ValidationError::InvertNotAllowed(kind));
        }
        if let Some(level) = self.level {
            if !kind.allows_level() || self.is_scene() {
                return Err(ValidationError::LevelNotAllowed {
                    kind,
                    id: self.id.clone(),
                });
            }
            if level > MAX_LEVEL {
                return Err(ValidationError::LevelOutOfRange(level.to_string()));
            }
        }
        Ok(())
    }

    fn render(&self, kind: ListKind, implicit_level: Option<u8>) -> Option<String> {
        if self.id.is_empty() || !is_representable(&self.id, kind) {
            return None;
        }
        if kind.allows_invert() {
            if self.is_scene() {
                return None;
            }
            return Some(if self.invert {
                format!("{INVERT_PREFIX}{}", self.id)
            } else {
                self.id.clone()
            });
        }
        let level = self
            .level
            .filter(|&level| level <= MAX_LEVEL && !self.is_scene())
            .filter(|&level| Some(level) != implicit_level);
        Some(match level {
            Some(level) => format!("{}{LEVEL_SEPARATOR}{level}", self.id),
            None => self.id.clone(),
        })
    }
}

/// Whether `id` survives a round trip through a list of `kind`.
fn is_representable(id: &str, kind: ListKind) -> bool {
    if id.contains(ENTRY_SEPARATOR) {
        return false;
    }
    if kind.allows_level() {
        !id.contains(LEVEL_SEPARATOR)
    } else {
        !id.starts_with(INVERT_PREFIX)
    }
}

/// Encode a list the way the timer panel writes it.
///
/// Rows without a selection are skipped, as are scene references in
/// trigger/inhibit lists. Levels above 100 or on scenes are written as "no
/// level".
#[must_use]
pub fn encode(entries: &[DeviceEntry], kind: ListKind) -> String {
    encode_for(PluginVariant::Timer, entries, kind)
}

/// Encode a list for a specific plugin variant.
///
/// The classic variant leaves out levels equal to the kind's implicit
/// default (100 for on, 0 for off).
#[must_use]
pub fn encode_for(variant: PluginVariant, entries: &[DeviceEntry], kind: ListKind) -> String {
    let implicit = variant.implicit_level(kind);
    entries
        .iter()
        .filter_map(|entry| entry.render(kind, implicit))
        .collect::<Vec<_>>()
        .join(&ENTRY_SEPARATOR.to_string())
}

/// Something the decoder dropped or repaired.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeIssue {
    /// Two separators in a row, or a leading/trailing separator.
    #[error("empty token at position {position}")]
    EmptyToken { position: usize },

    /// A token with no usable device id, e.g. a bare `-` or `=50`.
    #[error("token {token:?} has no usable device id")]
    InvalidDeviceId { token: String },

    /// A scene reference in a trigger or inhibit list.
    #[error("scene {token:?} dropped from the {kind} list")]
    SceneNotAllowed { kind: ListKind, token: String },

    /// A level that is not an integer in `0..=100`; the entry keeps no level.
    #[error("level {level:?} on {id:?} ignored")]
    InvalidLevel { id: String, level: String },

    /// A level attached to a scene reference; the scene is kept without it.
    #[error("level {level:?} on scene {id:?} ignored")]
    SceneLevelDiscarded { id: String, level: String },
}

/// Result of [`decode_with_issues`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Decoded {
    pub entries: Vec<DeviceEntry>,
    pub issues: Vec<DecodeIssue>,
}

/// Decode a persisted list. Never fails; see [`decode_with_issues`].
#[must_use]
pub fn decode(s: &str, kind: ListKind) -> Vec<DeviceEntry> {
    decode_with_issues(s, kind).entries
}

/// Decode a persisted list and report every token that was dropped or
/// repaired.
#[must_use]
pub fn decode_with_issues(s: &str, kind: ListKind) -> Decoded {
    let mut decoded = Decoded::default();
    if s.is_empty() {
        return decoded;
    }

    for (position, token) in s.split(ENTRY_SEPARATOR).enumerate() {
        if token.is_empty() {
            decoded.issues.push(DecodeIssue::EmptyToken { position });
            continue;
        }
        let result = if kind.allows_invert() {
            decode_sensor_token(token, kind)
        } else {
            decode_load_token(token, &mut decoded.issues)
        };
        match result {
            Ok(entry) => decoded.entries.push(entry),
            Err(issue) => decoded.issues.push(issue),
        }
    }
    decoded
}

fn decode_sensor_token(token: &str, kind: ListKind) -> Result<DeviceEntry, DecodeIssue> {
    let (id, invert) = match token.strip_prefix(INVERT_PREFIX) {
        Some(rest) => (rest, true),
        None => (token, false),
    };
    if id.is_empty() || id.starts_with(INVERT_PREFIX) {
        return Err(DecodeIssue::InvalidDeviceId {
            token: token.to_string(),
        });
    }
    let entry = DeviceEntry::new(id).inverted(invert);
    if entry.is_scene() {
        return Err(DecodeIssue::SceneNotAllowed {
            kind,
            token: token.to_string(),
        });
    }
    Ok(entry)
}

fn decode_load_token(token: &str, issues: &mut Vec<DecodeIssue>) -> Result<DeviceEntry, DecodeIssue> {
    let (id, level) = match token.split_once(LEVEL_SEPARATOR) {
        Some((id, level)) => (id, Some(level)),
        None => (token, None),
    };
    if id.is_empty() {
        return Err(DecodeIssue::InvalidDeviceId {
            token: token.to_string(),
        });
    }
    let mut entry = DeviceEntry::new(id);
    let Some(level) = level else {
        return Ok(entry);
    };
    if entry.is_scene() {
        issues.push(DecodeIssue::SceneLevelDiscarded {
            id: id.to_string(),
            level: level.to_string(),
        });
        return Ok(entry);
    }
    match parse_level(level) {
        Ok(parsed) => entry.level = parsed,
        Err(_) => issues.push(DecodeIssue::InvalidLevel {
            id: id.to_string(),
            level: level.to_string(),
        }),
    }
    Ok(entry)
}

/// Apply the "any number of devices, or a single scene" rule to an on/off
/// list: once a scene is selected, it is the only entry kept.
#[must_use]
pub fn normalize_scene_list(entries: Vec<DeviceEntry>) -> Vec<DeviceEntry> {
    match entries.iter().position(DeviceEntry::is_scene) {
        Some(ix) => entries.into_iter().skip(ix).take(1).collect(),
        None => entries,
    }
}
