//! Rooms and scenes: the host's grouping for device menus.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::id::{RoomId, SceneId};

/// A host room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub name: String,
}

impl Room {
    #[must_use]
    pub fn new(id: RoomId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    /// The catch-all room for unassigned devices.
    #[must_use]
    pub fn no_room() -> Self {
        Self::new(RoomId::NONE, "No Room")
    }

    /// Menu order: by name, with "No Room" always last.
    #[must_use]
    pub fn menu_order(&self, other: &Self) -> Ordering {
        match (self.id == RoomId::NONE, other.id == RoomId::NONE) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => self.name.cmp(&other.name),
        }
    }
}

/// A host scene.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneRecord {
    pub id: SceneId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub room: RoomId,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub notification_only: bool,
}

impl SceneRecord {
    #[must_use]
    pub fn new(id: SceneId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            room: RoomId::NONE,
            hidden: false,
            notification_only: false,
        }
    }

    #[must_use]
    pub fn in_room(mut self, room: RoomId) -> Self {
        self.room = room;
        self
    }

    /// Hidden and notification-only scenes are never offered.
    #[must_use]
    pub fn is_selectable(&self) -> bool {
        !self.hidden && !self.notification_only
    }

    /// Menu label, falling back to the id for unnamed scenes.
    #[must_use]
    pub fn label(&self) -> String {
        if self.name.is_empty() {
            format!("Scene: {}", self.id)
        } else {
            format!("Scene: {}", self.name)
        }
    }
}
