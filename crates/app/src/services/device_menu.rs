//! Device menus: the pickers offered for each device list, and labels for
//! entries already stored.

use std::collections::BTreeMap;

use delaylight_domain::device::DeviceRecord;
use delaylight_domain::device_list::{DeviceEntry, ListKind};
use delaylight_domain::error::DelayLightError;
use delaylight_domain::id::{DeviceNum, RoomId};
use delaylight_domain::room::{Room, SceneRecord};

use crate::ports::DeviceDirectory;

/// Which list a menu feeds. On and off lists share one menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuPurpose {
    Trigger,
    Inhibit,
    Load,
}

impl MenuPurpose {
    #[must_use]
    pub const fn for_list(kind: ListKind) -> Self {
        match kind {
            ListKind::Trigger => Self::Trigger,
            ListKind::Inhibit => Self::Inhibit,
            ListKind::On | ListKind::Off => Self::Load,
        }
    }

    fn admits(self, device: &DeviceRecord) -> bool {
        let class = device.classify();
        match self {
            Self::Trigger => class.trigger,
            Self::Inhibit => class.sensor || class.switch,
            Self::Load => class.controllable,
        }
    }

    fn offers_scenes(self) -> bool {
        matches!(self, Self::Load)
    }
}

/// One selectable value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuOption {
    /// Value stored in the list: a device number or `S<scene>`.
    pub value: String,
    pub label: String,
    /// Set when the value is taken by the opposite sensor list.
    pub disabled: bool,
    /// Whether a dimming level applies to this option.
    pub dimmable: bool,
}

/// Options of one room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuGroup {
    pub room: Room,
    pub options: Vec<MenuOption>,
}

/// A device picker, grouped by room.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceMenu {
    pub groups: Vec<MenuGroup>,
}

impl DeviceMenu {
    /// All options in display order.
    pub fn options(&self) -> impl Iterator<Item = &MenuOption> {
        self.groups.iter().flat_map(|group| group.options.iter())
    }

    #[must_use]
    pub fn option(&self, value: &str) -> Option<&MenuOption> {
        self.options().find(|option| option.value == value)
    }

    /// Disable every option already used by `entries`, and re-enable the
    /// rest. Used to keep a device out of both the trigger and inhibit list.
    pub fn disable_used(&mut self, entries: &[DeviceEntry]) {
        for option in self.groups.iter_mut().flat_map(|g| g.options.iter_mut()) {
            option.disabled = entries.iter().any(|entry| entry.id == option.value);
        }
    }
}

/// How a stored entry is shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryLabel {
    /// The entry is one of the menu's options.
    Known(String),
    /// The device exists but the menu does not offer it.
    Custom(String),
    /// The directory does not know the id.
    Missing(String),
}

impl EntryLabel {
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Known(text) | Self::Custom(text) | Self::Missing(text) => text,
        }
    }
}

/// Application service building menus from a [`DeviceDirectory`].
pub struct DeviceMenus<D> {
    directory: D,
}

impl<D: DeviceDirectory> DeviceMenus<D> {
    /// Create a new service backed by the given directory.
    pub fn new(directory: D) -> Self {
        Self { directory }
    }

    /// Build the picker for `purpose`, leaving out the plugin's own device.
    ///
    /// Devices are grouped by room, rooms sorted by name with "No Room"
    /// last, devices within a room by name and then number. Hidden devices
    /// and hidden or notification-only scenes are never offered.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the directory.
    #[tracing::instrument(skip(self))]
    pub async fn build_menu(
        &self,
        purpose: MenuPurpose,
        self_id: DeviceNum,
    ) -> Result<DeviceMenu, DelayLightError> {
        let rooms = self.directory.rooms().await?;
        let room_for = |id: RoomId| -> Room {
            if id == RoomId::NONE {
                return Room::no_room();
            }
            rooms
                .iter()
                .find(|room| room.id == id)
                .cloned()
                .unwrap_or_else(|| Room::new(id, format!("Room #{id}")))
        };

        let mut devices: Vec<DeviceRecord> = self
            .directory
            .devices()
            .await?
            .into_iter()
            .filter(|d| d.id != self_id && !d.is_hidden() && purpose.admits(d))
            .collect();
        devices.sort_by(|a, b| {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then(a.id.cmp(&b.id))
        });

        let mut groups: BTreeMap<RoomId, MenuGroup> = BTreeMap::new();
        for device in &devices {
            options_in(&mut groups, device.room, &room_for).push(MenuOption {
                value: device.id.to_string(),
                label: device_label(device),
                disabled: false,
                dimmable: device.classify().dimmer,
            });
        }

        if purpose.offers_scenes() {
            let scenes: Vec<SceneRecord> = self.directory.scenes().await?;
            for scene in scenes.iter().filter(|s| s.is_selectable()) {
                options_in(&mut groups, scene.room, &room_for).push(MenuOption {
                    value: scene.id.to_reference(),
                    label: scene.label(),
                    disabled: false,
                    dimmable: false,
                });
            }
        }

        let mut groups: Vec<MenuGroup> = groups.into_values().collect();
        groups.sort_by(|a, b| a.room.menu_order(&b.room));
        tracing::debug!(groups = groups.len(), "menu built");
        Ok(DeviceMenu { groups })
    }

    /// Label a stored entry against `menu`.
    ///
    /// Entries are never dropped for being unresolvable: ids the menu does
    /// not offer are labelled as custom, and ids the directory does not know
    /// as missing.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the directory.
    pub async fn label_for(
        &self,
        menu: &DeviceMenu,
        entry: &DeviceEntry,
    ) -> Result<EntryLabel, DelayLightError> {
        if let Some(option) = menu.option(&entry.id) {
            return Ok(EntryLabel::Known(option.label.clone()));
        }
        if let Some(scene) = entry.scene_id() {
            let scenes = self.directory.scenes().await?;
            return Ok(match scenes.iter().find(|s| s.id == scene) {
                Some(record) => EntryLabel::Custom(format!("{} (custom config)", record.label())),
                None => EntryLabel::Missing(format!("Scene #{scene} (missing scene)")),
            });
        }
        let device = match entry.device_num() {
            Some(num) => self.directory.device(num).await?,
            None => None,
        };
        Ok(match device {
            Some(device) => EntryLabel::Custom(format!(
                "Device #{} {} (custom config)",
                device.id,
                device.display_name()
            )),
            None => EntryLabel::Missing(format!("Device #{} (missing device)", entry.id)),
        })
    }
}

fn options_in<'a>(
    groups: &'a mut BTreeMap<RoomId, MenuGroup>,
    room: RoomId,
    room_for: &impl Fn(RoomId) -> Room,
) -> &'a mut Vec<MenuOption> {
    &mut groups
        .entry(room)
        .or_insert_with(|| MenuGroup {
            room: room_for(room),
            options: Vec::new(),
        })
        .options
}

fn device_label(device: &DeviceRecord) -> String {
    format!("#{} {}", device.id, device.display_name())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::InMemoryDirectory;
    use delaylight_domain::device::{Capability, category};
    use delaylight_domain::id::SceneId;
    use delaylight_domain::variant::PluginVariant;

    const SELF_ID: DeviceNum = DeviceNum::new(50);

    fn device(id: u32, name: &str, room: u32, category: u32) -> DeviceRecord {
        DeviceRecord::new(DeviceNum::new(id), name)
            .in_room(RoomId::new(room))
            .with_category(category)
    }

    fn directory() -> InMemoryDirectory {
        InMemoryDirectory {
            devices: vec![
                device(10, "Hall motion", 1, category::SECURITY_SENSOR),
                device(11, "bedroom motion", 2, category::SECURITY_SENSOR),
                device(12, "Hall lamp", 1, category::DIMMABLE_LIGHT),
                device(13, "Porch switch", 0, category::SWITCH),
                device(14, "Front door", 0, category::DOOR_LOCK),
                device(15, "Attic sensor", 1, category::SECURITY_SENSOR).hidden(),
                device(SELF_ID.get(), "This timer", 1, 0)
                    .with_device_type(PluginVariant::Timer.device_type()),
                device(16, "Thermostat", 1, 0)
                    .with_capability(Capability::Other("urn:x:serviceId:Heat1".into())),
            ],
            rooms: vec![
                Room::new(RoomId::new(1), "Hall"),
                Room::new(RoomId::new(2), "Bedroom"),
            ],
            scenes: vec![
                SceneRecord::new(SceneId::new(3), "Evening").in_room(RoomId::new(2)),
                SceneRecord {
                    notification_only: true,
                    ..SceneRecord::new(SceneId::new(4), "Notify")
                },
            ],
        }
    }

    fn values(menu: &DeviceMenu) -> Vec<&str> {
        menu.options().map(|o| o.value.as_str()).collect()
    }

    #[tokio::test]
    async fn should_offer_triggers_grouped_by_room_with_no_room_last() {
        let menus = DeviceMenus::new(directory());

        let menu = menus
            .build_menu(MenuPurpose::Trigger, SELF_ID)
            .await
            .unwrap();

        let rooms: Vec<&str> = menu.groups.iter().map(|g| g.room.name.as_str()).collect();
        assert_eq!(rooms, ["Bedroom", "Hall", "No Room"]);
        assert_eq!(values(&menu), ["11", "10", "14"]);
    }

    #[tokio::test]
    async fn should_exclude_own_device_and_hidden_devices() {
        let menus = DeviceMenus::new(directory());

        let menu = menus.build_menu(MenuPurpose::Load, SELF_ID).await.unwrap();

        assert!(menu.option("50").is_none());
        assert!(menu.option("15").is_none());
    }

    #[tokio::test]
    async fn should_offer_sensors_and_switches_for_inhibit() {
        let menus = DeviceMenus::new(directory());

        let menu = menus
            .build_menu(MenuPurpose::Inhibit, SELF_ID)
            .await
            .unwrap();

        assert_eq!(values(&menu), ["11", "10", "13"]);
    }

    #[tokio::test]
    async fn should_offer_loads_and_selectable_scenes() {
        let menus = DeviceMenus::new(directory());

        let menu = menus.build_menu(MenuPurpose::Load, SELF_ID).await.unwrap();

        assert_eq!(values(&menu), ["S3", "12", "13"]);
        assert_eq!(menu.option("S3").unwrap().label, "Scene: Evening");
        assert!(menu.option("12").unwrap().dimmable);
        assert!(menu.option("S4").is_none());
    }

    #[tokio::test]
    async fn should_disable_options_used_by_opposite_list() {
        let menus = DeviceMenus::new(directory());
        let mut menu = menus
            .build_menu(MenuPurpose::Inhibit, SELF_ID)
            .await
            .unwrap();

        menu.disable_used(&[DeviceEntry::new("10").inverted(true)]);

        assert!(menu.option("10").unwrap().disabled);
        assert!(!menu.option("11").unwrap().disabled);

        menu.disable_used(&[]);
        assert!(!menu.option("10").unwrap().disabled);
    }

    #[tokio::test]
    async fn should_label_known_custom_and_missing_entries() {
        let menus = DeviceMenus::new(directory());
        let menu = menus
            .build_menu(MenuPurpose::Trigger, SELF_ID)
            .await
            .unwrap();

        let known = menus.label_for(&menu, &DeviceEntry::new("10")).await.unwrap();
        let custom = menus.label_for(&menu, &DeviceEntry::new("12")).await.unwrap();
        let missing = menus.label_for(&menu, &DeviceEntry::new("99")).await.unwrap();

        assert_eq!(known, EntryLabel::Known("#10 Hall motion".to_string()));
        assert_eq!(
            custom,
            EntryLabel::Custom("Device #12 Hall lamp (custom config)".to_string())
        );
        assert_eq!(
            missing,
            EntryLabel::Missing("Device #99 (missing device)".to_string())
        );
    }

    #[tokio::test]
    async fn should_label_non_numeric_id_as_missing() {
        let menus = DeviceMenus::new(directory());
        let menu = DeviceMenu::default();

        let label = menus.label_for(&menu, &DeviceEntry::new("abc")).await.unwrap();

        assert_eq!(label.text(), "Device #abc (missing device)");
    }

    #[tokio::test]
    async fn should_label_scene_not_on_menu() {
        let menus = DeviceMenus::new(directory());
        let menu = DeviceMenu::default();

        let known_scene = menus
            .label_for(&menu, &DeviceEntry::scene(SceneId::new(4)))
            .await
            .unwrap();
        let gone = menus
            .label_for(&menu, &DeviceEntry::scene(SceneId::new(8)))
            .await
            .unwrap();

        assert!(matches!(known_scene, EntryLabel::Custom(_)));
        assert_eq!(gone.text(), "Scene #8 (missing scene)");
    }
}
