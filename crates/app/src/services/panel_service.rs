//! Panel service: one editing session over a DelayLight device's configuration.
//!
//! A [`ConfigPanel`] is opened per device, decodes every persisted field and
//! then applies edits one at a time. Each edit validates its input, updates
//! the decoded configuration, re-encodes the affected variables and writes
//! them through the [`StateStore`]. Nothing is cached between sessions.

use std::collections::HashMap;

use delaylight_domain::config::PanelConfig;
use delaylight_domain::device_list::{DeviceEntry, ListKind, normalize_scene_list};
use delaylight_domain::error::{DelayLightError, NotFoundError, ValidationError};
use delaylight_domain::id::{DeviceNum, SceneId};
use delaylight_domain::schedule::SchedulePeriod;
use delaylight_domain::state::StateKey;
use delaylight_domain::timing::{DelayField, HoldOverMode, HouseModes};
use delaylight_domain::validate::{parse_delay, parse_level, parse_quieting};
use delaylight_domain::variant::PluginVariant;

use super::scene_cache::{SceneCache, SceneRefresh, referenced_scenes};
use crate::ports::{SceneSource, StateStore};

/// Result of an edit that reached the store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Edit {
    /// Variables written, in write order.
    pub persisted: Vec<StateKey>,
    /// Whether this edit requires a host reload to take effect.
    pub config_modified: bool,
}

/// How a single form field was handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldStatus {
    /// The input was stored as given.
    Accepted,
    /// The input was rejected and the field should be shown in error.
    Flagged(ValidationError),
    /// The input was unusable and the field fell back to zero.
    Reset,
}

/// Result of a single-field edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldEdit {
    pub status: FieldStatus,
    pub edit: Edit,
}

/// Result of [`ConfigPanel::set_device_lists`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceListsEdit {
    pub edit: Edit,
    /// Scenes the lists reference that are not in the scene cache yet.
    pub scenes_to_fetch: Vec<SceneId>,
}

/// Result of [`ConfigPanel::close`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CloseOutcome {
    /// Set when the session modified configuration that needs a reload.
    pub reload_requested: bool,
}

/// An open configuration session for one plugin device.
pub struct ConfigPanel<S> {
    store: S,
    device: DeviceNum,
    config: PanelConfig,
    modified: bool,
}

impl<S: StateStore> ConfigPanel<S> {
    /// Open a session: read every variable the variant manages and decode it.
    ///
    /// Repairs made while decoding device lists are logged but do not fail
    /// the open; the repaired form is what the next write persists.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the store.
    #[tracing::instrument(skip(store))]
    pub async fn open(
        store: S,
        device: DeviceNum,
        variant: PluginVariant,
    ) -> Result<Self, DelayLightError> {
        let service = variant.service_id();
        let mut raw = HashMap::new();
        for key in PanelConfig::new(variant).managed_keys() {
            if let Some(value) = store.get(device, service, key).await? {
                raw.insert(key, value);
            }
        }

        let (config, issues) =
            PanelConfig::decode_with_issues(variant, |key| raw.get(&key).cloned());
        for (kind, issue) in issues {
            tracing::warn!(%issue, %kind, "repaired persisted device list");
        }
        tracing::debug!(variables = raw.len(), "panel opened");
        Ok(Self {
            store,
            device,
            config,
            modified: false,
        })
    }

    #[must_use]
    pub fn device(&self) -> DeviceNum {
        self.device
    }

    #[must_use]
    pub fn variant(&self) -> PluginVariant {
        self.config.variant
    }

    /// The configuration as last persisted.
    #[must_use]
    pub fn config(&self) -> &PanelConfig {
        &self.config
    }

    /// Whether an edit in this session needs a reload to take effect.
    #[must_use]
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Replace the trigger list.
    ///
    /// Any device also listed as an inhibitor is removed from the inhibitor
    /// list, which is then persisted too.
    ///
    /// # Errors
    ///
    /// Returns [`DelayLightError::Validation`] when an entry is invalid for a
    /// trigger list, or a storage error from the store.
    pub async fn set_triggers(&mut self, entries: Vec<DeviceEntry>) -> Result<Edit, DelayLightError> {
        self.set_sensor_list(ListKind::Trigger, entries).await
    }

    /// Replace the inhibitor list.
    ///
    /// Any device also listed as a trigger is removed from the trigger list,
    /// which is then persisted too.
    ///
    /// # Errors
    ///
    /// Returns [`DelayLightError::Validation`] when an entry is invalid for an
    /// inhibit list or the variant has no inhibitors, or a storage error.
    pub async fn set_inhibitors(
        &mut self,
        entries: Vec<DeviceEntry>,
    ) -> Result<Edit, DelayLightError> {
        self.set_sensor_list(ListKind::Inhibit, entries).await
    }

    #[tracing::instrument(skip(self, entries), fields(device = %self.device, count = entries.len()))]
    async fn set_sensor_list(
        &mut self,
        kind: ListKind,
        entries: Vec<DeviceEntry>,
    ) -> Result<Edit, DelayLightError> {
        self.ensure_managed(kind.state_key())?;
        for entry in &entries {
            entry.validate(kind)?;
        }

        let mut candidate = self.config.clone();
        let mut keys = vec![kind.state_key()];
        if let Some(other) = kind.exclusive_with() {
            let other_list = candidate.list_mut(other);
            let before = other_list.len();
            other_list.retain(|existing| !entries.iter().any(|entry| entry.id == existing.id));
            if other_list.len() != before {
                tracing::info!(%kind, %other, "moved devices between sensor lists");
                keys.push(other.state_key());
            }
        }
        *candidate.list_mut(kind) = entries;

        self.commit(candidate, keys, true).await
    }

    /// Replace the active periods. Unset (`0000-0000`) rows are not stored.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::UnsupportedField`] for the classic variant,
    /// or a storage error from the store.
    #[tracing::instrument(skip(self, periods), fields(device = %self.device))]
    pub async fn set_schedule(
        &mut self,
        periods: Vec<SchedulePeriod>,
    ) -> Result<Edit, DelayLightError> {
        self.ensure_managed(StateKey::ActivePeriods)?;
        let mut candidate = self.config.clone();
        candidate.active_periods = periods.into_iter().filter(|p| !p.is_unset()).collect();
        self.commit(candidate, vec![StateKey::ActivePeriods], true).await
    }

    /// Replace the on and off lists together.
    ///
    /// Each list holds any number of devices or a single scene; a list that
    /// contains a scene is reduced to that scene. Cached scenes neither list
    /// references any more are dropped and the cache is persisted with them.
    ///
    /// # Errors
    ///
    /// Returns [`DelayLightError::Validation`] when an entry is invalid for
    /// its list, or a storage error from the store.
    #[tracing::instrument(skip(self, on, off), fields(device = %self.device))]
    pub async fn set_device_lists(
        &mut self,
        on: Vec<DeviceEntry>,
        off: Vec<DeviceEntry>,
    ) -> Result<DeviceListsEdit, DelayLightError> {
        for entry in &on {
            entry.validate(ListKind::On)?;
        }
        for entry in &off {
            entry.validate(ListKind::Off)?;
        }
        let mut candidate = self.config.clone();
        candidate.on_devices = normalize_scene_list(on);
        candidate.off_devices = normalize_scene_list(off);

        let mut keys = vec![StateKey::OnList, StateKey::OffList];
        let referenced = referenced_scenes(&candidate.on_devices, &candidate.off_devices);
        let pruned = candidate.scene_data.retain_scenes(&referenced);
        if pruned > 0 {
            tracing::debug!(pruned, "dropped unreferenced cached scenes");
            keys.push(StateKey::SceneData);
        }

        let edit = self.commit(candidate, keys, true).await?;
        Ok(DeviceListsEdit {
            edit,
            scenes_to_fetch: self.missing_scenes(),
        })
    }

    /// Set the dimming level of one on/off row from raw form input.
    ///
    /// A blank input clears the level. An invalid one flags the row and the
    /// entry is stored without a level. The list is persisted either way.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::LevelNotAllowed`] for trigger/inhibit lists,
    /// [`DelayLightError::NotFound`] when `row` does not exist, or a storage
    /// error from the store.
    #[tracing::instrument(skip(self), fields(device = %self.device))]
    pub async fn set_level(
        &mut self,
        kind: ListKind,
        row: usize,
        input: &str,
    ) -> Result<FieldEdit, DelayLightError> {
        let mut candidate = self.config.clone();
        let entry = candidate
            .list_mut(kind)
            .get_mut(row)
            .ok_or_else(|| NotFoundError {
                entity: "Row",
                id: format!("{kind}[{row}]"),
            })?;
        if !kind.allows_level() {
            return Err(ValidationError::LevelNotAllowed {
                kind,
                id: entry.id.clone(),
            }
            .into());
        }

        let status = match parse_level(input) {
            Ok(Some(_)) if entry.is_scene() => {
                entry.level = None;
                FieldStatus::Flagged(ValidationError::LevelNotAllowed {
                    kind,
                    id: entry.id.clone(),
                })
            }
            Ok(level) => {
                entry.level = level;
                FieldStatus::Accepted
            }
            Err(err) => {
                tracing::debug!(%err, "level flagged");
                entry.level = None;
                FieldStatus::Flagged(err)
            }
        };

        let edit = self.commit(candidate, vec![kind.state_key()], true).await?;
        Ok(FieldEdit { status, edit })
    }

    /// Set one of the delay fields from raw form input.
    ///
    /// Invalid input flags the field and nothing is written.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the store.
    #[tracing::instrument(skip(self), fields(device = %self.device))]
    pub async fn set_delay(
        &mut self,
        field: DelayField,
        input: &str,
    ) -> Result<FieldEdit, DelayLightError> {
        let key = field.state_key();
        match parse_delay(key.as_str(), input) {
            Ok(seconds) => {
                let mut candidate = self.config.clone();
                candidate.timing.set_delay(field, seconds);
                let edit = self.timing_edit(candidate, key).await?;
                Ok(FieldEdit {
                    status: FieldStatus::Accepted,
                    edit,
                })
            }
            Err(err) => Ok(FieldEdit {
                status: FieldStatus::Flagged(err),
                edit: Edit::default(),
            }),
        }
    }

    /// Set the hold-over mode.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the store.
    #[tracing::instrument(skip(self), fields(device = %self.device))]
    pub async fn set_hold_on(&mut self, mode: HoldOverMode) -> Result<Edit, DelayLightError> {
        let mut candidate = self.config.clone();
        candidate.timing.hold_on = mode;
        self.timing_edit(candidate, StateKey::HoldOn).await
    }

    /// Restrict the timer to the given house modes. An empty set means any.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the store.
    #[tracing::instrument(skip(self), fields(device = %self.device))]
    pub async fn set_house_modes(&mut self, modes: HouseModes) -> Result<Edit, DelayLightError> {
        let mut candidate = self.config.clone();
        candidate.timing.house_modes = modes;
        self.timing_edit(candidate, StateKey::HouseModes).await
    }

    /// Set the trigger quieting period from raw form input.
    ///
    /// Unusable input resets the field to zero, and zero is persisted.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::UnsupportedField`] for the classic variant,
    /// or a storage error from the store.
    #[tracing::instrument(skip(self), fields(device = %self.device))]
    pub async fn set_quieting(&mut self, input: &str) -> Result<FieldEdit, DelayLightError> {
        self.ensure_managed(StateKey::TriggerQuieting)?;
        let quieting = parse_quieting(input);
        let mut candidate = self.config.clone();
        candidate.timing.trigger_quieting = quieting.seconds;
        let edit = self.timing_edit(candidate, StateKey::TriggerQuieting).await?;
        Ok(FieldEdit {
            status: if quieting.reset {
                FieldStatus::Reset
            } else {
                FieldStatus::Accepted
            },
            edit,
        })
    }

    /// Scenes referenced by the on/off lists that the cache lacks.
    #[must_use]
    pub fn missing_scenes(&self) -> Vec<SceneId> {
        referenced_scenes(&self.config.on_devices, &self.config.off_devices)
            .into_iter()
            .filter(|id| !self.config.scene_data.contains(*id))
            .collect()
    }

    /// Refresh the scene cache and persist it when it changed.
    ///
    /// A scene that cannot be fetched is left out of the cache without
    /// failing the refresh.
    ///
    /// # Errors
    ///
    /// Returns a storage error when persisting the cache fails.
    #[tracing::instrument(skip(self, cache), fields(device = %self.device))]
    pub async fn refresh_scene_cache<C: SceneSource>(
        &mut self,
        cache: &SceneCache<C>,
    ) -> Result<SceneRefresh, DelayLightError> {
        let mut candidate = self.config.clone();
        let report = cache
            .refresh(
                &mut candidate.scene_data,
                &self.config.on_devices,
                &self.config.off_devices,
            )
            .await;
        if report.changed() {
            self.commit(candidate, vec![StateKey::SceneData], false).await?;
        }
        Ok(report)
    }

    /// Close the session.
    ///
    /// With `reload` set and a modified configuration, the host is asked to
    /// reload. The modified flag is cleared either way, so a declined reload
    /// is not asked for again.
    ///
    /// # Errors
    ///
    /// Returns a storage error when the reload request fails.
    #[tracing::instrument(skip(self), fields(device = %self.device))]
    pub async fn close(&mut self, reload: bool) -> Result<CloseOutcome, DelayLightError> {
        let reload_requested = std::mem::take(&mut self.modified);
        if reload_requested && reload {
            self.store.request_reload(self.device).await?;
            tracing::info!("reload requested");
        } else if reload_requested {
            tracing::info!("configuration modified; reload skipped");
        }
        Ok(CloseOutcome { reload_requested })
    }

    fn ensure_managed(&self, key: StateKey) -> Result<(), ValidationError> {
        if self.config.managed_keys().contains(&key) {
            Ok(())
        } else {
            Err(ValidationError::UnsupportedField(key))
        }
    }

    /// Write `keys` from `candidate`, adopting each field only once its write
    /// has landed. A failed write leaves that field and the ones after it as
    /// they were.
    async fn commit(
        &mut self,
        candidate: PanelConfig,
        keys: Vec<StateKey>,
        modifies: bool,
    ) -> Result<Edit, DelayLightError> {
        let service = self.config.variant.service_id();
        for &key in &keys {
            let value = candidate.encode_field(key);
            tracing::debug!(%key, %value, "persisting");
            self.store
                .set(self.device, service, key, value, false)
                .await?;
            self.config.adopt_field(&candidate, key);
            self.modified |= modifies;
        }
        self.config = candidate;
        Ok(Edit {
            persisted: keys,
            config_modified: modifies,
        })
    }

    /// Persist one timing scalar. These take effect immediately on the timer
    /// variant; the classic variant only reads them on reload.
    async fn timing_edit(
        &mut self,
        candidate: PanelConfig,
        key: StateKey,
    ) -> Result<Edit, DelayLightError> {
        let modifies = self.config.variant.timing_edits_need_reload();
        self.commit(candidate, vec![key], modifies).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FakeSceneSource, InMemoryStateStore};
    use delaylight_domain::timing::HouseMode;

    const DEVICE: DeviceNum = DeviceNum::new(50);
    const TIMER: &str = "urn:toggledbits-com:serviceId:DelayLightTimer";
    const CLASSIC: &str = "urn:toggledbits-com:serviceId:DelayLight";

    async fn open(pairs: &[(StateKey, &str)]) -> ConfigPanel<InMemoryStateStore> {
        let store = InMemoryStateStore::with(DEVICE, TIMER, pairs);
        ConfigPanel::open(store, DEVICE, PluginVariant::Timer)
            .await
            .unwrap()
    }

    async fn open_classic(pairs: &[(StateKey, &str)]) -> ConfigPanel<InMemoryStateStore> {
        let store = InMemoryStateStore::with(DEVICE, CLASSIC, pairs);
        ConfigPanel::open(store, DEVICE, PluginVariant::Classic)
            .await
            .unwrap()
    }

    fn stored(panel: &ConfigPanel<InMemoryStateStore>, key: StateKey) -> Option<String> {
        panel
            .store()
            .value(DEVICE, panel.variant().service_id(), key)
    }

    #[tokio::test]
    async fn should_decode_persisted_state_when_opened() {
        let panel = open(&[
            (StateKey::Triggers, "12,-31"),
            (StateKey::AutoDelay, "90"),
        ])
        .await;

        assert_eq!(panel.config().triggers.len(), 2);
        assert_eq!(panel.config().timing.auto_delay, 90);
        assert_eq!(panel.config().timing.manual_delay, 3600);
        assert!(!panel.is_modified());
    }

    #[tokio::test]
    async fn should_not_write_anything_when_opened() {
        let panel = open(&[(StateKey::Triggers, "12,,abc")]).await;
        assert!(panel.store().writes().is_empty());
    }

    #[tokio::test]
    async fn should_persist_triggers_and_mark_modified() {
        let mut panel = open(&[]).await;

        let edit = panel
            .set_triggers(vec![
                DeviceEntry::new("12"),
                DeviceEntry::new("31").inverted(true),
            ])
            .await
            .unwrap();

        assert_eq!(edit.persisted, vec![StateKey::Triggers]);
        assert!(edit.config_modified);
        assert!(panel.is_modified());
        assert_eq!(stored(&panel, StateKey::Triggers).as_deref(), Some("12,-31"));
    }

    #[tokio::test]
    async fn should_move_device_out_of_inhibitors_when_made_trigger() {
        let mut panel = open(&[
            (StateKey::Triggers, "12"),
            (StateKey::InhibitDevices, "31,40"),
        ])
        .await;

        let edit = panel
            .set_triggers(vec![DeviceEntry::new("12"), DeviceEntry::new("31")])
            .await
            .unwrap();

        assert_eq!(
            edit.persisted,
            vec![StateKey::Triggers, StateKey::InhibitDevices]
        );
        assert_eq!(stored(&panel, StateKey::InhibitDevices).as_deref(), Some("40"));
    }

    #[tokio::test]
    async fn should_move_device_out_of_triggers_when_made_inhibitor() {
        let mut panel = open(&[(StateKey::Triggers, "12,-31")]).await;

        panel
            .set_inhibitors(vec![DeviceEntry::new("31")])
            .await
            .unwrap();

        assert_eq!(stored(&panel, StateKey::Triggers).as_deref(), Some("12"));
        assert_eq!(stored(&panel, StateKey::InhibitDevices).as_deref(), Some("31"));
    }

    #[tokio::test]
    async fn should_reject_scene_in_trigger_list() {
        let mut panel = open(&[]).await;

        let result = panel
            .set_triggers(vec![DeviceEntry::scene(SceneId::new(4))])
            .await;

        assert!(matches!(
            result,
            Err(DelayLightError::Validation(ValidationError::SceneNotAllowed(
                ListKind::Trigger
            )))
        ));
        assert!(panel.store().writes().is_empty());
    }

    #[tokio::test]
    async fn should_reject_inhibitors_when_classic() {
        let mut panel = open_classic(&[]).await;

        let result = panel.set_inhibitors(vec![DeviceEntry::new("9")]).await;

        assert!(matches!(
            result,
            Err(DelayLightError::Validation(ValidationError::UnsupportedField(
                StateKey::InhibitDevices
            )))
        ));
    }

    #[tokio::test]
    async fn should_persist_schedule_without_unset_periods() {
        let mut panel = open(&[]).await;

        panel
            .set_schedule(vec![
                SchedulePeriod::new(8, 0, 17, 0).unwrap(),
                SchedulePeriod::new(0, 0, 0, 0).unwrap(),
            ])
            .await
            .unwrap();

        assert_eq!(
            stored(&panel, StateKey::ActivePeriods).as_deref(),
            Some("0800-1700")
        );
        assert_eq!(panel.config().active_periods.len(), 1);
    }

    #[tokio::test]
    async fn should_persist_on_then_off_and_report_scenes_to_fetch() {
        let mut panel = open(&[]).await;

        let result = panel
            .set_device_lists(
                vec![DeviceEntry::new("12").with_level(55)],
                vec![DeviceEntry::scene(SceneId::new(7))],
            )
            .await
            .unwrap();

        assert_eq!(
            result.edit.persisted,
            vec![StateKey::OnList, StateKey::OffList]
        );
        assert_eq!(result.scenes_to_fetch, vec![SceneId::new(7)]);
        assert_eq!(stored(&panel, StateKey::OnList).as_deref(), Some("12=55"));
        assert_eq!(stored(&panel, StateKey::OffList).as_deref(), Some("S7"));
    }

    #[tokio::test]
    async fn should_keep_only_scene_when_list_mixes_scene_and_devices() {
        let mut panel = open(&[]).await;

        panel
            .set_device_lists(
                vec![
                    DeviceEntry::new("12"),
                    DeviceEntry::scene(SceneId::new(3)),
                    DeviceEntry::new("14"),
                ],
                vec![],
            )
            .await
            .unwrap();

        assert_eq!(stored(&panel, StateKey::OnList).as_deref(), Some("S3"));
    }

    #[tokio::test]
    async fn should_drop_cached_scene_when_lists_no_longer_reference_it() {
        let mut panel = open(&[
            (StateKey::OnList, "S3"),
            (StateKey::SceneData, r#"{"3":{"id":3}}"#),
        ])
        .await;

        let result = panel
            .set_device_lists(vec![DeviceEntry::new("12")], vec![])
            .await
            .unwrap();

        assert_eq!(
            result.edit.persisted,
            vec![StateKey::OnList, StateKey::OffList, StateKey::SceneData]
        );
        assert!(panel.config().scene_data.is_empty());
        assert_eq!(stored(&panel, StateKey::OnList).as_deref(), Some("12"));
        assert_eq!(stored(&panel, StateKey::SceneData).as_deref(), Some(""));
    }

    #[tokio::test]
    async fn should_keep_cached_scene_when_still_referenced() {
        let mut panel = open(&[
            (StateKey::OnList, "S3"),
            (StateKey::SceneData, r#"{"3":{"id":3}}"#),
        ])
        .await;

        let result = panel
            .set_device_lists(
                vec![DeviceEntry::new("12")],
                vec![DeviceEntry::scene(SceneId::new(3))],
            )
            .await
            .unwrap();

        assert_eq!(
            result.edit.persisted,
            vec![StateKey::OnList, StateKey::OffList]
        );
        assert!(result.scenes_to_fetch.is_empty());
        assert!(panel.config().scene_data.contains(SceneId::new(3)));
    }

    #[tokio::test]
    async fn should_flag_level_and_store_row_without_level_when_out_of_range() {
        let mut panel = open(&[(StateKey::OnList, "7=40")]).await;

        let result = panel.set_level(ListKind::On, 0, "150").await.unwrap();

        assert!(matches!(
            result.status,
            FieldStatus::Flagged(ValidationError::LevelOutOfRange(_))
        ));
        assert_eq!(stored(&panel, StateKey::OnList).as_deref(), Some("7"));
    }

    #[tokio::test]
    async fn should_clear_level_when_input_blank() {
        let mut panel = open(&[(StateKey::OffList, "7=10")]).await;

        let result = panel.set_level(ListKind::Off, 0, "  ").await.unwrap();

        assert_eq!(result.status, FieldStatus::Accepted);
        assert_eq!(stored(&panel, StateKey::OffList).as_deref(), Some("7"));
    }

    #[tokio::test]
    async fn should_store_level_when_valid() {
        let mut panel = open(&[(StateKey::OnList, "7,8")]).await;

        panel.set_level(ListKind::On, 1, "0").await.unwrap();

        assert_eq!(stored(&panel, StateKey::OnList).as_deref(), Some("7,8=0"));
    }

    #[tokio::test]
    async fn should_return_not_found_when_level_row_missing() {
        let mut panel = open(&[(StateKey::OnList, "7")]).await;

        let result = panel.set_level(ListKind::On, 3, "50").await;

        assert!(matches!(result, Err(DelayLightError::NotFound(_))));
    }

    #[tokio::test]
    async fn should_persist_delay_without_marking_modified_when_timer() {
        let mut panel = open(&[]).await;

        let result = panel.set_delay(DelayField::Auto, " 120 ").await.unwrap();

        assert_eq!(result.status, FieldStatus::Accepted);
        assert!(!result.edit.config_modified);
        assert!(!panel.is_modified());
        assert_eq!(stored(&panel, StateKey::AutoDelay).as_deref(), Some("120"));
    }

    #[tokio::test]
    async fn should_mark_modified_on_delay_edit_when_classic() {
        let mut panel = open_classic(&[]).await;

        let result = panel.set_delay(DelayField::Manual, "600").await.unwrap();

        assert!(result.edit.config_modified);
        assert!(panel.is_modified());
    }

    #[tokio::test]
    async fn should_flag_delay_and_write_nothing_when_invalid() {
        let mut panel = open(&[(StateKey::OnDelay, "5")]).await;

        let result = panel.set_delay(DelayField::On, "-3").await.unwrap();

        assert!(matches!(
            result.status,
            FieldStatus::Flagged(ValidationError::InvalidDelay { .. })
        ));
        assert!(result.edit.persisted.is_empty());
        assert!(panel.store().writes().is_empty());
        assert_eq!(panel.config().timing.on_delay, 5);
    }

    #[tokio::test]
    async fn should_persist_hold_on_and_house_modes() {
        let mut panel = open(&[]).await;

        panel
            .set_hold_on(HoldOverMode::WaitForSensorReset)
            .await
            .unwrap();
        panel
            .set_house_modes(HouseModes::new([HouseMode::Away, HouseMode::Home]))
            .await
            .unwrap();

        assert_eq!(stored(&panel, StateKey::HoldOn).as_deref(), Some("1"));
        assert_eq!(stored(&panel, StateKey::HouseModes).as_deref(), Some("1,2"));
    }

    #[tokio::test]
    async fn should_reset_quieting_to_zero_when_invalid() {
        let mut panel = open(&[(StateKey::TriggerQuieting, "30")]).await;

        let result = panel.set_quieting("abc").await.unwrap();

        assert_eq!(result.status, FieldStatus::Reset);
        assert_eq!(
            stored(&panel, StateKey::TriggerQuieting).as_deref(),
            Some("0")
        );
    }

    async fn open_failing(
        pairs: &[(StateKey, &str)],
        allowed: usize,
    ) -> ConfigPanel<InMemoryStateStore> {
        let store = InMemoryStateStore::with(DEVICE, TIMER, pairs).failing_after(allowed);
        ConfigPanel::open(store, DEVICE, PluginVariant::Timer)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn should_keep_stored_triggers_when_write_fails() {
        let mut panel = open_failing(&[(StateKey::Triggers, "12")], 0).await;

        let result = panel.set_triggers(vec![DeviceEntry::new("99")]).await;

        assert!(matches!(result, Err(DelayLightError::Storage(_))));
        assert_eq!(panel.config().triggers, vec![DeviceEntry::new("12")]);
        assert!(!panel.is_modified());
    }

    #[tokio::test]
    async fn should_adopt_only_written_list_when_second_write_fails() {
        let mut panel = open_failing(
            &[(StateKey::Triggers, "12"), (StateKey::InhibitDevices, "40")],
            1,
        )
        .await;

        let result = panel.set_triggers(vec![DeviceEntry::new("40")]).await;

        assert!(result.is_err());
        assert_eq!(panel.config().triggers, vec![DeviceEntry::new("40")]);
        assert_eq!(panel.config().inhibitors, vec![DeviceEntry::new("40")]);
        assert_eq!(stored(&panel, StateKey::InhibitDevices).as_deref(), Some("40"));
        assert!(panel.is_modified());
    }

    #[tokio::test]
    async fn should_keep_stored_delay_when_write_fails() {
        let mut panel = open_failing(&[(StateKey::AutoDelay, "90")], 0).await;

        let result = panel.set_delay(DelayField::Auto, "300").await;

        assert!(result.is_err());
        assert_eq!(panel.config().timing.auto_delay, 90);
    }

    #[tokio::test]
    async fn should_keep_scene_cache_when_write_fails() {
        let mut panel = open_failing(&[(StateKey::OnList, "S4")], 0).await;
        let cache = SceneCache::new(FakeSceneSource::with(&[4]));

        let result = panel.refresh_scene_cache(&cache).await;

        assert!(result.is_err());
        assert!(panel.config().scene_data.is_empty());
        assert_eq!(panel.missing_scenes(), vec![SceneId::new(4)]);
    }

    #[tokio::test]
    async fn should_fetch_and_persist_scenes_on_refresh() {
        let mut panel = open(&[
            (StateKey::OnList, "S4"),
            (StateKey::SceneData, r#"{"9":{"id":9}}"#),
        ])
        .await;
        let cache = SceneCache::new(FakeSceneSource::with(&[4]));

        let report = panel.refresh_scene_cache(&cache).await.unwrap();

        assert_eq!(report.fetched, vec![SceneId::new(4)]);
        assert_eq!(report.pruned, 1);
        assert_eq!(
            stored(&panel, StateKey::SceneData).as_deref(),
            Some(r#"{"4":{"id":4}}"#)
        );
        assert!(panel.missing_scenes().is_empty());
    }

    #[tokio::test]
    async fn should_request_reload_on_close_when_modified() {
        let mut panel = open(&[]).await;
        panel
            .set_triggers(vec![DeviceEntry::new("12")])
            .await
            .unwrap();

        let outcome = panel.close(true).await.unwrap();

        assert!(outcome.reload_requested);
        assert_eq!(panel.store().reloads(), vec![DEVICE]);
        assert!(!panel.is_modified());
    }

    #[tokio::test]
    async fn should_not_request_reload_on_close_when_untouched() {
        let mut panel = open(&[]).await;
        panel.set_delay(DelayField::Auto, "30").await.unwrap();

        let outcome = panel.close(true).await.unwrap();

        assert!(!outcome.reload_requested);
        assert!(panel.store().reloads().is_empty());
    }

    #[tokio::test]
    async fn should_clear_modified_flag_when_reload_declined() {
        let mut panel = open(&[]).await;
        panel
            .set_triggers(vec![DeviceEntry::new("12")])
            .await
            .unwrap();

        let outcome = panel.close(false).await.unwrap();

        assert!(outcome.reload_requested);
        assert!(panel.store().reloads().is_empty());
        assert!(!panel.close(true).await.unwrap().reload_requested);
    }
}
