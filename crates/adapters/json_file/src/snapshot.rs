//! Host snapshot: an exported copy of the host's devices, rooms and scenes.
//!
//! Implements [`DeviceDirectory`] for menu building and [`SceneSource`] for
//! the scene cache. Scene detail comes from the `scene_detail` map when the
//! export has it, otherwise from the scene's directory record.

use std::collections::BTreeMap;
use std::future::Future;
use std::path::Path;

use serde::{Deserialize, Serialize};

use delaylight_app::ports::{DeviceDirectory, SceneSource};
use delaylight_domain::device::DeviceRecord;
use delaylight_domain::error::DelayLightError;
use delaylight_domain::id::{DeviceNum, SceneId};
use delaylight_domain::room::{Room, SceneRecord};

use crate::error::FileStoreError;

/// Devices, rooms and scenes as exported from the host.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HostSnapshot {
    #[serde(default)]
    pub devices: Vec<DeviceRecord>,
    #[serde(default)]
    pub rooms: Vec<Room>,
    #[serde(default)]
    pub scenes: Vec<SceneRecord>,
    /// Full scene documents keyed by scene id.
    #[serde(default)]
    pub scene_detail: BTreeMap<String, serde_json::Value>,
}

impl HostSnapshot {
    /// Load a snapshot file. A missing file yields an empty snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`FileStoreError`] when the file exists but cannot be read or
    /// is not a valid snapshot.
    pub async fn load(path: &Path) -> Result<Self, FileStoreError> {
        let raw = match tokio::fs::read_to_string(path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(path = %path.display(), "host snapshot not found, using empty directory");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(FileStoreError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        let snapshot: Self = serde_json::from_str(&raw).map_err(|source| FileStoreError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(
            devices = snapshot.devices.len(),
            rooms = snapshot.rooms.len(),
            scenes = snapshot.scenes.len(),
            "host snapshot loaded"
        );
        Ok(snapshot)
    }

    fn scene_document(&self, id: SceneId) -> Result<serde_json::Value, FileStoreError> {
        if let Some(detail) = self.scene_detail.get(&id.to_string()) {
            return Ok(detail.clone());
        }
        let record = self
            .scenes
            .iter()
            .find(|scene| scene.id == id)
            .ok_or_else(|| FileStoreError::UnknownScene(id.to_string()))?;
        serde_json::to_value(record).map_err(|source| FileStoreError::Json {
            path: "<snapshot>".into(),
            source,
        })
    }
}

impl DeviceDirectory for HostSnapshot {
    fn device(
        &self,
        id: DeviceNum,
    ) -> impl Future<Output = Result<Option<DeviceRecord>, DelayLightError>> + Send {
        let result = self.devices.iter().find(|device| device.id == id).cloned();
        async { Ok(result) }
    }

    fn devices(&self) -> impl Future<Output = Result<Vec<DeviceRecord>, DelayLightError>> + Send {
        let result = self.devices.clone();
        async { Ok(result) }
    }

    fn rooms(&self) -> impl Future<Output = Result<Vec<Room>, DelayLightError>> + Send {
        let result = self.rooms.clone();
        async { Ok(result) }
    }

    fn scenes(&self) -> impl Future<Output = Result<Vec<SceneRecord>, DelayLightError>> + Send {
        let result = self.scenes.clone();
        async { Ok(result) }
    }
}

impl SceneSource for HostSnapshot {
    fn fetch_scene(
        &self,
        id: SceneId,
    ) -> impl Future<Output = Result<serde_json::Value, DelayLightError>> + Send {
        let result = self.scene_document(id).map_err(DelayLightError::from);
        async { result }
    }
}
