//! In-memory port implementations shared by the service tests.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Mutex;

use delaylight_domain::device::DeviceRecord;
use delaylight_domain::error::DelayLightError;
use delaylight_domain::id::{DeviceNum, SceneId};
use delaylight_domain::room::{Room, SceneRecord};
use delaylight_domain::state::StateKey;

use crate::ports::{DeviceDirectory, SceneSource, StateStore};

type Slot = (DeviceNum, &'static str, StateKey);

#[derive(Default)]
pub struct InMemoryStateStore {
    values: Mutex<HashMap<Slot, String>>,
    writes: Mutex<Vec<(StateKey, String)>>,
    reloads: Mutex<Vec<DeviceNum>>,
    writes_allowed: Option<usize>,
}

#[derive(Debug, thiserror::Error)]
#[error("write of {0} rejected")]
struct Rejected(StateKey);

impl InMemoryStateStore {
    pub fn with(device: DeviceNum, service: &'static str, pairs: &[(StateKey, &str)]) -> Self {
        let store = Self::default();
        {
            let mut values = store.values.lock().unwrap();
            for (key, value) in pairs {
                values.insert((device, service, *key), (*value).to_string());
            }
        }
        store
    }

    /// Accept `allowed` writes, then fail every later one.
    pub fn failing_after(mut self, allowed: usize) -> Self {
        self.writes_allowed = Some(allowed);
        self
    }

    pub fn value(&self, device: DeviceNum, service: &'static str, key: StateKey) -> Option<String> {
        self.values
            .lock()
            .unwrap()
            .get(&(device, service, key))
            .cloned()
    }

    pub fn writes(&self) -> Vec<(StateKey, String)> {
        self.writes.lock().unwrap().clone()
    }

    pub fn reloads(&self) -> Vec<DeviceNum> {
        self.reloads.lock().unwrap().clone()
    }
}

impl StateStore for InMemoryStateStore {
    fn get(
        &self,
        device: DeviceNum,
        service: &'static str,
        key: StateKey,
    ) -> impl Future<Output = Result<Option<String>, DelayLightError>> + Send {
        let result = self.value(device, service, key);
        async { Ok(result) }
    }

    fn set(
        &self,
        device: DeviceNum,
        service: &'static str,
        key: StateKey,
        value: String,
        reload: bool,
    ) -> impl Future<Output = Result<(), DelayLightError>> + Send {
        let mut writes = self.writes.lock().unwrap();
        if self.writes_allowed.is_some_and(|allowed| writes.len() >= allowed) {
            let err = DelayLightError::Storage(Box::new(Rejected(key)));
            return std::future::ready(Err(err));
        }
        writes.push((key, value.clone()));
        drop(writes);
        self.values
            .lock()
            .unwrap()
            .insert((device, service, key), value);
        if reload {
            self.reloads.lock().unwrap().push(device);
        }
        std::future::ready(Ok(()))
    }

    fn request_reload(
        &self,
        device: DeviceNum,
    ) -> impl Future<Output = Result<(), DelayLightError>> + Send {
        self.reloads.lock().unwrap().push(device);
        async { Ok(()) }
    }
}

#[derive(Default)]
pub struct InMemoryDirectory {
    pub devices: Vec<DeviceRecord>,
    pub rooms: Vec<Room>,
    pub scenes: Vec<SceneRecord>,
}

impl DeviceDirectory for InMemoryDirectory {
    fn device(
        &self,
        id: DeviceNum,
    ) -> impl Future<Output = Result<Option<DeviceRecord>, DelayLightError>> + Send {
        let result = self.devices.iter().find(|d| d.id == id).cloned();
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

/// Serves the scenes it was given and fails for any other id.
#[derive(Default)]
pub struct FakeSceneSource {
    pub scenes: HashMap<SceneId, serde_json::Value>,
    pub fetched: Mutex<Vec<SceneId>>,
}

impl FakeSceneSource {
    pub fn with(ids: &[u32]) -> Self {
        let scenes = ids
            .iter()
            .map(|&id| (SceneId::new(id), serde_json::json!({ "id": id })))
            .collect();
        Self {
            scenes,
            fetched: Mutex::new(Vec::new()),
        }
    }

    pub fn fetched(&self) -> Vec<SceneId> {
        self.fetched.lock().unwrap().clone()
    }
}

#[derive(Debug, thiserror::Error)]
#[error("scene {0} unavailable")]
struct Unavailable(SceneId);

impl SceneSource for FakeSceneSource {
    fn fetch_scene(
        &self,
        id: SceneId,
    ) -> impl Future<Output = Result<serde_json::Value, DelayLightError>> + Send {
        self.fetched.lock().unwrap().push(id);
        let result = self
            .scenes
            .get(&id)
            .cloned()
            .ok_or_else(|| DelayLightError::Storage(Box::new(Unavailable(id))));
        async { result }
    }
}
