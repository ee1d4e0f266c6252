//! JSON file implementation of [`StateStore`].
//!
//! The whole document is read on every access and rewritten on every write,
//! through a temporary file and a rename so a crash never leaves it half
//! written. Writes are serialized by an in-process lock.

use std::collections::{BTreeMap, BTreeSet};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use delaylight_app::ports::StateStore;
use delaylight_domain::error::DelayLightError;
use delaylight_domain::id::DeviceNum;
use delaylight_domain::state::StateKey;

use crate::error::FileStoreError;

type Variables = BTreeMap<String, String>;

/// On-disk layout: device number → service id → variable → value.
#[derive(Debug, Default, Serialize, Deserialize)]
struct StateDocument {
    #[serde(default)]
    devices: BTreeMap<String, BTreeMap<String, Variables>>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pending_reload: BTreeSet<u32>,
}

impl StateDocument {
    fn get(&self, device: DeviceNum, service: &str, key: StateKey) -> Option<&String> {
        self.devices
            .get(&device.to_string())
            .and_then(|services| services.get(service))
            .and_then(|vars| vars.get(key.as_str()))
    }

    fn set(&mut self, device: DeviceNum, service: &str, key: StateKey, value: String) {
        self.devices
            .entry(device.to_string())
            .or_default()
            .entry(service.to_string())
            .or_default()
            .insert(key.as_str().to_string(), value);
    }
}

/// File-backed state store.
#[derive(Clone)]
pub struct JsonFileStateStore {
    path: Arc<PathBuf>,
    lock: Arc<Mutex<()>>,
}

impl JsonFileStateStore {
    /// Create a store over `path`. The file is created on the first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Arc::new(path.into()),
            lock: Arc::new(Mutex::new(())),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Devices with a reload requested and not yet acknowledged.
    ///
    /// # Errors
    ///
    /// Returns [`FileStoreError`] when the file cannot be read or parsed.
    pub async fn pending_reloads(&self) -> Result<Vec<DeviceNum>, FileStoreError> {
        let doc = read_document(&self.path).await?;
        Ok(doc.pending_reload.into_iter().map(DeviceNum::new).collect())
    }

    /// Clear a pending reload request, as the host does once it reloaded.
    ///
    /// # Errors
    ///
    /// Returns [`FileStoreError`] when the file cannot be read or written.
    pub async fn acknowledge_reload(&self, device: DeviceNum) -> Result<bool, FileStoreError> {
        let _guard = self.lock.lock().await;
        let mut doc = read_document(&self.path).await?;
        let removed = doc.pending_reload.remove(&device.get());
        if removed {
            write_document(&self.path, &doc).await?;
        }
        Ok(removed)
    }
}

impl StateStore for JsonFileStateStore {
    fn get(
        &self,
        device: DeviceNum,
        service: &'static str,
        key: StateKey,
    ) -> impl Future<Output = Result<Option<String>, DelayLightError>> + Send {
        let path = Arc::clone(&self.path);
        async move {
            let doc = read_document(&path).await?;
            Ok(doc.get(device, service, key).cloned())
        }
    }

    fn set(
        &self,
        device: DeviceNum,
        service: &'static str,
        key: StateKey,
        value: String,
        reload: bool,
    ) -> impl Future<Output = Result<(), DelayLightError>> + Send {
        let path = Arc::clone(&self.path);
        let lock = Arc::clone(&self.lock);
        async move {
            let _guard = lock.lock().await;
            let mut doc = read_document(&path).await?;
            doc.set(device, service, key, value);
            if reload {
                doc.pending_reload.insert(device.get());
            }
            write_document(&path, &doc).await?;
            Ok(())
        }
    }

    fn request_reload(
        &self,
        device: DeviceNum,
    ) -> impl Future<Output = Result<(), DelayLightError>> + Send {
        let path = Arc::clone(&self.path);
        let lock = Arc::clone(&self.lock);
        async move {
            let _guard = lock.lock().await;
            let mut doc = read_document(&path).await?;
            if doc.pending_reload.insert(device.get()) {
                write_document(&path, &doc).await?;
            }
            tracing::info!(%device, path = %path.display(), "reload requested");
            Ok(())
        }
    }
}

async fn read_document(path: &Path) -> Result<StateDocument, FileStoreError> {
    let raw = match tokio::fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Ok(StateDocument::default());
        }
        Err(source) => {
            return Err(FileStoreError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    if raw.trim().is_empty() {
        return Ok(StateDocument::default());
    }
    serde_json::from_str(&raw).map_err(|source| FileStoreError::Json {
        path: path.to_path_buf(),
        source,
    })
}

async fn write_document(path: &Path, doc: &StateDocument) -> Result<(), FileStoreError> {
    let io_err = |source| FileStoreError::Io {
        path: path.to_path_buf(),
        source,
    };
    let json = serde_json::to_string_pretty(doc).map_err(|source| FileStoreError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, json).await.map_err(io_err)?;
    tokio::fs::rename(&tmp, path).await.map_err(io_err)?;
    tracing::trace!(path = %path.display(), "state written");
    Ok(())
}
