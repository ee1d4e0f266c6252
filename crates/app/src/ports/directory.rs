//! Device directory port: read-only view of the host's devices, rooms and scenes.

use std::future::Future;

use delaylight_domain::device::DeviceRecord;
use delaylight_domain::error::DelayLightError;
use delaylight_domain::id::DeviceNum;
use delaylight_domain::room::{Room, SceneRecord};

/// Lookup of host records used to build menus and resolve labels.
pub trait DeviceDirectory {
    /// Get a device by number.
    fn device(
        &self,
        id: DeviceNum,
    ) -> impl Future<Output = Result<Option<DeviceRecord>, DelayLightError>> + Send;

    /// Get all devices.
    fn devices(&self) -> impl Future<Output = Result<Vec<DeviceRecord>, DelayLightError>> + Send;

    /// Get all rooms. "No Room" may be omitted; it is implied.
    fn rooms(&self) -> impl Future<Output = Result<Vec<Room>, DelayLightError>> + Send;

    /// Get all scenes.
    fn scenes(&self) -> impl Future<Output = Result<Vec<SceneRecord>, DelayLightError>> + Send;
}
