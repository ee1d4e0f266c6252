//! State store port: the host's key/value persistence for device state.

use std::future::Future;

use delaylight_domain::error::DelayLightError;
use delaylight_domain::id::DeviceNum;
use delaylight_domain::state::StateKey;

/// Per-device state variables, addressed by service id and name.
pub trait StateStore {
    /// Read a variable. `None` when it has never been written.
    fn get(
        &self,
        device: DeviceNum,
        service: &'static str,
        key: StateKey,
    ) -> impl Future<Output = Result<Option<String>, DelayLightError>> + Send;

    /// Write a variable. With `reload`, the host is asked to reload once the
    /// write lands.
    fn set(
        &self,
        device: DeviceNum,
        service: &'static str,
        key: StateKey,
        value: String,
        reload: bool,
    ) -> impl Future<Output = Result<(), DelayLightError>> + Send;

    /// Ask the host to reload so the backend picks up new configuration.
    fn request_reload(
        &self,
        device: DeviceNum,
    ) -> impl Future<Output = Result<(), DelayLightError>> + Send;
}
