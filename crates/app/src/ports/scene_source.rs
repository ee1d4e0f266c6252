//! Scene source port: scene detail from the host's data endpoint.

use std::future::Future;

use delaylight_domain::error::DelayLightError;
use delaylight_domain::id::SceneId;

/// Fetches the full detail of one scene, as an opaque JSON document.
pub trait SceneSource {
    fn fetch_scene(
        &self,
        id: SceneId,
    ) -> impl Future<Output = Result<serde_json::Value, DelayLightError>> + Send;
}
