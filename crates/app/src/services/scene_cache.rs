//! Scene cache: keeps the `SceneData` blob in step with the on/off lists.
//!
//! The backend runs scenes from this cached detail rather than asking the
//! host at trigger time, so every scene referenced by an on/off list should
//! have an entry. Fetch failures are logged and skipped; the next refresh
//! retries them.

use delaylight_domain::device_list::DeviceEntry;
use delaylight_domain::id::SceneId;
use delaylight_domain::scene_data::SceneData;

use crate::ports::SceneSource;

/// What a [`SceneCache::refresh`] did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SceneRefresh {
    /// Scenes fetched and added to the cache.
    pub fetched: Vec<SceneId>,
    /// Scenes that could not be fetched and are absent from the cache.
    pub failed: Vec<SceneId>,
    /// Number of cached scenes dropped because nothing references them.
    pub pruned: usize,
}

impl SceneRefresh {
    /// Whether the cache content changed and needs persisting.
    #[must_use]
    pub fn changed(&self) -> bool {
        !self.fetched.is_empty() || self.pruned > 0
    }
}

/// Scene ids referenced by the on and off lists, first occurrence order.
#[must_use]
pub fn referenced_scenes(on: &[DeviceEntry], off: &[DeviceEntry]) -> Vec<SceneId> {
    let mut ids: Vec<SceneId> = Vec::new();
    for id in on.iter().chain(off).filter_map(DeviceEntry::scene_id) {
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    ids
}

/// Application service that fills the scene cache from a [`SceneSource`].
pub struct SceneCache<C> {
    source: C,
}

impl<C: SceneSource> SceneCache<C> {
    /// Create a new cache service fetching through `source`.
    pub fn new(source: C) -> Self {
        Self { source }
    }

    /// Bring `data` in line with the scenes referenced by `on` and `off`.
    ///
    /// Cached scenes are not fetched again. Unreferenced ones are pruned.
    #[tracing::instrument(skip_all)]
    pub async fn refresh(
        &self,
        data: &mut SceneData,
        on: &[DeviceEntry],
        off: &[DeviceEntry],
    ) -> SceneRefresh {
        let referenced = referenced_scenes(on, off);
        let mut report = SceneRefresh {
            pruned: data.retain_scenes(&referenced),
            ..SceneRefresh::default()
        };

        for id in referenced {
            if data.contains(id) {
                continue;
            }
            match self.source.fetch_scene(id).await {
                Ok(detail) => {
                    data.insert(id, detail);
                    report.fetched.push(id);
                }
                Err(err) => {
                    tracing::warn!(%err, scene = %id, "failed to load scene");
                    report.failed.push(id);
                }
            }
        }

        if report.changed() {
            tracing::debug!(
                fetched = report.fetched.len(),
                pruned = report.pruned,
                "scene cache updated"
            );
        }
        report
    }
}
