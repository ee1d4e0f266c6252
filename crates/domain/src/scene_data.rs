//! Cached scene detail, persisted as a JSON object keyed by scene id.
//!
//! The blob is opaque to the codecs. Only the keys are interpreted.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::id::SceneId;

/// Scene detail keyed by the scene id string (`"42"`, not `"S42"`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SceneData(BTreeMap<String, serde_json::Value>);

impl SceneData {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn contains(&self, id: SceneId) -> bool {
        self.0.contains_key(&id.to_string())
    }

    #[must_use]
    pub fn get(&self, id: SceneId) -> Option<&serde_json::Value> {
        self.0.get(&id.to_string())
    }

    pub fn insert(&mut self, id: SceneId, detail: serde_json::Value) {
        self.0.insert(id.to_string(), detail);
    }

    /// Drop every scene not in `keep`. Returns how many were removed.
    pub fn retain_scenes(&mut self, keep: &[SceneId]) -> usize {
        let before = self.0.len();
        self.0
            .retain(|key, _| keep.iter().any(|id| id.to_string() == *key));
        before - self.0.len()
    }

    /// Decode the persisted blob. An empty or unparseable value yields an
    /// empty cache so it is simply rebuilt.
    #[must_use]
    pub fn decode(s: &str) -> Self {
        if s.trim().is_empty() {
            return Self::default();
        }
        serde_json::from_str(s).unwrap_or_default()
    }

    /// Encode for persistence. An empty cache is written as an empty string.
    #[must_use]
    pub fn encode(&self) -> String {
        if self.0.is_empty() {
            return String::new();
        }
        serde_json::to_string(&self.0).unwrap_or_default()
    }
}
