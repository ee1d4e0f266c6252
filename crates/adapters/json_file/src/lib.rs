//! # delaylight-adapter-json-file
//!
//! File-backed adapter for running the configuration panel outside a host
//! controller.
//!
//! ## Responsibilities
//! - `JsonFileStateStore`: implements `StateStore` over a JSON document of
//!   device → service → variable values, plus pending reload requests
//! - `HostSnapshot`: implements `DeviceDirectory` and `SceneSource` from an
//!   exported JSON snapshot of the host's devices, rooms and scenes
//!
//! ## Dependency rule
//! Depends on `delaylight-app` (for port traits) and `delaylight-domain` (for
//! domain types). The `app` and `domain` crates must never reference this
//! adapter.

pub mod error;
pub mod snapshot;
pub mod state_file;

pub use error::FileStoreError;
pub use snapshot::HostSnapshot;
pub use state_file::JsonFileStateStore;
