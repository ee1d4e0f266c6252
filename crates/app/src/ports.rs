//! Port definitions: traits that adapters implement.
//!
//! Ports are the boundaries between the panel logic and the host. They are
//! defined here (in `app`) so that both the services and the adapters can
//! depend on them without creating circular dependencies.

pub mod directory;
pub mod scene_source;
pub mod state_store;

pub use directory::DeviceDirectory;
pub use scene_source::SceneSource;
pub use state_store::StateStore;
