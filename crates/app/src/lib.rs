//! # delaylight-app
//!
//! Application layer: use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement:
//!   - `StateStore`: read/write the plugin device's state variables
//!   - `DeviceDirectory`: host devices, rooms and scenes
//!   - `SceneSource`: scene detail for the scene cache
//! - Provide the use-cases:
//!   - `ConfigPanel`: one editing session over a device's configuration
//!   - `SceneCache`: keep `SceneData` in step with the on/off lists
//!   - `DeviceMenus`: device pickers, labels and list exclusion
//!
//! ## Dependency rule
//! Depends on `delaylight-domain` only. Never imports adapter crates.
//! Adapters depend on *this* crate, not the reverse.

pub mod ports;
pub mod services;

#[cfg(test)]
mod test_support;
