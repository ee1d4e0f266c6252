//! # delaylight-domain
//!
//! Pure domain model for the DelayLight configuration panel.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, state keys
//! - **Device list codec** (trigger / inhibit / on / off lists)
//! - **Schedule codec** (active periods)
//! - **Timing** scalars, hold-over mode and house modes
//! - Field-level **validation** of raw form input
//! - Typed **classification** of host device records
//! - The decoded **panel configuration** as a whole
//!
//! ## Dependency rule
//! This crate has **no internal dependencies** and performs no IO.
//! Reading and writing state happens behind the ports in the `app` crate.

pub mod error;
pub mod id;
pub mod state;
pub mod validate;
pub mod variant;

pub mod config;
pub mod device;
pub mod device_list;
pub mod room;
pub mod scene_data;
pub mod schedule;
pub mod timing;
