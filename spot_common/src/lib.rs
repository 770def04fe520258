//! Spot Common Library
//!
//! Shared types for the SpotMicro controller workspace: configuration
//! loading, the robot configuration schema, joint identities, control
//! input records, sideband message tokens and the PWM driver seam.
//!
//! # Module Structure
//!
//! - [`config`] - Configuration loading traits and the `spot.toml` schema
//! - [`consts`] - System-wide constants (queue sizes, timings, servo limits)
//! - [`joint`] - `JointId` and its leg geometry helpers
//! - [`event`] - `ControlEvent` snapshots from the remote controller
//! - [`messages`] - Motion, abort and status channel messages
//! - [`hal`] - PWM driver trait and error types
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use spot_common::prelude::*;
//!
//! assert_eq!(JointId::LEGS.len(), 12);
//! ```

pub mod config;
pub mod consts;
pub mod event;
pub mod hal;
pub mod joint;
pub mod messages;
pub mod prelude;
