//! Core math and timing types shared by the scene layer.
//!
//! This crate provides the foundational vocabulary used by the other crates:
//! - `Pose` (position + orientation) for actor and shape frames
//! - `Color` and `Velocity` value types
//! - A fixed-step clock for driving the simulation loop

pub mod components;
pub mod time;
pub mod transform;

pub use components::*;
pub use time::*;
pub use transform::*;

// Re-export commonly used types
pub use glam::{Quat, Vec3};
