//! Compound-actor scene layer over Rapier3D.
//!
//! Actors carry one or more shapes on a single rigid body, share immutable materials,
//! and are connected by distance or revolute joints. A [`Scene`] owns all of them plus
//! the kernel context and advances time in fixed steps.

pub mod actor;
pub mod compound;
pub mod cooking;
pub mod error;
pub mod joint;
pub mod material;
pub mod physics_world;
pub mod scene;
pub mod shape;

pub use actor::*;
pub use compound::*;
pub use cooking::*;
pub use error::*;
pub use joint::*;
pub use material::*;
pub use physics_world::*;
pub use scene::*;
pub use shape::*;

// Re-export Rapier for downstream crates
pub use rapier3d;

// Re-export common Rapier types
pub use rapier3d::prelude::{ColliderHandle, ImpulseJointHandle, RigidBodyHandle};
