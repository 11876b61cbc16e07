//! Compound actors built from shape-layout tables.
//!
//! Every multi-shape object is plain data: a list of geometries with their local poses.
//! One constructor turns any layout into an actor, so new objects need a table, not a type.

use crate::actor::{Actor, ActorKind};
use crate::error::Result;
use crate::material::MaterialRef;
use crate::physics_world::PhysicsWorld;
use crate::shape::Geometry;
use engine_core::Pose;

/// One shape of a compound, relative to the actor frame.
#[derive(Debug, Clone)]
pub struct ShapeLayout {
    pub geometry: Geometry,
    pub local_pose: Pose,
}

impl ShapeLayout {
    pub fn new(geometry: Geometry, local_pose: Pose) -> Self {
        Self {
            geometry,
            local_pose,
        }
    }
}

/// Ordered shape table for a compound actor.
#[derive(Debug, Clone)]
pub struct CompoundLayout {
    pub kind: ActorKind,
    pub parts: Vec<ShapeLayout>,
}

impl CompoundLayout {
    pub fn new(kind: ActorKind) -> Self {
        Self {
            kind,
            parts: Vec::new(),
        }
    }

    pub fn with_part(mut self, geometry: Geometry, local_pose: Pose) -> Self {
        self.parts.push(ShapeLayout::new(geometry, local_pose));
        self
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

impl Actor {
    /// Build an actor from `layout`.
    ///
    /// All shapes are created first, then posed by index, then the mass is integrated
    /// at `density` for dynamic layouts. If any step fails, the partially built body is
    /// released and the error returned.
    pub fn from_layout(
        world: &mut PhysicsWorld,
        layout: &CompoundLayout,
        pose: &Pose,
        material: &MaterialRef,
        density: f32,
    ) -> Result<Actor> {
        let mut actor = Actor::new(world, layout.kind, pose);
        match actor.assemble(world, layout, material, density) {
            Ok(()) => Ok(actor),
            Err(err) => {
                log::warn!("compound build aborted: {err}");
                actor.release(world);
                Err(err)
            }
        }
    }

    fn assemble(
        &mut self,
        world: &mut PhysicsWorld,
        layout: &CompoundLayout,
        material: &MaterialRef,
        density: f32,
    ) -> Result<()> {
        for part in &layout.parts {
            self.create_shape(world, part.geometry.clone(), material, Some(density))?;
        }
        for (index, part) in layout.parts.iter().enumerate() {
            self.set_local_pose(world, index, &part.local_pose)?;
        }
        if self.is_dynamic() {
            self.recompute_mass_and_inertia(world, density)?;
        }
        Ok(())
    }
}
