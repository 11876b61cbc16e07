//! Shape geometry and the per-actor shape record.

use crate::actor::ActorKind;
use crate::cooking::{CookedMesh, MeshKind};
use crate::error::{ensure_positive, PhysicsError, Result};
use crate::material::MaterialRef;
use engine_core::{Pose, Vec3};
use rapier3d::prelude::*;

/// Position of a shape within its actor, assigned in creation order.
pub type ShapeIndex = usize;

/// Density used when a shape is created without one.
pub const DEFAULT_DENSITY: f32 = 1.0;

/// Collision geometry of a single shape, expressed in the shape's local frame.
#[derive(Debug, Clone)]
pub enum Geometry {
    /// Infinite plane whose normal is the local +Y axis. Static actors only.
    Plane,
    Sphere { radius: f32 },
    /// Box given by its half-extents along each local axis.
    Box { half_extents: Vec3 },
    /// Capsule lying along the local X axis; `half_height` is half the length of the
    /// cylindrical section, excluding the caps.
    Capsule { radius: f32, half_height: f32 },
    ConvexMesh(CookedMesh),
    /// Static actors only.
    TriangleMesh(CookedMesh),
}

impl Geometry {
    pub fn sphere(radius: f32) -> Self {
        Self::Sphere { radius }
    }

    pub fn cuboid(hx: f32, hy: f32, hz: f32) -> Self {
        Self::Box {
            half_extents: Vec3::new(hx, hy, hz),
        }
    }

    pub fn capsule(radius: f32, half_height: f32) -> Self {
        Self::Capsule {
            radius,
            half_height,
        }
    }

    /// Short name used in logs and error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Plane => "plane",
            Self::Sphere { .. } => "sphere",
            Self::Box { .. } => "box",
            Self::Capsule { .. } => "capsule",
            Self::ConvexMesh(_) => "convex mesh",
            Self::TriangleMesh(_) => "triangle mesh",
        }
    }

    /// Check dimensions and whether an actor of `kind` may carry this geometry.
    pub fn validate(&self, kind: ActorKind) -> Result<()> {
        const CONTEXT: &str = "create_shape";
        match self {
            Self::Plane | Self::TriangleMesh(_) if kind == ActorKind::Dynamic => {
                return Err(PhysicsError::invalid(
                    CONTEXT,
                    format!("{} shapes are only allowed on static actors", self.name()),
                ));
            }
            _ => {}
        }
        match self {
            Self::Plane => Ok(()),
            Self::Sphere { radius } => ensure_positive(CONTEXT, "sphere radius", *radius),
            Self::Box { half_extents } => {
                ensure_positive(CONTEXT, "box half-extent x", half_extents.x)?;
                ensure_positive(CONTEXT, "box half-extent y", half_extents.y)?;
                ensure_positive(CONTEXT, "box half-extent z", half_extents.z)
            }
            Self::Capsule {
                radius,
                half_height,
            } => {
                ensure_positive(CONTEXT, "capsule radius", *radius)?;
                ensure_positive(CONTEXT, "capsule half-height", *half_height)
            }
            Self::ConvexMesh(mesh) => expect_mesh_kind(mesh, MeshKind::Convex),
            Self::TriangleMesh(mesh) => expect_mesh_kind(mesh, MeshKind::Triangle),
        }
    }

    pub(crate) fn to_shared_shape(&self) -> SharedShape {
        match self {
            Self::Plane => SharedShape::halfspace(Vector::y_axis()),
            Self::Sphere { radius } => SharedShape::ball(*radius),
            Self::Box { half_extents } => {
                SharedShape::cuboid(half_extents.x, half_extents.y, half_extents.z)
            }
            Self::Capsule {
                radius,
                half_height,
            } => SharedShape::capsule_x(*half_height, *radius),
            Self::ConvexMesh(mesh) | Self::TriangleMesh(mesh) => mesh.shared_shape(),
        }
    }
}

fn expect_mesh_kind(mesh: &CookedMesh, expected: MeshKind) -> Result<()> {
    if mesh.kind() != expected {
        return Err(PhysicsError::invalid(
            "create_shape",
            format!("expected a {expected:?} cooked mesh, got {:?}", mesh.kind()),
        ));
    }
    Ok(())
}

/// One shape attached to an actor.
#[derive(Debug, Clone)]
pub struct Shape {
    index: ShapeIndex,
    geometry: Geometry,
    local_pose: Pose,
    material: MaterialRef,
    density: f32,
    collider: ColliderHandle,
}

impl Shape {
    pub(crate) fn new(
        index: ShapeIndex,
        geometry: Geometry,
        material: MaterialRef,
        density: f32,
        collider: ColliderHandle,
    ) -> Self {
        Self {
            index,
            geometry,
            local_pose: Pose::IDENTITY,
            material,
            density,
            collider,
        }
    }

    pub fn index(&self) -> ShapeIndex {
        self.index
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    /// Pose relative to the owning actor.
    pub fn local_pose(&self) -> Pose {
        self.local_pose
    }

    pub fn material(&self) -> &MaterialRef {
        &self.material
    }

    pub fn density(&self) -> f32 {
        self.density
    }

    pub fn collider(&self) -> ColliderHandle {
        self.collider
    }

    pub(crate) fn set_local_pose(&mut self, pose: Pose) {
        self.local_pose = pose;
    }

    pub(crate) fn set_material(&mut self, material: MaterialRef) {
        self.material = material;
    }

    pub(crate) fn set_density(&mut self, density: f32) {
        self.density = density;
    }
}
