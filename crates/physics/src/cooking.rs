//! Mesh cooking: raw vertex/index buffers in, kernel-ready mesh handles out.
//!
//! Hull generation and BVH building happen inside parry. This module only validates
//! what it hands over and turns every kernel rejection into `PhysicsError::Cooking`.
//! A failed cook never falls back to a simpler shape.

use crate::error::{PhysicsError, Result};
use crate::physics_world::to_point;
use engine_core::Vec3;
use rapier3d::parry::transformation::try_convex_hull;
use rapier3d::prelude::*;
use std::fmt;

/// What kind of shape a cooked mesh can back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshKind {
    Convex,
    Triangle,
}

/// Opaque cooked mesh. Cloning shares the kernel data, it never copies it.
#[derive(Clone)]
pub struct CookedMesh {
    kind: MeshKind,
    shape: SharedShape,
    vertex_count: usize,
    triangle_count: usize,
}

impl CookedMesh {
    pub fn kind(&self) -> MeshKind {
        self.kind
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    pub fn triangle_count(&self) -> usize {
        self.triangle_count
    }

    pub(crate) fn shared_shape(&self) -> SharedShape {
        self.shape.clone()
    }

    /// Whether both handles refer to the same cooked kernel data.
    pub fn ptr_eq(&self, other: &CookedMesh) -> bool {
        std::sync::Arc::ptr_eq(&self.shape.0, &other.shape.0)
    }
}

impl fmt::Debug for CookedMesh {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CookedMesh")
            .field("kind", &self.kind)
            .field("vertex_count", &self.vertex_count)
            .field("triangle_count", &self.triangle_count)
            .finish()
    }
}

/// Prepares convex and triangle meshes for use by shapes.
#[derive(Debug, Clone)]
pub struct MeshCooker {
    vertex_limit: usize,
}

impl Default for MeshCooker {
    fn default() -> Self {
        Self::new()
    }
}

impl MeshCooker {
    /// Maximum hull vertex count accepted for convex meshes.
    pub const DEFAULT_VERTEX_LIMIT: usize = 256;

    pub fn new() -> Self {
        Self {
            vertex_limit: Self::DEFAULT_VERTEX_LIMIT,
        }
    }

    pub fn with_vertex_limit(vertex_limit: usize) -> Self {
        Self { vertex_limit }
    }

    pub fn vertex_limit(&self) -> usize {
        self.vertex_limit
    }

    /// Compute the convex hull of `vertices` and bake it into a convex mesh.
    pub fn cook_convex(&self, vertices: &[Vec3]) -> Result<CookedMesh> {
        if vertices.len() < 4 {
            return Err(PhysicsError::cooking(format!(
                "convex mesh needs at least 4 points, got {}",
                vertices.len()
            )));
        }
        ensure_finite(vertices)?;
        if !spans_volume(vertices) {
            return Err(PhysicsError::cooking(
                "convex mesh points are degenerate (coplanar, collinear or coincident)",
            ));
        }

        let points: Vec<Point<Real>> = vertices.iter().map(|v| to_point(*v)).collect();
        let (hull_points, hull_indices) = try_convex_hull(&points)
            .map_err(|err| PhysicsError::cooking(format!("convex hull failed: {err}")))?;

        if hull_points.len() > self.vertex_limit {
            return Err(PhysicsError::cooking(format!(
                "convex hull has {} vertices, limit is {}",
                hull_points.len(),
                self.vertex_limit
            )));
        }

        let vertex_count = hull_points.len();
        let triangle_count = hull_indices.len();
        let shape = SharedShape::convex_mesh(hull_points, &hull_indices)
            .ok_or_else(|| PhysicsError::cooking("convex hull is not a closed manifold"))?;

        log::debug!("cooked convex mesh: {vertex_count} hull vertices, {triangle_count} faces");
        Ok(CookedMesh {
            kind: MeshKind::Convex,
            shape,
            vertex_count,
            triangle_count,
        })
    }

    /// Bake a triangle soup. `indices` holds one triple per triangle.
    pub fn cook_triangle_mesh(&self, vertices: &[Vec3], indices: &[u32]) -> Result<CookedMesh> {
        if indices.len() % 3 != 0 {
            return Err(PhysicsError::invalid(
                "cook_triangle_mesh",
                format!(
                    "index count {} is not a multiple of 3",
                    indices.len()
                ),
            ));
        }
        if indices.is_empty() {
            return Err(PhysicsError::cooking("triangle mesh has no triangles"));
        }
        ensure_finite(vertices)?;
        if let Some(bad) = indices.iter().find(|&&i| i as usize >= vertices.len()) {
            return Err(PhysicsError::cooking(format!(
                "index {bad} out of range for {} vertices",
                vertices.len()
            )));
        }

        let points: Vec<Point<Real>> = vertices.iter().map(|v| to_point(*v)).collect();
        let triangles: Vec<[u32; 3]> = indices
            .chunks_exact(3)
            .map(|t| [t[0], t[1], t[2]])
            .collect();
        let triangle_count = triangles.len();
        let shape = SharedShape::trimesh(points, triangles);

        log::debug!(
            "cooked triangle mesh: {} vertices, {triangle_count} triangles",
            vertices.len()
        );
        Ok(CookedMesh {
            kind: MeshKind::Triangle,
            shape,
            vertex_count: vertices.len(),
            triangle_count,
        })
    }
}

fn ensure_finite(vertices: &[Vec3]) -> Result<()> {
    match vertices.iter().position(|v| !v.is_finite()) {
        Some(i) => Err(PhysicsError::cooking(format!(
            "vertex {i} has a non-finite coordinate"
        ))),
        None => Ok(()),
    }
}

/// True if the points enclose a non-zero volume, relative to their own extent.
fn spans_volume(points: &[Vec3]) -> bool {
    const EPS: f32 = 1.0e-6;

    let a = points[0];
    let Some(b) = farthest(points, |p| (p - a).length_squared()) else {
        return false;
    };
    let extent = (b - a).length();
    if extent <= EPS {
        return false;
    }

    let ab = b - a;
    let Some(c) = farthest(points, |p| ab.cross(p - a).length_squared()) else {
        return false;
    };
    let normal = ab.cross(c - a);
    if normal.length() <= EPS * extent * extent {
        return false;
    }

    let tolerance = EPS * extent * extent * extent;
    points.iter().any(|p| normal.dot(*p - a).abs() > tolerance)
}

fn farthest(points: &[Vec3], metric: impl Fn(Vec3) -> f32) -> Option<Vec3> {
    points
        .iter()
        .copied()
        .max_by(|x, y| metric(*x).total_cmp(&metric(*y)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cube_corners() -> Vec<Vec3> {
        let mut v = Vec::new();
        for x in [-0.5, 0.5] {
            for y in [-0.5, 0.5] {
                for z in [-0.5, 0.5] {
                    v.push(Vec3::new(x, y, z));
                }
            }
        }
        v
    }

    #[test]
    fn convex_hull_drops_interior_points() {
        let mut points = cube_corners();
        points.push(Vec3::ZERO);
        points.push(Vec3::new(0.1, -0.2, 0.05));
        let mesh = MeshCooker::new().cook_convex(&points).unwrap();
        assert_eq!(mesh.kind(), MeshKind::Convex);
        assert_eq!(mesh.vertex_count(), 8);
    }

    #[test]
    fn coplanar_points_fail_to_cook() {
        let points = [
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(1.0, 0.0, 1.0),
        ];
        let err = MeshCooker::new().cook_convex(&points).unwrap_err();
        assert!(matches!(err, PhysicsError::Cooking { .. }));
    }

    #[test]
    fn too_few_points_fail_to_cook() {
        let err = MeshCooker::new().cook_convex(&[Vec3::ZERO, Vec3::X]).unwrap_err();
        assert!(matches!(err, PhysicsError::Cooking { .. }));
    }

    #[test]
    fn vertex_limit_is_enforced() {
        let err = MeshCooker::with_vertex_limit(4)
            .cook_convex(&cube_corners())
            .unwrap_err();
        assert!(matches!(err, PhysicsError::Cooking { .. }));
    }

    #[test]
    fn triangle_indices_must_come_in_triples() {
        let vertices = [Vec3::ZERO, Vec3::X, Vec3::Z];
        let err = MeshCooker::new()
            .cook_triangle_mesh(&vertices, &[0, 1, 2, 0])
            .unwrap_err();
        assert!(err.is_invalid_parameter());
    }

    #[test]
    fn triangle_index_out_of_range_fails_to_cook() {
        let vertices = [Vec3::ZERO, Vec3::X, Vec3::Z];
        let err = MeshCooker::new()
            .cook_triangle_mesh(&vertices, &[0, 1, 3])
            .unwrap_err();
        assert!(matches!(err, PhysicsError::Cooking { .. }));
    }

    #[test]
    fn triangle_mesh_counts() {
        let vertices = [Vec3::ZERO, Vec3::X, Vec3::Z, Vec3::new(1.0, 0.0, 1.0)];
        let mesh = MeshCooker::new()
            .cook_triangle_mesh(&vertices, &[0, 2, 1, 1, 2, 3])
            .unwrap();
        assert_eq!(mesh.kind(), MeshKind::Triangle);
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.triangle_count(), 2);
        assert!(mesh.ptr_eq(&mesh.clone()));
    }
}
