//! Rigid poses used for actor world frames, shape local frames and joint frames.

use glam::{Quat, Vec3};

/// A rigid transform: translation followed by rotation, no scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Pose {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    /// Create a pose at the given position with no rotation.
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    /// Create a pose with position and rotation.
    pub fn from_position_rotation(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    /// Shorthand for `from_position(Vec3::new(x, y, z))`.
    pub fn at(x: f32, y: f32, z: f32) -> Self {
        Self::from_position(Vec3::new(x, y, z))
    }

    /// Pose of a plane given by the equation `normal · p + distance = 0`.
    ///
    /// Plane shapes use their local +Y axis as the outward normal, so the rotation maps
    /// +Y onto `normal`. A zero normal falls back to +Y.
    pub fn from_plane(normal: Vec3, distance: f32) -> Self {
        let normal = normal.try_normalize().unwrap_or(Vec3::Y);
        Self {
            position: -normal * distance,
            rotation: Quat::from_rotation_arc(Vec3::Y, normal),
        }
    }

    /// Map a point from this frame into the parent frame.
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.rotation * point + self.position
    }

    /// Whether both poses agree within `epsilon` in position and orientation.
    pub fn abs_diff_eq(&self, other: &Pose, epsilon: f32) -> bool {
        self.position.abs_diff_eq(other.position, epsilon)
            && (self.rotation.abs_diff_eq(other.rotation, epsilon)
                || self.rotation.abs_diff_eq(-other.rotation, epsilon))
    }
}
