//! Small value types attached to actors: display color and velocity.

use glam::Vec3;

/// Velocity of a rigid body.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Velocity {
    pub linear: Vec3,
    pub angular: Vec3,
}

impl Velocity {
    pub fn with_angular(linear: Vec3, angular: Vec3) -> Self {
        Self { linear, angular }
    }
}

/// Linear RGB display color, components in `0..=1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color(pub Vec3);

impl Color {
    pub const BLACK: Self = Self(Vec3::ZERO);
    pub const WHITE: Self = Self(Vec3::ONE);
    /// Neutral grey given to actors that never had a color assigned.
    pub const DEFAULT: Self = Self(Vec3::new(0.8, 0.8, 0.8));

    pub fn new(r: f32, g: f32, b: f32) -> Self {
        Self(Vec3::new(r, g, b))
    }

    /// Build from 8-bit channels (`rgb8(191, 191, 191)` is light grey).
    pub fn rgb8(r: u8, g: u8, b: u8) -> Self {
        Self(Vec3::new(r as f32, g as f32, b as f32) / 255.0)
    }

    pub fn r(&self) -> f32 {
        self.0.x
    }

    pub fn g(&self) -> f32 {
        self.0.y
    }

    pub fn b(&self) -> f32 {
        self.0.z
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl From<Vec3> for Color {
    fn from(rgb: Vec3) -> Self {
        Self(rgb)
    }
}
