//! Shape-layout tables for every object the sandbox scenes place.
//!
//! Pitch dimensions follow a rugby union field: seven lines 100/7 m apart along -Z,
//! goal posts 5.6 m apart on the goal line.

use engine_core::{Pose, Quat, Vec3};
use physics::{ActorKind, CompoundLayout, Geometry};
use std::f32::consts::FRAC_PI_4;

/// Distance between consecutive pitch lines.
pub const LINE_SPACING: f32 = 100.0 / 7.0;

/// Z of the goal line (the sixth pitch line).
pub const GOAL_LINE_Z: f32 = -5.0 * LINE_SPACING;

/// Z of the half-way line.
pub const HALF_WAY_Z: f32 = -3.0 * LINE_SPACING;

fn boxes(kind: ActorKind, half_extents: Vec3, positions: &[Vec3]) -> CompoundLayout {
    positions.iter().fold(CompoundLayout::new(kind), |layout, p| {
        layout.with_part(
            Geometry::cuboid(half_extents.x, half_extents.y, half_extents.z),
            Pose::from_position(*p),
        )
    })
}

/// Single-shape layout at the actor origin.
pub fn single(kind: ActorKind, geometry: Geometry) -> CompoundLayout {
    CompoundLayout::new(kind).with_part(geometry, Pose::IDENTITY)
}

/// Two unit boxes side by side.
pub fn compound_pair() -> CompoundLayout {
    boxes(
        ActorKind::Dynamic,
        Vec3::splat(0.5),
        &[Vec3::new(0.0, 1.0, 0.0), Vec3::new(2.0, 1.0, 0.0)],
    )
}

/// Two 13 m uprights standing on the goal line.
pub fn goal_posts() -> CompoundLayout {
    boxes(
        ActorKind::Static,
        Vec3::new(0.5, 13.0, 0.5),
        &[
            Vec3::new(-2.3, 13.0, GOAL_LINE_Z),
            Vec3::new(2.3, 13.0, GOAL_LINE_Z),
        ],
    )
}

pub fn goal_crossbar() -> CompoundLayout {
    boxes(
        ActorKind::Static,
        Vec3::new(2.5, 0.5, 0.5),
        &[Vec3::new(0.0, 3.0, GOAL_LINE_Z)],
    )
}

/// The seven lines across the pitch, sunk just below the ground plane.
pub fn inner_pitch_lines() -> CompoundLayout {
    let positions: Vec<Vec3> = (0..7)
        .map(|i| Vec3::new(0.0, -0.49, -(i as f32) * LINE_SPACING))
        .collect();
    boxes(ActorKind::Static, Vec3::new(70.0, 0.5, 0.5), &positions)
}

pub fn outer_pitch_lines() -> CompoundLayout {
    boxes(
        ActorKind::Static,
        Vec3::new(0.5, 0.5, 45.0),
        &[Vec3::new(70.0, -0.49, -40.0), Vec3::new(-70.0, -0.49, -40.0)],
    )
}

/// Walls behind both dead-ball lines.
pub fn inner_barrier_lines() -> CompoundLayout {
    boxes(
        ActorKind::Static,
        Vec3::new(71.0, 25.0, 2.0),
        &[
            Vec3::new(0.0, 25.0, 20.0),
            Vec3::new(0.0, 25.0, -6.35 * LINE_SPACING),
        ],
    )
}

/// Walls along both touch lines.
pub fn outer_barrier_lines() -> CompoundLayout {
    boxes(
        ActorKind::Static,
        Vec3::new(0.5, 25.0, 55.0),
        &[Vec3::new(71.0, 25.0, -34.0), Vec3::new(-71.0, 25.0, -34.0)],
    )
}

/// Elongated ball approximated by five spheres along X, largest in the middle.
pub fn rugby_ball() -> CompoundLayout {
    [(0.40, 0.0), (0.30, 0.2), (0.30, -0.2), (0.20, 0.4), (0.20, -0.4)]
        .into_iter()
        .fold(CompoundLayout::new(ActorKind::Dynamic), |layout, (radius, x)| {
            layout.with_part(Geometry::sphere(radius), Pose::at(x, 0.0, 0.0))
        })
}

/// Launch arm: a long board, a cup plate and a 45 degree backstop.
pub fn ball_catapult() -> CompoundLayout {
    CompoundLayout::new(ActorKind::Dynamic)
        .with_part(Geometry::cuboid(0.5, 0.1, 3.0), Pose::IDENTITY)
        .with_part(Geometry::cuboid(1.0, 0.1, 1.0), Pose::at(0.0, 0.0, 3.5))
        .with_part(
            Geometry::cuboid(1.0, 0.75, 0.1),
            Pose::from_position_rotation(
                Vec3::new(0.0, 0.5, 5.0),
                Quat::from_rotation_x(FRAC_PI_4),
            ),
        )
}

/// Handle, cross bar and four tines.
pub fn pitchfork() -> CompoundLayout {
    let tine = |x: f32| (Geometry::cuboid(0.1, 0.2, 0.5), Pose::at(x, 0.0, -2.5));
    let parts = [
        (Geometry::cuboid(0.15, 0.2, 2.0), Pose::IDENTITY),
        (Geometry::cuboid(0.75, 0.2, 0.1), Pose::at(0.0, 0.0, -2.0)),
        tine(0.75),
        tine(-0.75),
        tine(0.25),
        tine(-0.25),
    ];
    parts
        .into_iter()
        .fold(CompoundLayout::new(ActorKind::Dynamic), |layout, (g, p)| {
            layout.with_part(g, p)
        })
}

/// Grip above a thicker head.
pub fn truncheon() -> CompoundLayout {
    CompoundLayout::new(ActorKind::Dynamic)
        .with_part(Geometry::cuboid(0.2, 0.5, 0.2), Pose::IDENTITY)
        .with_part(Geometry::cuboid(0.25, 0.5, 0.25), Pose::at(0.0, -1.0, 0.0))
}

pub fn swing_posts() -> CompoundLayout {
    boxes(
        ActorKind::Static,
        Vec3::new(0.5, 4.0, 0.5),
        &[Vec3::new(-3.0, 4.0, 0.0), Vec3::new(3.0, 4.0, 0.0)],
    )
}

pub fn swing_top_bar() -> CompoundLayout {
    boxes(
        ActorKind::Static,
        Vec3::new(2.5, 0.5, 0.5),
        &[Vec3::new(0.0, 7.5, 0.0)],
    )
}

/// Ten 4 m tall figures in a row, 2 m apart, on one body.
pub fn knights() -> CompoundLayout {
    let positions: Vec<Vec3> = [0.0, -2.0, -4.0, -6.0, -8.0, 2.0, 4.0, 6.0, 8.0, 10.0]
        .into_iter()
        .map(|x| Vec3::new(x, 1.0, 0.0))
        .collect();
    boxes(ActorKind::Dynamic, Vec3::new(0.5, 2.0, 0.5), &positions)
}

/// Square pyramid point cloud, fed to the convex cooker.
pub fn pyramid_points() -> Vec<Vec3> {
    vec![
        Vec3::new(0.0, 1.0, 0.0),
        Vec3::new(1.0, 0.0, 0.0),
        Vec3::new(-1.0, 0.0, 0.0),
        Vec3::new(0.0, 0.0, 1.0),
        Vec3::new(0.0, 0.0, -1.0),
    ]
}

/// Inclined quad made of two triangles, fed to the triangle-mesh cooker.
pub fn ramp_mesh() -> (Vec<Vec3>, Vec<u32>) {
    let vertices = vec![
        Vec3::new(-2.0, 0.0, 0.0),
        Vec3::new(2.0, 0.0, 0.0),
        Vec3::new(-2.0, 1.5, -4.0),
        Vec3::new(2.0, 1.5, -4.0),
    ];
    let indices = vec![0, 1, 2, 2, 1, 3];
    (vertices, indices)
}
