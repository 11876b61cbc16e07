//! Kernel context: every Rapier3D set and pipeline a scene needs, owned in one place.
//!
//! Nothing in this crate keeps kernel state in globals. A `Scene` owns exactly one
//! `PhysicsWorld` and lends it to actors, joints and the cooker by reference.

use engine_core::{Pose, Quat, Vec3};
use rapier3d::na::{Quaternion, Translation3, UnitQuaternion};
use rapier3d::prelude::*;
use std::sync::atomic::{AtomicU32, Ordering};

static NEXT_WORLD_ID: AtomicU32 = AtomicU32::new(0);

/// Distinguishes kernel contexts, so a body handle is never looked up in the wrong one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WorldId(u32);

/// Which kind of kernel body to create.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    Static,
    Dynamic,
}

/// Main physics world containing all simulation state.
pub struct PhysicsWorld {
    id: WorldId,
    pub rigid_body_set: RigidBodySet,
    pub collider_set: ColliderSet,
    pub gravity: Vector<Real>,
    pub integration_parameters: IntegrationParameters,
    pub physics_pipeline: PhysicsPipeline,
    pub island_manager: IslandManager,
    pub broad_phase: DefaultBroadPhase,
    pub narrow_phase: NarrowPhase,
    pub impulse_joint_set: ImpulseJointSet,
    pub multibody_joint_set: MultibodyJointSet,
    pub ccd_solver: CCDSolver,
    pub query_pipeline: QueryPipeline,
    /// Fixed body at the origin standing in for "the world" as a joint endpoint.
    world_anchor: RigidBodyHandle,
    /// Bodies with user forces to clear once the next step has consumed them.
    forced_bodies: Vec<RigidBodyHandle>,
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl PhysicsWorld {
    /// Create a new physics world with default gravity.
    pub fn new() -> Self {
        let mut rigid_body_set = RigidBodySet::new();
        let world_anchor = rigid_body_set.insert(RigidBodyBuilder::fixed().build());
        Self {
            id: WorldId(NEXT_WORLD_ID.fetch_add(1, Ordering::Relaxed)),
            rigid_body_set,
            collider_set: ColliderSet::new(),
            gravity: vector![0.0, -9.81, 0.0],
            integration_parameters: IntegrationParameters::default(),
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            world_anchor,
            forced_bodies: Vec::new(),
        }
    }

    pub fn id(&self) -> WorldId {
        self.id
    }

    pub fn set_gravity(&mut self, gravity: Vec3) {
        self.gravity = to_vector(gravity);
    }

    pub fn gravity(&self) -> Vec3 {
        from_vector(&self.gravity)
    }

    /// Advance the simulation by `dt` seconds.
    ///
    /// Rapier's pipeline step is synchronous: when this returns every body pose is
    /// committed, which is the blocking fetch-results barrier the scene loop relies on.
    pub fn step(&mut self, dt: f32) {
        self.integration_parameters.dt = dt;
        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &(),
        );
        for handle in self.forced_bodies.drain(..) {
            if let Some(body) = self.rigid_body_set.get_mut(handle) {
                body.reset_forces(false);
            }
        }
    }

    /// Create a body that stays out of the simulation until enabled by a scene.
    pub fn create_body(&mut self, kind: BodyKind, pose: &Pose) -> RigidBodyHandle {
        let builder = match kind {
            BodyKind::Static => RigidBodyBuilder::fixed(),
            BodyKind::Dynamic => RigidBodyBuilder::dynamic(),
        };
        let rigid_body = builder.position(to_isometry(pose)).enabled(false).build();
        self.rigid_body_set.insert(rigid_body)
    }

    /// Include or exclude a body (and its colliders) from simulation.
    pub fn set_body_enabled(&mut self, handle: RigidBodyHandle, enabled: bool) {
        if let Some(body) = self.rigid_body_set.get_mut(handle) {
            body.set_enabled(enabled);
        }
    }

    pub fn is_body_enabled(&self, handle: RigidBodyHandle) -> bool {
        self.rigid_body_set
            .get(handle)
            .map_or(false, |body| body.is_enabled())
    }

    /// Remove a rigid body and its colliders.
    pub fn remove_body(&mut self, handle: RigidBodyHandle) {
        self.rigid_body_set.remove(
            handle,
            &mut self.island_manager,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            true,
        );
    }

    /// Attach a collider to a body.
    pub fn attach_collider(&mut self, body: RigidBodyHandle, collider: Collider) -> ColliderHandle {
        let handle = self
            .collider_set
            .insert_with_parent(collider, body, &mut self.rigid_body_set);
        // A disabled parent only propagates its state on a transition.
        if let Some(rb) = self.rigid_body_set.get_mut(body) {
            if !rb.is_enabled() {
                rb.set_enabled(true);
                rb.set_enabled(false);
            }
        }
        handle
    }

    /// Move a collider relative to its parent body.
    pub fn set_collider_local_pose(&mut self, handle: ColliderHandle, pose: &Pose) {
        if let Some(collider) = self.collider_set.get_mut(handle) {
            collider.set_position_wrt_parent(to_isometry(pose));
        }
    }

    pub fn set_collider_surface(
        &mut self,
        handle: ColliderHandle,
        friction: f32,
        restitution: f32,
    ) {
        if let Some(collider) = self.collider_set.get_mut(handle) {
            collider.set_friction(friction);
            collider.set_restitution(restitution);
        }
    }

    /// Apply one density to every collider of `body` and integrate its mass properties.
    ///
    /// Returns the resulting mass.
    pub fn update_mass_and_inertia(&mut self, body: RigidBodyHandle, density: f32) -> f32 {
        let Some(rb) = self.rigid_body_set.get_mut(body) else {
            return 0.0;
        };
        for handle in rb.colliders() {
            if let Some(collider) = self.collider_set.get_mut(*handle) {
                collider.set_density(density);
            }
        }
        rb.recompute_mass_properties_from_colliders(&self.collider_set);
        self.body_mass(body)
    }

    /// Mass of every collider on `body`, enabled or not.
    ///
    /// Rapier's own total skips disabled colliders, and a detached body's colliders are
    /// disabled by the first step that runs while it is out of the scene.
    pub fn body_mass(&self, body: RigidBodyHandle) -> f32 {
        self.body_mass_properties(body).mass()
    }

    pub fn body_mass_properties(&self, body: RigidBodyHandle) -> MassProperties {
        self.rigid_body_set.get(body).map_or_else(MassProperties::default, |rb| {
            rb.colliders()
                .iter()
                .filter_map(|handle| self.collider_set.get(*handle))
                .map(|collider| {
                    let local = collider
                        .position_wrt_parent()
                        .copied()
                        .unwrap_or_else(Isometry::identity);
                    collider.mass_properties().transform_by(&local)
                })
                .sum()
        })
    }

    /// Total collider volume attached to `body`.
    pub fn body_volume(&self, body: RigidBodyHandle) -> f32 {
        self.rigid_body_set.get(body).map_or(0.0, |rb| {
            rb.colliders()
                .iter()
                .filter_map(|handle| self.collider_set.get(*handle))
                .map(|collider| collider.volume())
                .sum()
        })
    }

    /// Apply a force for the duration of the next step only.
    pub fn add_force(&mut self, handle: RigidBodyHandle, force: Vec3) {
        if let Some(body) = self.rigid_body_set.get_mut(handle) {
            body.add_force(to_vector(force), true);
            if !self.forced_bodies.contains(&handle) {
                self.forced_bodies.push(handle);
            }
        }
    }

    /// Get the committed pose of a rigid body.
    pub fn body_pose(&self, handle: RigidBodyHandle) -> Option<Pose> {
        self.rigid_body_set
            .get(handle)
            .map(|body| from_isometry(body.position()))
    }

    pub fn set_body_pose(&mut self, handle: RigidBodyHandle, pose: &Pose) {
        if let Some(body) = self.rigid_body_set.get_mut(handle) {
            body.set_position(to_isometry(pose), true);
        }
    }

    pub fn body(&self, handle: RigidBodyHandle) -> Option<&RigidBody> {
        self.rigid_body_set.get(handle)
    }

    pub fn body_mut(&mut self, handle: RigidBodyHandle) -> Option<&mut RigidBody> {
        self.rigid_body_set.get_mut(handle)
    }

    /// The body used as endpoint 0 of joints anchored to the world frame.
    pub fn world_anchor(&self) -> RigidBodyHandle {
        self.world_anchor
    }

    pub fn is_sleeping(&self, handle: RigidBodyHandle) -> bool {
        self.rigid_body_set
            .get(handle)
            .map_or(false, |body| body.is_dynamic() && body.is_sleeping())
    }

    /// Wake a sleeping dynamic body. Returns true if it was asleep.
    pub fn wake_up(&mut self, handle: RigidBodyHandle) -> bool {
        match self.rigid_body_set.get_mut(handle) {
            Some(body) if body.is_dynamic() && body.is_sleeping() => {
                body.wake_up(true);
                true
            }
            _ => false,
        }
    }

    /// Insert a joint between two bodies.
    pub fn insert_joint(
        &mut self,
        body1: RigidBodyHandle,
        body2: RigidBodyHandle,
        joint: GenericJoint,
    ) -> ImpulseJointHandle {
        self.impulse_joint_set.insert(body1, body2, joint, true)
    }

    pub fn joint_mut(&mut self, handle: ImpulseJointHandle) -> Option<&mut ImpulseJoint> {
        self.impulse_joint_set.get_mut(handle)
    }

    pub fn joint(&self, handle: ImpulseJointHandle) -> Option<&ImpulseJoint> {
        self.impulse_joint_set.get(handle)
    }

    pub fn remove_joint(&mut self, handle: ImpulseJointHandle) {
        self.impulse_joint_set.remove(handle, true);
    }

    /// Number of bodies in the kernel, including the world anchor.
    pub fn body_count(&self) -> usize {
        self.rigid_body_set.len()
    }

    pub fn collider_count(&self) -> usize {
        self.collider_set.len()
    }
}

pub(crate) fn to_vector(v: Vec3) -> Vector<Real> {
    vector![v.x, v.y, v.z]
}

pub(crate) fn from_vector(v: &Vector<Real>) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

pub(crate) fn to_point(v: Vec3) -> Point<Real> {
    point![v.x, v.y, v.z]
}

pub(crate) fn to_isometry(pose: &Pose) -> Isometry<Real> {
    let p = pose.position;
    let q = pose.rotation;
    Isometry::from_parts(
        Translation3::new(p.x, p.y, p.z),
        UnitQuaternion::from_quaternion(Quaternion::new(q.w, q.x, q.y, q.z)),
    )
}

pub(crate) fn from_isometry(iso: &Isometry<Real>) -> Pose {
    let pos = iso.translation.vector;
    let rot = iso.rotation;
    Pose {
        position: Vec3::new(pos.x, pos.y, pos.z),
        rotation: Quat::from_xyzw(rot.i, rot.j, rot.k, rot.w),
    }
}
