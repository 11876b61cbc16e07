//! Actors: one kernel rigid body carrying an ordered list of shapes.
//!
//! An actor is built detached. Its kernel body exists from the start but stays
//! disabled until the actor is added to a `Scene`, so shapes, poses and mass can be
//! set up without anything moving.

use crate::error::{ensure_positive, PhysicsError, Result};
use crate::material::MaterialRef;
use crate::physics_world::{from_vector, to_vector, BodyKind, PhysicsWorld, WorldId};
use crate::shape::{Geometry, Shape, ShapeIndex, DEFAULT_DENSITY};
use engine_core::{Color, Pose, Vec3};
use rapier3d::prelude::*;
use std::fmt;

/// Identifier handed out by a `Scene` when an actor is added.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActorId(u32);

impl ActorId {
    pub(crate) fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "actor#{}", self.0)
    }
}

/// Closed set of actor variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorKind {
    /// Never moves, infinite mass.
    Static,
    /// Simulated: has mass, velocity and a sleep state.
    Dynamic,
}

impl ActorKind {
    fn body_kind(self) -> BodyKind {
        match self {
            Self::Static => BodyKind::Static,
            Self::Dynamic => BodyKind::Dynamic,
        }
    }
}

/// A rigid body and its shapes.
#[derive(Debug)]
pub struct Actor {
    name: String,
    kind: ActorKind,
    world: WorldId,
    body: RigidBodyHandle,
    shapes: Vec<Shape>,
    color: Color,
    mass_stale: bool,
    gravity_disabled: bool,
}

impl Actor {
    pub fn new_static(world: &mut PhysicsWorld, pose: &Pose) -> Self {
        Self::new(world, ActorKind::Static, pose)
    }

    pub fn new_dynamic(world: &mut PhysicsWorld, pose: &Pose) -> Self {
        Self::new(world, ActorKind::Dynamic, pose)
    }

    pub fn new(world: &mut PhysicsWorld, kind: ActorKind, pose: &Pose) -> Self {
        let body = world.create_body(kind.body_kind(), pose);
        let name = match kind {
            ActorKind::Static => "static actor",
            ActorKind::Dynamic => "dynamic actor",
        };
        Self {
            name: name.to_string(),
            kind,
            world: world.id(),
            body,
            shapes: Vec::new(),
            color: Color::DEFAULT,
            mass_stale: false,
            gravity_disabled: false,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ActorKind {
        self.kind
    }

    pub fn is_dynamic(&self) -> bool {
        self.kind == ActorKind::Dynamic
    }

    pub fn body_handle(&self) -> RigidBodyHandle {
        self.body
    }

    /// The kernel context the body lives in.
    pub fn world_id(&self) -> WorldId {
        self.world
    }

    /// Append a shape. The returned index equals the number of shapes already present.
    ///
    /// On a dynamic actor this leaves the mass properties stale until
    /// `recompute_mass_and_inertia` runs again.
    pub fn create_shape(
        &mut self,
        world: &mut PhysicsWorld,
        geometry: Geometry,
        material: &MaterialRef,
        density: Option<f32>,
    ) -> Result<ShapeIndex> {
        geometry.validate(self.kind)?;
        let density = density.unwrap_or(DEFAULT_DENSITY);
        ensure_positive("create_shape", "density", density)?;
        if world.body(self.body).is_none() {
            return Err(self.detached_error("create_shape"));
        }

        let collider = ColliderBuilder::new(geometry.to_shared_shape())
            .friction(material.kernel_friction())
            .restitution(material.restitution())
            .density(density)
            .build();
        let handle = world.attach_collider(self.body, collider);

        let index = self.shapes.len();
        log::debug!("{}: shape {index} is a {}", self.name, geometry.name());
        self.shapes
            .push(Shape::new(index, geometry, material.clone(), density, handle));
        if self.is_dynamic() {
            self.mass_stale = true;
        }
        Ok(index)
    }

    /// Place shape `index` relative to the actor.
    pub fn set_local_pose(
        &mut self,
        world: &mut PhysicsWorld,
        index: ShapeIndex,
        pose: &Pose,
    ) -> Result<()> {
        let count = self.shapes.len();
        let shape = self
            .shapes
            .get_mut(index)
            .ok_or(PhysicsError::IndexOutOfRange { index, count })?;
        world.set_collider_local_pose(shape.collider(), pose);
        shape.set_local_pose(*pose);
        Ok(())
    }

    pub fn shape(&self, index: ShapeIndex) -> Result<&Shape> {
        self.shapes.get(index).ok_or(PhysicsError::IndexOutOfRange {
            index,
            count: self.shapes.len(),
        })
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn shape_count(&self) -> usize {
        self.shapes.len()
    }

    /// Apply `density` to every shape and have the kernel integrate mass and inertia.
    ///
    /// Returns the new mass.
    pub fn recompute_mass_and_inertia(
        &mut self,
        world: &mut PhysicsWorld,
        density: f32,
    ) -> Result<f32> {
        const CONTEXT: &str = "recompute_mass_and_inertia";
        self.require_dynamic(CONTEXT)?;
        ensure_positive(CONTEXT, "density", density)?;
        if world.body(self.body).is_none() {
            return Err(self.detached_error(CONTEXT));
        }

        let mass = world.update_mass_and_inertia(self.body, density);
        for shape in &mut self.shapes {
            shape.set_density(density);
        }
        self.mass_stale = false;
        log::debug!("{}: mass {mass:.3} at density {density}", self.name);
        Ok(mass)
    }

    /// True when shapes were added after the last mass recompute.
    pub fn is_mass_stale(&self) -> bool {
        self.mass_stale
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    /// Switch every shape to `material`.
    pub fn set_material(&mut self, world: &mut PhysicsWorld, material: &MaterialRef) {
        for shape in &mut self.shapes {
            world.set_collider_surface(
                shape.collider(),
                material.kernel_friction(),
                material.restitution(),
            );
            shape.set_material(material.clone());
        }
    }

    /// Committed world pose, as of the last completed step.
    pub fn global_pose(&self, world: &PhysicsWorld) -> Result<Pose> {
        world
            .body_pose(self.body)
            .ok_or_else(|| self.detached_error("global_pose"))
    }

    /// Teleport the actor.
    pub fn set_global_pose(&self, world: &mut PhysicsWorld, pose: &Pose) -> Result<()> {
        if world.body(self.body).is_none() {
            return Err(self.detached_error("set_global_pose"));
        }
        world.set_body_pose(self.body, pose);
        Ok(())
    }

    pub fn mass(&self, world: &PhysicsWorld) -> Result<f32> {
        self.dynamic_body(world, "mass")?;
        Ok(world.body_mass(self.body))
    }

    /// Override the mass by rescaling the density of every shape.
    pub fn set_mass(&mut self, world: &mut PhysicsWorld, mass: f32) -> Result<()> {
        const CONTEXT: &str = "set_mass";
        self.require_dynamic(CONTEXT)?;
        ensure_positive(CONTEXT, "mass", mass)?;
        let volume = world.body_volume(self.body);
        if volume <= 0.0 {
            return Err(PhysicsError::invalid(
                CONTEXT,
                format!("{} has no volume to distribute mass over", self.name),
            ));
        }
        self.recompute_mass_and_inertia(world, mass / volume)?;
        Ok(())
    }

    pub fn linear_velocity(&self, world: &PhysicsWorld) -> Result<Vec3> {
        self.dynamic_body(world, "linear_velocity")
            .map(|body| from_vector(body.linvel()))
    }

    pub fn set_linear_velocity(&self, world: &mut PhysicsWorld, velocity: Vec3) -> Result<()> {
        self.dynamic_body_mut(world, "set_linear_velocity")?
            .set_linvel(to_vector(velocity), true);
        Ok(())
    }

    pub fn angular_velocity(&self, world: &PhysicsWorld) -> Result<Vec3> {
        self.dynamic_body(world, "angular_velocity")
            .map(|body| from_vector(body.angvel()))
    }

    pub fn set_angular_velocity(&self, world: &mut PhysicsWorld, velocity: Vec3) -> Result<()> {
        self.dynamic_body_mut(world, "set_angular_velocity")?
            .set_angvel(to_vector(velocity), true);
        Ok(())
    }

    /// Push the actor for the next step. Wakes it up.
    pub fn add_force(&self, world: &mut PhysicsWorld, force: Vec3) -> Result<()> {
        self.dynamic_body(world, "add_force")?;
        world.add_force(self.body, force);
        Ok(())
    }

    /// Instantaneous change of momentum. Wakes the actor up.
    pub fn apply_impulse(&self, world: &mut PhysicsWorld, impulse: Vec3) -> Result<()> {
        self.dynamic_body_mut(world, "apply_impulse")?
            .apply_impulse(to_vector(impulse), true);
        Ok(())
    }

    pub fn set_gravity_disabled(&mut self, world: &mut PhysicsWorld, disabled: bool) -> Result<()> {
        let scale = if disabled { 0.0 } else { 1.0 };
        self.dynamic_body_mut(world, "set_gravity_disabled")?
            .set_gravity_scale(scale, true);
        self.gravity_disabled = disabled;
        Ok(())
    }

    pub fn gravity_disabled(&self) -> bool {
        self.gravity_disabled
    }

    /// Kernel sleep flag. Always false for static actors.
    pub fn is_sleeping(&self, world: &PhysicsWorld) -> bool {
        self.is_dynamic() && world.is_sleeping(self.body)
    }

    pub fn wake_up(&self, world: &mut PhysicsWorld) -> Result<()> {
        self.dynamic_body(world, "wake_up")?;
        world.wake_up(self.body);
        Ok(())
    }

    pub fn put_to_sleep(&self, world: &mut PhysicsWorld) -> Result<()> {
        self.dynamic_body_mut(world, "put_to_sleep")?.sleep();
        Ok(())
    }

    /// Destroy the kernel body of an actor that is not part of any scene.
    pub fn release(self, world: &mut PhysicsWorld) {
        log::debug!("{}: releasing {} shape(s)", self.name, self.shapes.len());
        world.remove_body(self.body);
    }

    fn require_dynamic(&self, context: &'static str) -> Result<()> {
        if !self.is_dynamic() {
            return Err(PhysicsError::invalid(
                context,
                format!("{} is static", self.name),
            ));
        }
        Ok(())
    }

    fn dynamic_body<'w>(
        &self,
        world: &'w PhysicsWorld,
        context: &'static str,
    ) -> Result<&'w RigidBody> {
        self.require_dynamic(context)?;
        world
            .body(self.body)
            .ok_or_else(|| self.detached_error(context))
    }

    fn dynamic_body_mut<'w>(
        &self,
        world: &'w mut PhysicsWorld,
        context: &'static str,
    ) -> Result<&'w mut RigidBody> {
        self.require_dynamic(context)?;
        world
            .body_mut(self.body)
            .ok_or_else(|| self.detached_error(context))
    }

    fn detached_error(&self, context: &'static str) -> PhysicsError {
        PhysicsError::invalid(
            context,
            format!("{} has no body in this physics world", self.name),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::MaterialRegistry;
    use crate::cooking::MeshCooker;

    fn setup() -> (PhysicsWorld, MaterialRef) {
        let mut registry = MaterialRegistry::new();
        let material = registry.create(0.5, 0.5, 0.5).unwrap();
        (PhysicsWorld::new(), material)
    }

    #[test]
    fn shape_indices_follow_creation_order() {
        let (mut world, material) = setup();
        let mut actor = Actor::new_dynamic(&mut world, &Pose::IDENTITY);
        let a = actor
            .create_shape(&mut world, Geometry::cuboid(0.5, 0.5, 0.5), &material, None)
            .unwrap();
        actor
            .set_local_pose(&mut world, a, &Pose::at(0.0, 1.0, 0.0))
            .unwrap();
        let b = actor
            .create_shape(&mut world, Geometry::sphere(0.3), &material, None)
            .unwrap();
        actor
            .set_local_pose(&mut world, b, &Pose::at(2.0, 1.0, 0.0))
            .unwrap();
        let c = actor
            .create_shape(&mut world, Geometry::capsule(0.1, 0.4), &material, None)
            .unwrap();

        assert_eq!((a, b, c), (0, 1, 2));
        assert!(matches!(actor.shape(0).unwrap().geometry(), Geometry::Box { .. }));
        assert!(matches!(actor.shape(1).unwrap().geometry(), Geometry::Sphere { .. }));
        assert!(matches!(actor.shape(2).unwrap().geometry(), Geometry::Capsule { .. }));
        assert_eq!(actor.shape(1).unwrap().local_pose(), Pose::at(2.0, 1.0, 0.0));
    }

    #[test]
    fn local_pose_index_is_bounds_checked() {
        let (mut world, material) = setup();
        let mut actor = Actor::new_static(&mut world, &Pose::IDENTITY);
        for _ in 0..3 {
            actor
                .create_shape(&mut world, Geometry::sphere(1.0), &material, None)
                .unwrap();
        }
        assert!(actor
            .set_local_pose(&mut world, 2, &Pose::at(1.0, 0.0, 0.0))
            .is_ok());
        let err = actor
            .set_local_pose(&mut world, 3, &Pose::IDENTITY)
            .unwrap_err();
        assert_eq!(err, PhysicsError::IndexOutOfRange { index: 3, count: 3 });
        assert!(err.is_invalid_parameter());
        assert!(actor.shape(3).is_err());
    }

    #[test]
    fn failed_shape_creation_leaves_actor_untouched() {
        let (mut world, material) = setup();
        let mut actor = Actor::new_dynamic(&mut world, &Pose::IDENTITY);
        assert!(actor
            .create_shape(&mut world, Geometry::Plane, &material, None)
            .is_err());
        assert!(actor
            .create_shape(&mut world, Geometry::sphere(1.0), &material, Some(0.0))
            .is_err());
        assert_eq!(actor.shape_count(), 0);
        assert_eq!(world.collider_count(), 0);
        assert!(!actor.is_mass_stale());
    }

    #[test]
    fn mass_doubles_with_two_unit_boxes() {
        let (mut world, material) = setup();
        let mut one = Actor::new_dynamic(&mut world, &Pose::IDENTITY);
        one.create_shape(&mut world, Geometry::cuboid(0.5, 0.5, 0.5), &material, None)
            .unwrap();
        let single = one.recompute_mass_and_inertia(&mut world, 1.0).unwrap();

        let mut two = Actor::new_dynamic(&mut world, &Pose::at(5.0, 0.0, 0.0));
        for x in [0.0, 2.0] {
            let index = two
                .create_shape(&mut world, Geometry::cuboid(0.5, 0.5, 0.5), &material, None)
                .unwrap();
            two.set_local_pose(&mut world, index, &Pose::at(x, 0.0, 0.0))
                .unwrap();
        }
        let double = two.recompute_mass_and_inertia(&mut world, 1.0).unwrap();

        assert!((single - 1.0).abs() < 1e-4);
        assert!((double - 2.0 * single).abs() < 1e-4);
        assert!((two.mass(&world).unwrap() - double).abs() < 1e-6);
    }

    #[test]
    fn mass_grows_with_volume() {
        let (mut world, material) = setup();
        let mut previous = 0.0;
        for half in [0.25, 0.5, 1.0, 2.0] {
            let mut actor = Actor::new_dynamic(&mut world, &Pose::IDENTITY);
            actor
                .create_shape(&mut world, Geometry::cuboid(half, half, half), &material, None)
                .unwrap();
            let mass = actor.recompute_mass_and_inertia(&mut world, 1.0).unwrap();
            assert!(mass > previous, "{mass} <= {previous} at half extent {half}");
            previous = mass;
        }
    }

    #[test]
    fn untriangulated_mesh_creates_no_shape() {
        let (mut world, material) = setup();
        let mut ground = Actor::new_static(&mut world, &Pose::IDENTITY);
        let vertices = [Vec3::ZERO, Vec3::X, Vec3::Z, Vec3::Y];
        let result = MeshCooker::new()
            .cook_triangle_mesh(&vertices, &[0, 1, 2, 3])
            .and_then(|mesh| {
                ground.create_shape(&mut world, Geometry::TriangleMesh(mesh), &material, None)
            });
        assert!(result.unwrap_err().is_invalid_parameter());
        assert_eq!(ground.shape_count(), 0);
        assert_eq!(world.collider_count(), 0);
    }

    #[test]
    fn shapes_mark_mass_stale_until_recompute() {
        let (mut world, material) = setup();
        let mut actor = Actor::new_dynamic(&mut world, &Pose::IDENTITY);
        actor
            .create_shape(&mut world, Geometry::sphere(0.5), &material, None)
            .unwrap();
        assert!(actor.is_mass_stale());
        actor.recompute_mass_and_inertia(&mut world, 2.0).unwrap();
        assert!(!actor.is_mass_stale());
        assert_eq!(actor.shape(0).unwrap().density(), 2.0);
    }

    #[test]
    fn set_mass_overrides_density() {
        let (mut world, material) = setup();
        let mut actor = Actor::new_dynamic(&mut world, &Pose::IDENTITY);
        actor
            .create_shape(&mut world, Geometry::cuboid(1.0, 0.5, 0.5), &material, None)
            .unwrap();
        actor.set_mass(&mut world, 10.0).unwrap();
        assert!((actor.mass(&world).unwrap() - 10.0).abs() < 1e-3);
        assert!((actor.shape(0).unwrap().density() - 5.0).abs() < 1e-4);
    }

    #[test]
    fn static_actors_reject_dynamic_operations() {
        let (mut world, material) = setup();
        let mut ground = Actor::new_static(&mut world, &Pose::IDENTITY);
        ground
            .create_shape(&mut world, Geometry::Plane, &material, None)
            .unwrap();
        assert!(!ground.is_mass_stale());
        assert!(ground
            .recompute_mass_and_inertia(&mut world, 1.0)
            .unwrap_err()
            .is_invalid_parameter());
        assert!(ground.linear_velocity(&world).is_err());
        assert!(ground.add_force(&mut world, Vec3::Y).is_err());
        assert!(ground.set_gravity_disabled(&mut world, true).is_err());
        assert!(!ground.is_sleeping(&world));
    }

    /// Unit box of mass 1, enabled in the world the way a scene would.
    fn live_box(world: &mut PhysicsWorld, material: &MaterialRef, pose: &Pose) -> Actor {
        let mut actor = Actor::new_dynamic(world, pose);
        actor
            .create_shape(world, Geometry::cuboid(0.5, 0.5, 0.5), material, None)
            .unwrap();
        actor.recompute_mass_and_inertia(world, 1.0).unwrap();
        world.set_body_enabled(actor.body_handle(), true);
        actor
    }

    #[test]
    fn force_acts_for_one_step() {
        let (mut world, material) = setup();
        world.set_gravity(Vec3::ZERO);
        let actor = live_box(&mut world, &material, &Pose::IDENTITY);

        actor.add_force(&mut world, Vec3::new(10.0, 0.0, 0.0)).unwrap();
        world.step(0.1);
        let after_push = actor.linear_velocity(&world).unwrap();
        assert!((after_push.x - 1.0).abs() < 1e-3, "{after_push:?}");
        assert_eq!(world.body(actor.body_handle()).unwrap().user_force().norm(), 0.0);

        world.step(0.1);
        let coasting = actor.linear_velocity(&world).unwrap();
        assert!((coasting.x - after_push.x).abs() < 1e-4, "{coasting:?}");
    }

    #[test]
    fn impulse_changes_velocity_by_impulse_over_mass() {
        let (mut world, material) = setup();
        world.set_gravity(Vec3::ZERO);
        let mut actor = live_box(&mut world, &material, &Pose::IDENTITY);
        actor.set_mass(&mut world, 4.0).unwrap();

        actor.apply_impulse(&mut world, Vec3::new(0.0, 0.0, 2.0)).unwrap();
        let velocity = actor.linear_velocity(&world).unwrap();
        assert!((velocity.z - 0.5).abs() < 1e-4, "{velocity:?}");

        world.step(0.1);
        let pose = actor.global_pose(&world).unwrap();
        assert!((pose.position.z - 0.05).abs() < 1e-3, "{pose:?}");
    }

    #[test]
    fn gravity_disabled_actor_floats() {
        let (mut world, material) = setup();
        let mut floating = live_box(&mut world, &material, &Pose::at(0.0, 10.0, 0.0));
        let falling = live_box(&mut world, &material, &Pose::at(5.0, 10.0, 0.0));
        floating.set_gravity_disabled(&mut world, true).unwrap();
        assert!(floating.gravity_disabled());

        for _ in 0..30 {
            world.step(1.0 / 60.0);
        }
        let floating_y = floating.global_pose(&world).unwrap().position.y;
        let falling_y = falling.global_pose(&world).unwrap().position.y;
        assert!((floating_y - 10.0).abs() < 1e-4, "floating at {floating_y}");
        assert!(falling_y < 9.5, "falling at {falling_y}");

        floating.set_gravity_disabled(&mut world, false).unwrap();
        for _ in 0..30 {
            world.step(1.0 / 60.0);
        }
        assert!(floating.global_pose(&world).unwrap().position.y < 9.5);
    }

    #[test]
    fn global_pose_teleports() {
        let (mut world, material) = setup();
        world.set_gravity(Vec3::ZERO);
        let actor = live_box(&mut world, &material, &Pose::IDENTITY);

        actor.set_global_pose(&mut world, &Pose::at(5.0, 6.0, 7.0)).unwrap();
        assert_eq!(actor.global_pose(&world).unwrap().position, Vec3::new(5.0, 6.0, 7.0));

        world.step(1.0 / 60.0);
        let settled = actor.global_pose(&world).unwrap().position;
        assert!((settled - Vec3::new(5.0, 6.0, 7.0)).length() < 1e-4, "{settled:?}");
    }

    #[test]
    fn material_switch_applies_to_every_shape() {
        let mut registry = MaterialRegistry::new();
        let wood = registry.create(0.5, 0.48, 0.6).unwrap();
        let metal = registry.create(0.8, 0.42, 0.6).unwrap();
        let mut world = PhysicsWorld::new();
        let mut actor = Actor::new_dynamic(&mut world, &Pose::IDENTITY);
        for _ in 0..2 {
            actor
                .create_shape(&mut world, Geometry::sphere(0.2), &wood, None)
                .unwrap();
        }
        actor.set_material(&mut world, &metal);
        for shape in actor.shapes() {
            assert_eq!(shape.material().id(), metal.id());
            let collider = &world.collider_set[shape.collider()];
            assert_eq!(collider.friction(), 0.42);
        }
    }

    #[test]
    fn release_removes_body_and_colliders() {
        let (mut world, material) = setup();
        let mut actor = Actor::new_dynamic(&mut world, &Pose::IDENTITY);
        actor
            .create_shape(&mut world, Geometry::sphere(0.2), &material, None)
            .unwrap();
        actor.release(&mut world);
        assert_eq!(world.body_count(), 1);
        assert_eq!(world.collider_count(), 0);
    }
}
