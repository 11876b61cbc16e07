//! The scene: owner of every actor, material and joint, and of the kernel context.
//!
//! Lifecycle is `Constructed -> Initialized -> Released`. Content plugs in through
//! [`SceneContent`]: `custom_init` runs once during [`Scene::initialize`], and
//! `custom_update` runs once at the end of every [`Scene::step`], after the kernel has
//! committed the step's results.

use crate::actor::{Actor, ActorId, ActorKind};
use crate::error::{PhysicsError, Result};
use crate::joint::{DistanceJointMut, Joint, JointEnds, JointId, RevoluteJointMut};
use crate::material::{MaterialRef, MaterialRegistry};
use crate::physics_world::PhysicsWorld;
use engine_core::{Color, Pose, Vec3, Velocity};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneState {
    Constructed,
    Initialized,
    Released,
}

/// Debug-visualization switches forwarded to whatever draws the scene.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Visualization {
    pub enabled: bool,
    pub scale: f32,
    pub collision_shapes: bool,
    pub actor_axes: bool,
    pub joint_local_frames: bool,
    pub joint_limits: bool,
    pub body_lin_velocity: bool,
}

impl Default for Visualization {
    fn default() -> Self {
        Self {
            enabled: true,
            scale: 1.0,
            collision_shapes: true,
            actor_axes: false,
            joint_local_frames: true,
            joint_limits: true,
            body_lin_velocity: false,
        }
    }
}

/// Parameters fixed at scene creation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub gravity: Vec3,
    pub visualization: Visualization,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            gravity: Vec3::new(0.0, -9.81, 0.0),
            visualization: Visualization::default(),
        }
    }
}

/// Hooks through which concrete content populates and drives a scene.
pub trait SceneContent {
    /// Create materials, actors and joints. Runs exactly once.
    fn custom_init(&mut self, scene: &mut Scene) -> Result<()>;

    /// Runs once per step, after the step's results are committed.
    fn custom_update(&mut self, _scene: &mut Scene) -> Result<()> {
        Ok(())
    }
}

/// A watched actor fell asleep or woke up during a step.
#[derive(Debug, Clone, PartialEq)]
pub struct SleepTransition {
    pub actor: ActorId,
    pub name: String,
    pub asleep: bool,
}

/// Outcome of one call to [`Scene::step`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepReport {
    /// 1-based number of the step just completed.
    pub step: u64,
    pub transitions: Vec<SleepTransition>,
}

/// Per-actor state for textual or graphical display.
#[derive(Debug, Clone, PartialEq)]
pub struct ActorSnapshot {
    pub id: ActorId,
    pub name: String,
    pub kind: ActorKind,
    pub pose: Pose,
    pub velocity: Velocity,
    pub color: Color,
    pub sleeping: bool,
    pub shape_count: usize,
}

#[derive(Debug)]
struct WatchEntry {
    actor: ActorId,
    asleep: bool,
}

pub struct Scene {
    state: SceneState,
    config: SceneConfig,
    world: PhysicsWorld,
    materials: MaterialRegistry,
    default_material: MaterialRef,
    actors: Vec<(ActorId, Actor)>,
    joints: Vec<Joint>,
    watched: Vec<WatchEntry>,
    next_actor: u32,
    next_joint: u32,
    step_count: u64,
}

impl Scene {
    /// Create the kernel context. The scene starts `Constructed` and must be initialized
    /// before it can step.
    pub fn new(config: SceneConfig) -> Result<Self> {
        if !config.gravity.is_finite() {
            return Err(PhysicsError::KernelInitialization {
                reason: format!("gravity {:?} is not finite", config.gravity),
            });
        }
        validate_visualization(&config.visualization)
            .map_err(|reason| PhysicsError::KernelInitialization { reason })?;

        let mut world = PhysicsWorld::new();
        world.set_gravity(config.gravity);
        let mut materials = MaterialRegistry::new();
        let default_material =
            materials
                .create(0.5, 0.5, 0.5)
                .map_err(|err| PhysicsError::KernelInitialization {
                    reason: err.to_string(),
                })?;

        log::info!("scene created, gravity {:?}", config.gravity);
        Ok(Self {
            state: SceneState::Constructed,
            config,
            world,
            materials,
            default_material,
            actors: Vec::new(),
            joints: Vec::new(),
            watched: Vec::new(),
            next_actor: 0,
            next_joint: 0,
            step_count: 0,
        })
    }

    pub fn state(&self) -> SceneState {
        self.state
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// Apply the configuration to the kernel and run the content's init hook once.
    ///
    /// If the hook fails, whatever it built is torn down and the scene ends `Released`;
    /// the hook never runs again over a half-built scene.
    pub fn initialize<C: SceneContent + ?Sized>(&mut self, content: &mut C) -> Result<()> {
        self.expect_state(SceneState::Constructed)?;
        self.world.set_gravity(self.config.gravity);
        if let Err(err) = content.custom_init(self) {
            log::error!("scene init hook failed, releasing the scene: {err}");
            self.release();
            return Err(err);
        }
        self.state = SceneState::Initialized;
        log::info!(
            "scene initialized: {} actors, {} joints, {} materials",
            self.actors.len(),
            self.joints.len(),
            self.materials.len()
        );
        Ok(())
    }

    /// Advance the simulation by `dt` seconds and run the update hook.
    pub fn step<C: SceneContent + ?Sized>(
        &mut self,
        dt: f32,
        content: &mut C,
    ) -> Result<StepReport> {
        self.expect_state(SceneState::Initialized)?;
        if !dt.is_finite() || dt <= 0.0 {
            return Err(PhysicsError::invalid(
                "step",
                format!("time step must be finite and > 0, got {dt}"),
            ));
        }

        // Returns once the step's results are committed.
        self.world.step(dt);
        self.step_count += 1;

        let transitions = self.collect_sleep_transitions();
        for t in &transitions {
            let verb = if t.asleep { "fell asleep" } else { "woke up" };
            log::info!("step {}: {} ({}) {verb}", self.step_count, t.name, t.actor);
        }

        content.custom_update(self)?;
        Ok(StepReport {
            step: self.step_count,
            transitions,
        })
    }

    fn collect_sleep_transitions(&mut self) -> Vec<SleepTransition> {
        let mut transitions = Vec::new();
        for entry in &mut self.watched {
            let Some((_, actor)) = self.actors.iter().find(|(id, _)| *id == entry.actor) else {
                continue;
            };
            let asleep = actor.is_sleeping(&self.world);
            if asleep != entry.asleep {
                entry.asleep = asleep;
                transitions.push(SleepTransition {
                    actor: entry.actor,
                    name: actor.name().to_string(),
                    asleep,
                });
            }
        }
        transitions
    }

    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    pub fn gravity(&self) -> Vec3 {
        self.world.gravity()
    }

    pub fn set_gravity(&mut self, gravity: Vec3) -> Result<()> {
        if !gravity.is_finite() {
            return Err(PhysicsError::invalid(
                "set_gravity",
                format!("gravity {gravity:?} is not finite"),
            ));
        }
        self.config.gravity = gravity;
        self.world.set_gravity(gravity);
        Ok(())
    }

    pub fn visualization(&self) -> &Visualization {
        &self.config.visualization
    }

    pub fn set_visualization(&mut self, visualization: Visualization) -> Result<()> {
        validate_visualization(&visualization)
            .map_err(|reason| PhysicsError::invalid("set_visualization", reason))?;
        self.config.visualization = visualization;
        Ok(())
    }

    pub fn world(&self) -> &PhysicsWorld {
        &self.world
    }

    /// Kernel context, for building actors before they are added.
    pub fn world_mut(&mut self) -> &mut PhysicsWorld {
        &mut self.world
    }

    // ---- materials ----

    pub fn create_material(
        &mut self,
        static_friction: f32,
        dynamic_friction: f32,
        restitution: f32,
    ) -> Result<MaterialRef> {
        self.expect_live("create_material")?;
        self.materials
            .create(static_friction, dynamic_friction, restitution)
    }

    /// Material used when content does not pick one.
    pub fn default_material(&self) -> &MaterialRef {
        &self.default_material
    }

    pub fn materials(&self) -> &MaterialRegistry {
        &self.materials
    }

    // ---- actors ----

    /// Register `actor` and enable its body in the simulation.
    ///
    /// A rejected actor is released from the kernel. Call [`Scene::check_add`] first to
    /// keep it, fix it and try again.
    pub fn add(&mut self, actor: Actor) -> Result<ActorId> {
        if actor.world_id() != self.world.id() {
            return Err(PhysicsError::invalid(
                "add",
                format!("{} was built for another physics world", actor.name()),
            ));
        }
        if let Err(err) = self.check_add(&actor) {
            log::warn!("rejected '{}': {err}", actor.name());
            actor.release(&mut self.world);
            return Err(err);
        }

        let id = ActorId::new(self.next_actor);
        self.next_actor += 1;
        self.world.set_body_enabled(actor.body_handle(), true);
        log::debug!(
            "added {id} '{}' with {} shape(s)",
            actor.name(),
            actor.shape_count()
        );
        self.actors.push((id, actor));
        Ok(id)
    }

    /// Whether [`Scene::add`] would accept `actor`.
    pub fn check_add(&self, actor: &Actor) -> Result<()> {
        self.expect_live("add")?;
        if actor.world_id() != self.world.id() || self.world.body(actor.body_handle()).is_none() {
            return Err(PhysicsError::invalid(
                "add",
                format!("{} was built for another physics world", actor.name()),
            ));
        }
        if actor.is_dynamic() && actor.is_mass_stale() {
            return Err(PhysicsError::StaleMassProperties {
                actor: actor.name().to_string(),
            });
        }
        Ok(())
    }

    /// Take an actor out of the simulation and hand it back.
    ///
    /// Fails with `DanglingReference` while any joint still uses the actor.
    pub fn remove(&mut self, id: ActorId) -> Result<Actor> {
        self.expect_live("remove")?;
        let position = self
            .actors
            .iter()
            .position(|(actor_id, _)| *actor_id == id)
            .ok_or(PhysicsError::UnknownActor(id))?;
        let joints: Vec<JointId> = self
            .joints
            .iter()
            .filter(|joint| joint.references(id))
            .map(Joint::id)
            .collect();
        if !joints.is_empty() {
            return Err(PhysicsError::DanglingReference { actor: id, joints });
        }

        let (_, actor) = self.actors.remove(position);
        self.world.set_body_enabled(actor.body_handle(), false);
        self.watched.retain(|entry| entry.actor != id);
        log::debug!("removed {id} '{}'", actor.name());
        Ok(actor)
    }

    pub fn actor(&self, id: ActorId) -> Result<&Actor> {
        self.actors
            .iter()
            .find(|(actor_id, _)| *actor_id == id)
            .map(|(_, actor)| actor)
            .ok_or(PhysicsError::UnknownActor(id))
    }

    pub fn actor_mut(&mut self, id: ActorId) -> Result<&mut Actor> {
        self.actor_and_world_mut(id).map(|(actor, _)| actor)
    }

    /// Mutable access to an actor together with the kernel context its methods need.
    pub fn actor_and_world_mut(&mut self, id: ActorId) -> Result<(&mut Actor, &mut PhysicsWorld)> {
        let actor = self
            .actors
            .iter_mut()
            .find(|(actor_id, _)| *actor_id == id)
            .map(|(_, actor)| actor)
            .ok_or(PhysicsError::UnknownActor(id))?;
        Ok((actor, &mut self.world))
    }

    /// Actors in insertion order.
    pub fn actors(&self) -> impl Iterator<Item = (ActorId, &Actor)> {
        self.actors.iter().map(|(id, actor)| (*id, actor))
    }

    pub fn actor_count(&self) -> usize {
        self.actors.len()
    }

    /// Committed world pose of a registered actor.
    pub fn global_pose(&self, id: ActorId) -> Result<Pose> {
        self.actor(id)?.global_pose(&self.world)
    }

    /// Report sleep transitions of `id` in every following `StepReport`.
    pub fn watch_sleep(&mut self, id: ActorId) -> Result<()> {
        let asleep = self.actor(id)?.is_sleeping(&self.world);
        if !self.watched.iter().any(|entry| entry.actor == id) {
            self.watched.push(WatchEntry { actor: id, asleep });
        }
        Ok(())
    }

    pub fn snapshot(&self) -> Vec<ActorSnapshot> {
        self.actors
            .iter()
            .map(|(id, actor)| {
                let velocity = Velocity::with_angular(
                    actor.linear_velocity(&self.world).unwrap_or(Vec3::ZERO),
                    actor.angular_velocity(&self.world).unwrap_or(Vec3::ZERO),
                );
                ActorSnapshot {
                    id: *id,
                    name: actor.name().to_string(),
                    kind: actor.kind(),
                    pose: actor.global_pose(&self.world).unwrap_or(Pose::IDENTITY),
                    velocity,
                    color: actor.color(),
                    sleeping: actor.is_sleeping(&self.world),
                    shape_count: actor.shape_count(),
                }
            })
            .collect()
    }

    // ---- joints ----

    /// Spring joint. `actor0 == None` anchors endpoint 0 to the world frame.
    pub fn create_distance_joint(
        &mut self,
        actor0: Option<ActorId>,
        frame0: &Pose,
        actor1: ActorId,
        frame1: &Pose,
    ) -> Result<JointId> {
        let ends = self.resolve_ends("create_distance_joint", actor0, frame0, actor1, frame1)?;
        let id = self.next_joint_id();
        self.joints
            .push(Joint::create_distance(&mut self.world, id, ends));
        Ok(id)
    }

    /// Hinge about the X axis of the joint frames. `actor0 == None` means the world.
    pub fn create_revolute_joint(
        &mut self,
        actor0: Option<ActorId>,
        frame0: &Pose,
        actor1: ActorId,
        frame1: &Pose,
    ) -> Result<JointId> {
        let ends = self.resolve_ends("create_revolute_joint", actor0, frame0, actor1, frame1)?;
        let id = self.next_joint_id();
        self.joints
            .push(Joint::create_revolute(&mut self.world, id, ends));
        Ok(id)
    }

    fn resolve_ends(
        &self,
        context: &'static str,
        actor0: Option<ActorId>,
        frame0: &Pose,
        actor1: ActorId,
        frame1: &Pose,
    ) -> Result<JointEnds> {
        self.expect_live(context)?;
        if actor0 == Some(actor1) {
            return Err(PhysicsError::invalid(
                context,
                format!("both endpoints are {actor1}"),
            ));
        }
        let body0 = match actor0 {
            Some(id) => self.actor(id)?.body_handle(),
            None => self.world.world_anchor(),
        };
        let body1 = self.actor(actor1)?.body_handle();
        Ok(JointEnds {
            actor0,
            body0,
            frame0: *frame0,
            actor1,
            body1,
            frame1: *frame1,
        })
    }

    fn next_joint_id(&mut self) -> JointId {
        let id = JointId::new(self.next_joint);
        self.next_joint += 1;
        id
    }

    pub fn joint(&self, id: JointId) -> Result<&Joint> {
        self.joints
            .iter()
            .find(|joint| joint.id() == id)
            .ok_or(PhysicsError::UnknownJoint(id))
    }

    pub fn joints(&self) -> impl Iterator<Item = &Joint> {
        self.joints.iter()
    }

    pub fn joint_count(&self) -> usize {
        self.joints.len()
    }

    pub fn distance_joint(&mut self, id: JointId) -> Result<DistanceJointMut<'_>> {
        let joint = self
            .joints
            .iter_mut()
            .find(|joint| joint.id() == id)
            .ok_or(PhysicsError::UnknownJoint(id))?;
        joint.as_distance(&mut self.world)
    }

    pub fn revolute_joint(&mut self, id: JointId) -> Result<RevoluteJointMut<'_>> {
        let joint = self
            .joints
            .iter_mut()
            .find(|joint| joint.id() == id)
            .ok_or(PhysicsError::UnknownJoint(id))?;
        joint.as_revolute(&mut self.world)
    }

    pub fn remove_joint(&mut self, id: JointId) -> Result<()> {
        let position = self
            .joints
            .iter()
            .position(|joint| joint.id() == id)
            .ok_or(PhysicsError::UnknownJoint(id))?;
        self.joints.remove(position).release(&mut self.world);
        log::debug!("removed {id}");
        Ok(())
    }

    // ---- teardown ----

    /// Destroy every joint, actor and material along with their kernel objects.
    pub fn release(&mut self) {
        if self.state == SceneState::Released {
            return;
        }
        for joint in self.joints.drain(..) {
            joint.release(&mut self.world);
        }
        let actor_count = self.actors.len();
        for (_, actor) in self.actors.drain(..) {
            actor.release(&mut self.world);
        }
        self.watched.clear();
        self.materials.clear();
        self.state = SceneState::Released;
        log::info!(
            "scene released after {} steps ({actor_count} actors)",
            self.step_count
        );
    }

    fn expect_state(&self, expected: SceneState) -> Result<()> {
        if self.state != expected {
            return Err(PhysicsError::InvalidState {
                expected,
                actual: self.state,
            });
        }
        Ok(())
    }

    fn expect_live(&self, context: &'static str) -> Result<()> {
        if self.state == SceneState::Released {
            log::warn!("{context} called on a released scene");
            return Err(PhysicsError::InvalidState {
                expected: SceneState::Initialized,
                actual: SceneState::Released,
            });
        }
        Ok(())
    }
}

fn validate_visualization(visualization: &Visualization) -> std::result::Result<(), String> {
    let scale = visualization.scale;
    if !scale.is_finite() || scale <= 0.0 {
        return Err(format!("visualization scale {scale} must be finite and > 0"));
    }
    Ok(())
}

impl Drop for Scene {
    fn drop(&mut self) {
        self.release();
    }
}

/// A scene bundled with the content that drives it.
pub struct Simulation<C: SceneContent> {
    scene: Scene,
    content: C,
}

impl<C: SceneContent> Simulation<C> {
    pub fn new(config: SceneConfig, content: C) -> Result<Self> {
        Ok(Self {
            scene: Scene::new(config)?,
            content,
        })
    }

    pub fn initialize(&mut self) -> Result<()> {
        self.scene.initialize(&mut self.content)
    }

    pub fn step(&mut self, dt: f32) -> Result<StepReport> {
        self.scene.step(dt, &mut self.content)
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn content(&self) -> &C {
        &self.content
    }

    pub fn content_mut(&mut self) -> &mut C {
        &mut self.content
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compound::CompoundLayout;
    use crate::shape::Geometry;

    /// Box of half-extent 0.5 dropped from 10 m onto a ground plane.
    #[derive(Default)]
    struct DroppedBox {
        ground: Option<ActorId>,
        block: Option<ActorId>,
        init_calls: usize,
        update_calls: usize,
    }

    impl SceneContent for DroppedBox {
        fn custom_init(&mut self, scene: &mut Scene) -> Result<()> {
            self.init_calls += 1;
            let material = scene.default_material().clone();
            let world = scene.world_mut();

            let mut ground = Actor::new_static(world, &Pose::from_plane(Vec3::Y, 0.0))
                .with_name("ground");
            ground.create_shape(world, Geometry::Plane, &material, None)?;

            let layout = CompoundLayout::new(ActorKind::Dynamic)
                .with_part(Geometry::cuboid(0.5, 0.5, 0.5), Pose::IDENTITY);
            let block =
                Actor::from_layout(world, &layout, &Pose::at(0.0, 10.0, 0.0), &material, 1.0)?
                    .with_name("box");

            self.ground = Some(scene.add(ground)?);
            self.block = Some(scene.add(block)?);
            Ok(())
        }

        fn custom_update(&mut self, _scene: &mut Scene) -> Result<()> {
            self.update_calls += 1;
            Ok(())
        }
    }

    struct Empty;

    impl SceneContent for Empty {
        fn custom_init(&mut self, _scene: &mut Scene) -> Result<()> {
            Ok(())
        }
    }

    /// Adds a box and a material, then fails on a bad material.
    #[derive(Default)]
    struct FailingInit {
        init_calls: usize,
    }

    impl SceneContent for FailingInit {
        fn custom_init(&mut self, scene: &mut Scene) -> Result<()> {
            self.init_calls += 1;
            let block = dynamic_box(scene, Pose::at(0.0, 1.0, 0.0));
            scene.add(block)?;
            scene.create_material(0.2, 0.2, 0.2)?;
            scene.create_material(-1.0, 0.5, 0.5)?;
            Ok(())
        }
    }

    fn dynamic_box(scene: &mut Scene, pose: Pose) -> Actor {
        let material = scene.default_material().clone();
        let layout = CompoundLayout::new(ActorKind::Dynamic)
            .with_part(Geometry::cuboid(0.5, 0.5, 0.5), Pose::IDENTITY);
        Actor::from_layout(scene.world_mut(), &layout, &pose, &material, 1.0).unwrap()
    }

    #[test]
    fn dropped_box_comes_to_rest_and_sleeps() {
        let mut sim = Simulation::new(SceneConfig::default(), DroppedBox::default()).unwrap();
        sim.initialize().unwrap();
        let block = sim.content().block.unwrap();
        sim.scene_mut().watch_sleep(block).unwrap();

        let mut fell_asleep_at = None;
        for _ in 0..1200 {
            let report = sim.step(1.0 / 60.0).unwrap();
            if report.transitions.iter().any(|t| t.actor == block && t.asleep) {
                fell_asleep_at = Some(report.step);
                break;
            }
        }

        assert!(fell_asleep_at.is_some(), "box never fell asleep");
        let scene = sim.scene();
        let pose = scene.global_pose(block).unwrap();
        assert!((pose.position.y - 0.5).abs() < 0.05, "rest height {}", pose.position.y);
        assert!(scene.actor(block).unwrap().is_sleeping(scene.world()));
    }

    #[test]
    fn hooks_run_once_per_init_and_step() {
        let mut sim = Simulation::new(SceneConfig::default(), DroppedBox::default()).unwrap();
        sim.initialize().unwrap();
        for _ in 0..5 {
            sim.step(1.0 / 60.0).unwrap();
        }
        assert_eq!(sim.content().init_calls, 1);
        assert_eq!(sim.content().update_calls, 5);
        assert_eq!(sim.scene().step_count(), 5);

        let err = sim.initialize().unwrap_err();
        assert!(matches!(err, PhysicsError::InvalidState { .. }));
        assert_eq!(sim.content().init_calls, 1);
    }

    #[test]
    fn step_requires_initialization() {
        let mut scene = Scene::new(SceneConfig::default()).unwrap();
        let err = scene.step(1.0 / 60.0, &mut Empty).unwrap_err();
        assert_eq!(
            err,
            PhysicsError::InvalidState {
                expected: SceneState::Initialized,
                actual: SceneState::Constructed,
            }
        );
        scene.initialize(&mut Empty).unwrap();
        assert!(scene.step(0.0, &mut Empty).unwrap_err().is_invalid_parameter());
        assert!(scene.step(1.0 / 60.0, &mut Empty).is_ok());
    }

    #[test]
    fn failed_init_tears_down_the_partial_scene() {
        let mut sim = Simulation::new(SceneConfig::default(), FailingInit::default()).unwrap();
        assert!(sim.initialize().unwrap_err().is_invalid_parameter());

        let scene = sim.scene();
        assert_eq!(scene.state(), SceneState::Released);
        assert_eq!(scene.actor_count(), 0);
        assert!(scene.materials().is_empty());
        assert_eq!(scene.world().collider_count(), 0);

        let err = sim.initialize().unwrap_err();
        assert!(matches!(err, PhysicsError::InvalidState { .. }));
        assert_eq!(sim.content().init_calls, 1);
        assert!(sim.step(1.0 / 60.0).is_err());
    }

    #[test]
    fn invalid_gravity_fails_kernel_init() {
        let config = SceneConfig {
            gravity: Vec3::new(0.0, f32::NAN, 0.0),
            ..SceneConfig::default()
        };
        assert!(matches!(
            Scene::new(config),
            Err(PhysicsError::KernelInitialization { .. })
        ));
    }

    #[test]
    fn invalid_visualization_scale_is_rejected() {
        for scale in [0.0, -1.0, f32::INFINITY] {
            let config = SceneConfig {
                visualization: Visualization {
                    scale,
                    ..Visualization::default()
                },
                ..SceneConfig::default()
            };
            assert!(matches!(
                Scene::new(config),
                Err(PhysicsError::KernelInitialization { .. })
            ));
        }

        let mut scene = Scene::new(SceneConfig::default()).unwrap();
        let zero = Visualization {
            scale: 0.0,
            ..Visualization::default()
        };
        assert!(scene.set_visualization(zero).unwrap_err().is_invalid_parameter());
        assert_eq!(scene.visualization().scale, 1.0);
    }

    fn lump(scene: &mut Scene) -> Actor {
        let material = scene.default_material().clone();
        let world = scene.world_mut();
        let mut actor = Actor::new_dynamic(world, &Pose::IDENTITY).with_name("lump");
        actor
            .create_shape(world, Geometry::sphere(0.5), &material, None)
            .unwrap();
        actor
    }

    #[test]
    fn stale_mass_is_rejected_on_add() {
        let mut scene = Scene::new(SceneConfig::default()).unwrap();
        let bodies = scene.world().body_count();
        let actor = lump(&mut scene);

        let err = scene.add(actor).unwrap_err();
        assert_eq!(
            err,
            PhysicsError::StaleMassProperties {
                actor: "lump".to_string()
            }
        );
        assert_eq!(scene.actor_count(), 0);
        assert_eq!(scene.world().body_count(), bodies);
        assert_eq!(scene.world().collider_count(), 0);
    }

    #[test]
    fn checked_actor_can_be_fixed_and_added() {
        let mut scene = Scene::new(SceneConfig::default()).unwrap();
        let mut actor = lump(&mut scene);
        assert!(matches!(
            scene.check_add(&actor),
            Err(PhysicsError::StaleMassProperties { .. })
        ));

        actor.recompute_mass_and_inertia(scene.world_mut(), 1.0).unwrap();
        scene.check_add(&actor).unwrap();
        let id = scene.add(actor).unwrap();
        assert!(scene.world().is_body_enabled(scene.actor(id).unwrap().body_handle()));
    }

    #[test]
    fn actor_from_another_world_is_rejected() {
        let mut scene = Scene::new(SceneConfig::default()).unwrap();
        let mut other = PhysicsWorld::new();
        let stranger = Actor::new_static(&mut other, &Pose::IDENTITY);

        assert!(scene.add(stranger).unwrap_err().is_invalid_parameter());
        assert_eq!(scene.actor_count(), 0);
        assert_eq!(other.body_count(), 2);
    }

    #[test]
    fn actor_with_joint_cannot_be_removed() {
        let mut scene = Scene::new(SceneConfig::default()).unwrap();
        let actor = dynamic_box(&mut scene, Pose::at(0.0, 2.0, 0.0));
        let id = scene.add(actor).unwrap();
        let joint = scene
            .create_distance_joint(None, &Pose::at(0.0, 4.0, 0.0), id, &Pose::IDENTITY)
            .unwrap();

        let err = scene.remove(id).unwrap_err();
        assert_eq!(
            err,
            PhysicsError::DanglingReference {
                actor: id,
                joints: vec![joint],
            }
        );
        assert_eq!(scene.actor_count(), 1);

        scene.remove_joint(joint).unwrap();
        let actor = scene.remove(id).unwrap();
        assert!(!scene.world().is_body_enabled(actor.body_handle()));

        // A removed actor can come back.
        let id = scene.add(actor).unwrap();
        assert!(scene.world().is_body_enabled(scene.actor(id).unwrap().body_handle()));
    }

    #[test]
    fn joint_endpoints_are_validated() {
        let mut scene = Scene::new(SceneConfig::default()).unwrap();
        let actor = dynamic_box(&mut scene, Pose::IDENTITY);
        let id = scene.add(actor).unwrap();
        let stranger = ActorId::new(99);

        assert_eq!(
            scene
                .create_revolute_joint(Some(stranger), &Pose::IDENTITY, id, &Pose::IDENTITY)
                .unwrap_err(),
            PhysicsError::UnknownActor(stranger)
        );
        assert!(scene
            .create_revolute_joint(Some(id), &Pose::IDENTITY, id, &Pose::IDENTITY)
            .unwrap_err()
            .is_invalid_parameter());
        assert_eq!(scene.joint_count(), 0);
    }

    #[test]
    fn drive_velocity_wakes_sleeping_endpoint() {
        let mut scene = Scene::new(SceneConfig::default()).unwrap();
        let actor = dynamic_box(&mut scene, Pose::at(0.0, 5.0, 0.0));
        let id = scene.add(actor).unwrap();
        let hinge = scene
            .create_revolute_joint(None, &Pose::at(0.0, 5.0, 0.0), id, &Pose::IDENTITY)
            .unwrap();
        scene.initialize(&mut Empty).unwrap();

        let (actor, world) = scene.actor_and_world_mut(id).unwrap();
        actor.put_to_sleep(world).unwrap();
        assert!(actor.is_sleeping(world));

        scene.revolute_joint(hinge).unwrap().set_drive_velocity(1.5).unwrap();

        let actor = scene.actor(id).unwrap();
        assert!(!actor.is_sleeping(scene.world()));
        assert!(scene.distance_joint(hinge).is_err());
    }

    #[test]
    fn release_tears_everything_down() {
        let mut scene = Scene::new(SceneConfig::default()).unwrap();
        let actor = dynamic_box(&mut scene, Pose::IDENTITY);
        let id = scene.add(actor).unwrap();
        scene
            .create_distance_joint(None, &Pose::at(0.0, 2.0, 0.0), id, &Pose::IDENTITY)
            .unwrap();
        scene.initialize(&mut Empty).unwrap();

        scene.release();

        assert_eq!(scene.state(), SceneState::Released);
        assert_eq!(scene.actor_count(), 0);
        assert_eq!(scene.joint_count(), 0);
        assert!(scene.materials().is_empty());
        assert_eq!(scene.world().collider_count(), 0);
        assert!(scene.step(1.0 / 60.0, &mut Empty).is_err());
        let again = dynamic_box(&mut scene, Pose::IDENTITY);
        assert!(matches!(
            scene.add(again),
            Err(PhysicsError::InvalidState { .. })
        ));
    }

    #[test]
    fn snapshot_lists_actors_in_insertion_order() {
        let mut sim = Simulation::new(SceneConfig::default(), DroppedBox::default()).unwrap();
        sim.initialize().unwrap();
        sim.step(1.0 / 60.0).unwrap();

        let snapshot = sim.scene().snapshot();
        let names: Vec<_> = snapshot.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["ground", "box"]);
        assert_eq!(snapshot[0].velocity, Velocity::default());
        assert!(snapshot[1].velocity.linear.y < 0.0);
    }
}
