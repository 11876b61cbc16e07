//! Constraints between two actors.
//!
//! Joints are kernel impulse joints plus the settings the layer tracks itself
//! (enable flags, rest length). The distance joint is a rapier spring joint, the
//! revolute joint a rapier revolute joint turning about the local X axis of its frames.

use crate::actor::ActorId;
use crate::error::{ensure_non_negative, PhysicsError, Result};
use crate::physics_world::{to_isometry, PhysicsWorld};
use engine_core::Pose;
use rapier3d::prelude::*;
use std::fmt;

/// Damping factor of the revolute velocity drive.
const DRIVE_DAMPING: f32 = 1000.0;

/// Identifier handed out by a `Scene` when a joint is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JointId(u32);

impl JointId {
    pub(crate) fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for JointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "joint#{}", self.0)
    }
}

/// Spring/damper settings of a distance joint.
///
/// The spring pulls the anchors towards `rest_length`, which starts at 0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistanceSettings {
    pub rest_length: f32,
    pub stiffness: f32,
    pub damping: f32,
    pub spring_enabled: bool,
}

/// Drive and limit settings of a revolute joint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RevoluteSettings {
    pub drive_velocity: f32,
    pub drive_enabled: bool,
    pub lower_limit: f32,
    pub upper_limit: f32,
    pub limit_enabled: bool,
}

impl Default for RevoluteSettings {
    fn default() -> Self {
        Self {
            drive_velocity: 0.0,
            drive_enabled: false,
            lower_limit: -std::f32::consts::PI,
            upper_limit: std::f32::consts::PI,
            limit_enabled: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum JointKind {
    Distance(DistanceSettings),
    Revolute(RevoluteSettings),
}

impl JointKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Distance(_) => "distance",
            Self::Revolute(_) => "revolute",
        }
    }
}

/// The two endpoints of a joint as resolved by the scene.
#[derive(Debug, Clone, Copy)]
pub(crate) struct JointEnds {
    pub actor0: Option<ActorId>,
    pub body0: RigidBodyHandle,
    pub frame0: Pose,
    pub actor1: ActorId,
    pub body1: RigidBodyHandle,
    pub frame1: Pose,
}

#[derive(Debug)]
pub struct Joint {
    id: JointId,
    ends: JointEnds,
    handle: ImpulseJointHandle,
    kind: JointKind,
}

impl Joint {
    /// Spring pulling the two anchors together.
    pub(crate) fn create_distance(world: &mut PhysicsWorld, id: JointId, ends: JointEnds) -> Self {
        let settings = DistanceSettings {
            rest_length: 0.0,
            stiffness: 1.0,
            damping: 1.0,
            spring_enabled: true,
        };
        let mut data =
            SpringJointBuilder::new(settings.rest_length, settings.stiffness, settings.damping)
                .build()
                .data;
        set_frames(&mut data, &ends);
        let handle = world.insert_joint(ends.body0, ends.body1, data);
        log::debug!(
            "{id}: distance joint, anchors {:.3} apart",
            anchor_distance(world, &ends)
        );
        Self {
            id,
            ends,
            handle,
            kind: JointKind::Distance(settings),
        }
    }

    /// Hinge about the X axis of both joint frames. Drive and limits start disabled.
    pub(crate) fn create_revolute(world: &mut PhysicsWorld, id: JointId, ends: JointEnds) -> Self {
        let mut data = RevoluteJointBuilder::new(Vector::x_axis()).build().data;
        set_frames(&mut data, &ends);
        let handle = world.insert_joint(ends.body0, ends.body1, data);
        log::debug!("{id}: revolute joint");
        Self {
            id,
            ends,
            handle,
            kind: JointKind::Revolute(RevoluteSettings::default()),
        }
    }

    pub fn id(&self) -> JointId {
        self.id
    }

    /// First endpoint; `None` means the world frame.
    pub fn actor0(&self) -> Option<ActorId> {
        self.ends.actor0
    }

    pub fn actor1(&self) -> ActorId {
        self.ends.actor1
    }

    pub fn local_frame0(&self) -> Pose {
        self.ends.frame0
    }

    pub fn local_frame1(&self) -> Pose {
        self.ends.frame1
    }

    pub fn kind(&self) -> &JointKind {
        &self.kind
    }

    pub fn handle(&self) -> ImpulseJointHandle {
        self.handle
    }

    pub fn references(&self, actor: ActorId) -> bool {
        self.ends.actor1 == actor || self.ends.actor0 == Some(actor)
    }

    pub(crate) fn release(self, world: &mut PhysicsWorld) {
        world.remove_joint(self.handle);
    }

    pub(crate) fn as_distance<'a>(
        &'a mut self,
        world: &'a mut PhysicsWorld,
    ) -> Result<DistanceJointMut<'a>> {
        let (id, handle) = (self.id, self.handle);
        match &mut self.kind {
            JointKind::Distance(settings) => Ok(DistanceJointMut {
                id,
                handle,
                settings,
                world,
            }),
            other => Err(PhysicsError::JointKindMismatch {
                joint: id,
                expected: "distance",
                actual: other.name(),
            }),
        }
    }

    pub(crate) fn as_revolute<'a>(
        &'a mut self,
        world: &'a mut PhysicsWorld,
    ) -> Result<RevoluteJointMut<'a>> {
        let (id, handle) = (self.id, self.handle);
        let bodies = [self.ends.body0, self.ends.body1];
        match &mut self.kind {
            JointKind::Revolute(settings) => Ok(RevoluteJointMut {
                id,
                handle,
                bodies,
                settings,
                world,
            }),
            other => Err(PhysicsError::JointKindMismatch {
                joint: id,
                expected: "revolute",
                actual: other.name(),
            }),
        }
    }
}

fn set_frames(data: &mut GenericJoint, ends: &JointEnds) {
    data.set_local_frame1(to_isometry(&ends.frame0))
        .set_local_frame2(to_isometry(&ends.frame1));
}

/// World-space distance between the two anchors.
pub(crate) fn anchor_distance(world: &PhysicsWorld, ends: &JointEnds) -> f32 {
    let anchor = |body, frame: &Pose| {
        world
            .body_pose(body)
            .unwrap_or(Pose::IDENTITY)
            .transform_point(frame.position)
    };
    anchor(ends.body0, &ends.frame0).distance(anchor(ends.body1, &ends.frame1))
}

/// Typed view of a distance joint.
pub struct DistanceJointMut<'a> {
    id: JointId,
    handle: ImpulseJointHandle,
    settings: &'a mut DistanceSettings,
    world: &'a mut PhysicsWorld,
}

impl DistanceJointMut<'_> {
    pub fn id(&self) -> JointId {
        self.id
    }

    pub fn rest_length(&self) -> f32 {
        self.settings.rest_length
    }

    /// Distance the spring pulls the anchors towards.
    pub fn set_rest_length(&mut self, rest_length: f32) -> Result<()> {
        ensure_non_negative("set_rest_length", "rest length", rest_length)?;
        self.settings.rest_length = rest_length;
        self.sync();
        Ok(())
    }

    pub fn stiffness(&self) -> f32 {
        self.settings.stiffness
    }

    pub fn set_stiffness(&mut self, stiffness: f32) -> Result<()> {
        ensure_non_negative("set_stiffness", "stiffness", stiffness)?;
        self.settings.stiffness = stiffness;
        self.sync();
        Ok(())
    }

    pub fn damping(&self) -> f32 {
        self.settings.damping
    }

    pub fn set_damping(&mut self, damping: f32) -> Result<()> {
        ensure_non_negative("set_damping", "damping", damping)?;
        self.settings.damping = damping;
        self.sync();
        Ok(())
    }

    pub fn spring_enabled(&self) -> bool {
        self.settings.spring_enabled
    }

    pub fn set_spring_enabled(&mut self, enabled: bool) {
        self.settings.spring_enabled = enabled;
        self.sync();
    }

    fn sync(&mut self) {
        let s = *self.settings;
        let (stiffness, damping) = if s.spring_enabled {
            (s.stiffness, s.damping)
        } else {
            (0.0, 0.0)
        };
        if let Some(joint) = self.world.joint_mut(self.handle) {
            joint
                .data
                .set_motor_position(JointAxis::LinX, s.rest_length, stiffness, damping);
        }
    }
}

/// Typed view of a revolute joint.
pub struct RevoluteJointMut<'a> {
    id: JointId,
    handle: ImpulseJointHandle,
    bodies: [RigidBodyHandle; 2],
    settings: &'a mut RevoluteSettings,
    world: &'a mut PhysicsWorld,
}

impl RevoluteJointMut<'_> {
    pub fn id(&self) -> JointId {
        self.id
    }

    pub fn drive_velocity(&self) -> f32 {
        self.settings.drive_velocity
    }

    /// Set the target angular velocity of the drive, in rad/s.
    ///
    /// Sleeping dynamic endpoints are woken first. The first call enables the drive.
    pub fn set_drive_velocity(&mut self, velocity: f32) -> Result<()> {
        if !velocity.is_finite() {
            return Err(PhysicsError::invalid(
                "set_drive_velocity",
                format!("velocity must be finite, got {velocity}"),
            ));
        }
        for body in self.bodies {
            if self.world.wake_up(body) {
                log::debug!("{}: woke an endpoint for the drive", self.id);
            }
        }
        self.settings.drive_velocity = velocity;
        self.settings.drive_enabled = true;
        if let Some(joint) = self.world.joint_mut(self.handle) {
            joint
                .data
                .set_motor_velocity(JointAxis::AngX, velocity, DRIVE_DAMPING);
        }
        Ok(())
    }

    pub fn drive_enabled(&self) -> bool {
        self.settings.drive_enabled
    }

    /// Switch the drive off. The last velocity is kept for `drive_velocity`.
    pub fn disable_drive(&mut self) {
        self.settings.drive_enabled = false;
        if let Some(joint) = self.world.joint_mut(self.handle) {
            joint.data.motor_axes.remove(JointAxesMask::ANG_X);
        }
    }

    /// Lower and upper rotation limits in radians. Enables the limit.
    pub fn set_limits(&mut self, lower: f32, upper: f32) -> Result<()> {
        const CONTEXT: &str = "set_limits";
        if !lower.is_finite() || !upper.is_finite() {
            return Err(PhysicsError::invalid(CONTEXT, "limits must be finite"));
        }
        if lower > upper {
            return Err(PhysicsError::invalid(
                CONTEXT,
                format!("lower limit {lower} exceeds upper limit {upper}"),
            ));
        }
        self.settings.lower_limit = lower;
        self.settings.upper_limit = upper;
        self.settings.limit_enabled = true;
        if let Some(joint) = self.world.joint_mut(self.handle) {
            joint.data.set_limits(JointAxis::AngX, [lower, upper]);
        }
        Ok(())
    }

    pub fn limits(&self) -> (f32, f32) {
        (self.settings.lower_limit, self.settings.upper_limit)
    }

    pub fn limit_enabled(&self) -> bool {
        self.settings.limit_enabled
    }

    pub fn disable_limits(&mut self) {
        self.settings.limit_enabled = false;
        if let Some(joint) = self.world.joint_mut(self.handle) {
            joint.data.limit_axes.remove(JointAxesMask::ANG_X);
        }
    }
}
