//! Jointed contraptions on a plain ground plane.
//!
//! A truncheon swings from a frame on a driven hinge, a catapult arm is hinged to the
//! world with limits and fires once, a box bobs on a spring, and a few loose compounds
//! (knights, pitchfork, a cooked pyramid, a triangle-mesh ramp) fill the floor.

use crate::layouts;
use engine_core::{Color, Pose, Vec3};
use physics::{
    Actor, ActorId, ActorKind, CompoundLayout, Geometry, JointId, MaterialRef, MeshCooker,
    Result, Scene, SceneContent,
};
use std::f32::consts::FRAC_PI_2;

/// Step at which the swing drive starts, and when it is switched off again.
const SWING_DRIVE: (u64, u64) = (60, 240);
/// Step at which the catapult fires, and when its drive is released.
const CATAPULT_FIRE: (u64, u64) = (120, 150);

const CATAPULT_HINGE: Vec3 = Vec3::new(8.0, 1.0, 0.0);
const SPRING_ANCHOR: Vec3 = Vec3::new(-8.0, 7.0, 0.0);

#[derive(Debug, Default)]
pub struct PlaygroundScene {
    spring_box: Option<ActorId>,
    swing: Option<JointId>,
    catapult: Option<JointId>,
    spring: Option<JointId>,
}

impl PlaygroundScene {
    pub fn tracked(&self) -> Option<ActorId> {
        self.spring_box
    }

    fn build(
        scene: &mut Scene,
        name: &str,
        layout: &CompoundLayout,
        pose: Pose,
        material: &MaterialRef,
    ) -> Result<ActorId> {
        let actor = Actor::from_layout(scene.world_mut(), layout, &pose, material, 1.0)?
            .with_name(name);
        scene.add(actor)
    }

    fn build_meshes(scene: &mut Scene, material: &MaterialRef) -> Result<ActorId> {
        let cooker = MeshCooker::new();
        let pyramid = cooker.cook_convex(&layouts::pyramid_points())?;
        let (vertices, indices) = layouts::ramp_mesh();
        let ramp = cooker.cook_triangle_mesh(&vertices, &indices)?;

        let ramp_layout = layouts::single(ActorKind::Static, Geometry::TriangleMesh(ramp));
        Self::build(scene, "ramp", &ramp_layout, Pose::at(-4.0, 0.0, -8.0), material)?;

        let pyramid_layout = layouts::single(ActorKind::Dynamic, Geometry::ConvexMesh(pyramid));
        Self::build(scene, "pyramid", &pyramid_layout, Pose::at(-4.0, 3.0, -9.0), material)
    }
}

impl SceneContent for PlaygroundScene {
    fn custom_init(&mut self, scene: &mut Scene) -> Result<()> {
        let wood = scene.create_material(0.5, 0.48, 0.6)?;
        let metal = scene.create_material(0.8, 0.42, 0.6)?;
        let rubber = scene.create_material(0.9, 0.65, 0.828)?;
        let ground_material = scene.default_material().clone();

        let world = scene.world_mut();
        let mut ground =
            Actor::new_static(world, &Pose::from_plane(Vec3::Y, 0.0)).with_name("ground");
        ground.create_shape(world, Geometry::Plane, &ground_material, None)?;
        ground.set_color(Color::rgb8(0, 160, 0));
        scene.add(ground)?;

        // Swing: a truncheon hanging from the top bar.
        Self::build(scene, "swing posts", &layouts::swing_posts(), Pose::IDENTITY, &wood)?;
        let top_bar = Self::build(
            scene,
            "swing top bar",
            &layouts::swing_top_bar(),
            Pose::IDENTITY,
            &wood,
        )?;
        let truncheon = Self::build(
            scene,
            "truncheon",
            &layouts::truncheon(),
            Pose::at(0.0, 6.0, 0.0),
            &metal,
        )?;
        let swing = scene.create_revolute_joint(
            Some(top_bar),
            &Pose::at(0.0, 6.9, 0.0),
            truncheon,
            &Pose::at(0.0, 0.9, 0.0),
        )?;
        scene.revolute_joint(swing)?.set_limits(-FRAC_PI_2, FRAC_PI_2)?;

        // Catapult arm hinged to the world, loaded with a ball on its cup.
        let arm = Self::build(
            scene,
            "catapult arm",
            &layouts::ball_catapult(),
            Pose::from_position(CATAPULT_HINGE),
            &wood,
        )?;
        let catapult = scene.create_revolute_joint(
            None,
            &Pose::from_position(CATAPULT_HINGE),
            arm,
            &Pose::IDENTITY,
        )?;
        scene.revolute_joint(catapult)?.set_limits(-0.9, 0.2)?;
        Self::build(
            scene,
            "rugby ball",
            &layouts::rugby_ball(),
            Pose::from_position(CATAPULT_HINGE + Vec3::new(0.0, 0.6, 3.5)),
            &rubber,
        )?;

        // Box on a spring below a world anchor.
        let unit_box = layouts::single(ActorKind::Dynamic, Geometry::cuboid(0.5, 0.5, 0.5));
        let spring_box = Self::build(
            scene,
            "spring box",
            &unit_box,
            Pose::from_position(SPRING_ANCHOR - Vec3::new(0.0, 3.0, 0.0)),
            &metal,
        )?;
        let spring = scene.create_distance_joint(
            None,
            &Pose::from_position(SPRING_ANCHOR),
            spring_box,
            &Pose::IDENTITY,
        )?;
        {
            let mut view = scene.distance_joint(spring)?;
            view.set_rest_length(2.0)?;
            view.set_stiffness(40.0)?;
            view.set_damping(2.0)?;
        }

        // Loose objects.
        let knights = Self::build(
            scene,
            "knights",
            &layouts::knights(),
            Pose::at(0.0, 1.0, -14.0),
            &wood,
        )?;
        Self::build(
            scene,
            "pitchfork",
            &layouts::pitchfork(),
            Pose::at(4.0, 3.0, -6.0),
            &metal,
        )?;
        Self::build(
            scene,
            "compound pair",
            &layouts::compound_pair(),
            Pose::at(6.0, 0.0, -10.0),
            &wood,
        )?;
        let pyramid = Self::build_meshes(scene, &wood)?;

        scene.watch_sleep(knights)?;
        scene.watch_sleep(pyramid)?;
        scene.watch_sleep(spring_box)?;

        self.spring_box = Some(spring_box);
        self.swing = Some(swing);
        self.catapult = Some(catapult);
        self.spring = Some(spring);
        Ok(())
    }

    fn custom_update(&mut self, scene: &mut Scene) -> Result<()> {
        let step = scene.step_count();
        if let Some(swing) = self.swing {
            if step == SWING_DRIVE.0 {
                log::info!("swing drive on");
                scene.revolute_joint(swing)?.set_drive_velocity(2.0)?;
            } else if step == SWING_DRIVE.1 {
                log::info!("swing drive off");
                scene.revolute_joint(swing)?.disable_drive();
            }
        }
        if let Some(catapult) = self.catapult {
            if step == CATAPULT_FIRE.0 {
                log::info!("catapult fired");
                scene.revolute_joint(catapult)?.set_drive_velocity(-8.0)?;
            } else if step == CATAPULT_FIRE.1 {
                scene.revolute_joint(catapult)?.disable_drive();
            }
        }
        Ok(())
    }
}
