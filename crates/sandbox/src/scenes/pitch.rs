//! Rugby pitch: grass plane, line markings, barriers, goal, a ball and a catapult at half-way.

use crate::layouts;
use engine_core::{Color, Pose, Vec3};
use physics::{
    Actor, ActorId, CompoundLayout, Geometry, MaterialRef, Result, Scene, SceneContent,
    Visualization,
};

const GRASS_GREEN: Color = Color(Vec3::new(0.0, 210.0 / 255.0, 0.0));
const LINE_WHITE: Color = Color(Vec3::new(191.0 / 255.0, 191.0 / 255.0, 191.0 / 255.0));
const LEATHER_BROWN: Color = Color(Vec3::new(140.0 / 255.0, 83.0 / 255.0, 62.0 / 255.0));

#[derive(Debug, Default)]
pub struct PitchScene {
    ball: Option<ActorId>,
}

impl PitchScene {
    pub fn tracked(&self) -> Option<ActorId> {
        self.ball
    }
}

/// Build `layout` at `pose`, then give it a color and register it.
fn place(
    scene: &mut Scene,
    name: &str,
    layout: &CompoundLayout,
    pose: Pose,
    material: &MaterialRef,
    color: Color,
) -> Result<ActorId> {
    let mut actor = Actor::from_layout(scene.world_mut(), layout, &pose, material, 1.0)?
        .with_name(name);
    actor.set_color(color);
    scene.add(actor)
}

impl SceneContent for PitchScene {
    fn custom_init(&mut self, scene: &mut Scene) -> Result<()> {
        let visualization = Visualization {
            scale: 1.0,
            collision_shapes: true,
            actor_axes: true,
            body_lin_velocity: true,
            ..*scene.visualization()
        };
        scene.set_visualization(visualization)?;

        let rubber = scene.create_material(0.9, 0.65, 0.828)?;
        let grass = scene.create_material(0.35, 0.5, 0.0)?;
        let wood = scene.create_material(0.5, 0.48, 0.6)?;
        let metal = scene.create_material(0.8, 0.42, 0.6)?;
        let lines = scene.default_material().clone();

        let world = scene.world_mut();
        let mut plane =
            Actor::new_static(world, &Pose::from_plane(Vec3::Y, 0.0)).with_name("pitch");
        plane.create_shape(world, Geometry::Plane, &grass, None)?;
        plane.set_color(GRASS_GREEN);
        scene.add(plane)?;

        // Markings
        place(
            scene,
            "inner pitch lines",
            &layouts::inner_pitch_lines(),
            Pose::IDENTITY,
            &lines,
            LINE_WHITE,
        )?;
        place(
            scene,
            "outer pitch lines",
            &layouts::outer_pitch_lines(),
            Pose::IDENTITY,
            &lines,
            LINE_WHITE,
        )?;

        // Stands around the field
        place(
            scene,
            "inner barriers",
            &layouts::inner_barrier_lines(),
            Pose::IDENTITY,
            &lines,
            Color::DEFAULT,
        )?;
        place(
            scene,
            "outer barriers",
            &layouts::outer_barrier_lines(),
            Pose::IDENTITY,
            &lines,
            Color::DEFAULT,
        )?;

        // Goal
        place(scene, "goal posts", &layouts::goal_posts(), Pose::IDENTITY, &metal, Color::WHITE)?;
        place(
            scene,
            "goal crossbar",
            &layouts::goal_crossbar(),
            Pose::IDENTITY,
            &metal,
            Color::WHITE,
        )?;

        let ball = place(
            scene,
            "rugby ball",
            &layouts::rugby_ball(),
            Pose::at(0.0, 2.0, layouts::HALF_WAY_Z + 4.0),
            &rubber,
            LEATHER_BROWN,
        )?;
        place(
            scene,
            "ball catapult",
            &layouts::ball_catapult(),
            Pose::at(0.0, 0.0, layouts::HALF_WAY_Z),
            &wood,
            Color::BLACK,
        )?;

        scene.watch_sleep(ball)?;
        self.ball = Some(ball);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use physics::{SceneConfig, Simulation};

    #[test]
    fn pitch_is_populated_with_shared_materials() {
        let mut sim = Simulation::new(SceneConfig::default(), PitchScene::default()).unwrap();
        sim.initialize().unwrap();
        let scene = sim.scene();

        assert_eq!(scene.actor_count(), 9);
        // Default material plus rubber, grass, wood and metal.
        assert_eq!(scene.materials().len(), 5);
        assert!(scene.visualization().actor_axes);
        assert!(scene.visualization().body_lin_velocity);

        let ball = scene.actor(sim.content().tracked().unwrap()).unwrap();
        assert_eq!(ball.shape_count(), 5);
        assert_eq!(ball.shape(0).unwrap().material().restitution(), 0.828);
    }

    #[test]
    fn ball_stays_above_the_pitch() {
        let mut sim = Simulation::new(SceneConfig::default(), PitchScene::default()).unwrap();
        sim.initialize().unwrap();
        for _ in 0..240 {
            sim.step(1.0 / 60.0).unwrap();
        }
        let ball = sim.content().tracked().unwrap();
        let pose = sim.scene().global_pose(ball).unwrap();
        assert!(pose.position.y > 0.0, "ball sank to {}", pose.position.y);
    }
}
