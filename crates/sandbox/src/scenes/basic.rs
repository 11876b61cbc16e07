//! A ground plane and two boxes: one resting, one dropped from 10 m.

use crate::layouts;
use engine_core::{Pose, Vec3};
use physics::{Actor, ActorId, ActorKind, Geometry, Result, Scene, SceneContent};

#[derive(Debug, Default)]
pub struct BasicScene {
    dropped: Option<ActorId>,
}

impl BasicScene {
    pub fn tracked(&self) -> Option<ActorId> {
        self.dropped
    }
}

impl SceneContent for BasicScene {
    fn custom_init(&mut self, scene: &mut Scene) -> Result<()> {
        let material = scene.default_material().clone();
        let world = scene.world_mut();

        let mut plane =
            Actor::new_static(world, &Pose::from_plane(Vec3::Y, 0.0)).with_name("plane");
        plane.create_shape(world, Geometry::Plane, &material, None)?;

        let unit_box = layouts::single(ActorKind::Dynamic, Geometry::cuboid(0.5, 0.5, 0.5));
        let dropped =
            Actor::from_layout(world, &unit_box, &Pose::at(0.0, 10.0, 0.0), &material, 1.0)?
                .with_name("dynamic box");
        let resting =
            Actor::from_layout(world, &unit_box, &Pose::at(3.0, 0.5, 0.0), &material, 1.0)?
                .with_name("dynamic box 2");
        log::info!("Mass of dynamic box: {:.2}", dropped.mass(world)?);

        scene.add(plane)?;
        let id = scene.add(dropped)?;
        scene.add(resting)?;
        scene.watch_sleep(id)?;
        self.dropped = Some(id);
        Ok(())
    }
}
