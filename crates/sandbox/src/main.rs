//! Rugby sandbox: builds one of the demo scenes and steps it, printing the tracked
//! actor's pose and velocity like a console visualiser.

mod config;
mod layouts;
mod scenes;

use anyhow::{Context, Result};
use config::SandboxConfig;
use engine_core::StepClock;
use physics::{ActorId, Scene, Simulation, StepReport};
use scenes::SandboxScene;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = SandboxConfig::load();
    log::info!(
        "Starting rugby sandbox: {:?} scene at {} Hz",
        config.scene,
        config.step_rate_hz
    );

    let content = SandboxScene::new(config.scene);
    let mut sim = Simulation::new(config.physics, content).context("creating the physics scene")?;
    sim.initialize().context("populating the scene")?;
    let tracked = sim.content().tracked();

    let dt = config.dt();
    let mut clock = StepClock::new(config.step_rate_hz);
    let mut steps = 0u64;
    while config.max_steps == 0 || steps < config.max_steps {
        if config.realtime {
            clock.update();
            while clock.should_fixed_update()
                && (config.max_steps == 0 || steps < config.max_steps)
            {
                let report = sim.step(dt).context("simulation step failed")?;
                print_step(sim.scene(), tracked, &report, config.print_every);
                steps += 1;
            }
            std::thread::sleep(clock.time_until_next_step());
        } else {
            let report = sim.step(dt).context("simulation step failed")?;
            print_step(sim.scene(), tracked, &report, config.print_every);
            steps += 1;
        }
    }

    for snapshot in sim.scene().snapshot() {
        log::info!(
            "{} '{}': {} shape(s) at {:.2?}{}",
            snapshot.id,
            snapshot.name,
            snapshot.shape_count,
            snapshot.pose.position,
            if snapshot.sleeping { ", asleep" } else { "" }
        );
    }
    sim.scene_mut().release();
    Ok(())
}

/// Print the tracked actor and any sleep transitions of this step.
fn print_step(scene: &Scene, tracked: Option<ActorId>, report: &StepReport, every: u64) {
    for t in &report.transitions {
        let state = if t.asleep { "asleep" } else { "awake" };
        println!("{} - {} is now {state}", report.step, t.name);
    }
    if report.step % every != 0 {
        return;
    }
    let Some(actor) = tracked.and_then(|id| scene.actor(id).ok()) else {
        return;
    };
    let (Ok(p), Ok(v)) = (
        actor.global_pose(scene.world()),
        actor.linear_velocity(scene.world()),
    ) else {
        return;
    };
    println!(
        "{} - x={:.2}, y={:.2}, z={:.2},  vx={:.2}, vy={:.2}, vz={:.2}",
        report.step, p.position.x, p.position.y, p.position.z, v.x, v.y, v.z
    );
}
