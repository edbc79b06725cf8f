//! Drives a single simulated body straight at a fixed target, bypassing the
//! swarm control loop entirely. Checks that the bridge accepts position
//! pushes and reports sane states back.

use std::time::Duration;

use anyhow::Context;
use log::info;
use nalgebra::Vector3;

use formation_sim::sim::{KinematicBridge, SimulatorBridge};
use formation_sim::swarm::{Quadcopter, Role};

const BODY_NAME: &str = "Quadcopter[1]";
/// Drive speed, units per second.
const SPEED: f64 = 1.0;
const TICK_S: f64 = 0.05;
const TICKS: usize = 100;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let target = Vector3::new(200.0, 200.0, 100.0);

    let mut bridge = KinematicBridge::new(TICK_S);
    bridge.connect()?;
    bridge.start_simulation()?;
    let handles = bridge.setup_handles(&[BODY_NAME.to_string()], "Cylinder")?;
    let handle = *handles.first().context("no handle resolved")?;

    let mut quad = Quadcopter::new(1, handle, Vector3::zeros(), Role::Follower);
    bridge.set_all_quad_positions(std::slice::from_ref(&quad))?;

    let direction = target - quad.position;
    let distance = direction.norm();
    if distance == 0.0 {
        info!("body already at the target");
        bridge.stop_simulation()?;
        return Ok(());
    }
    let step_vec = direction * (SPEED * TICK_S / distance);

    info!(
        "driving {BODY_NAME} for {TICKS} ticks toward ({:.1}, {:.1}, {:.1})",
        target.x, target.y, target.z
    );
    for tick in 0..TICKS {
        let state = bridge
            .get_all_quad_states()?
            .into_iter()
            .next()
            .context("bridge returned no body state")?;
        quad.update_state(state.position, state.velocity);

        quad.position += step_vec;
        bridge.set_all_quad_positions(std::slice::from_ref(&quad))?;
        bridge.step_simulation()?;

        if tick % 20 == 0 {
            info!(
                "tick {tick:>3}: position ({:.2}, {:.2}, {:.2}) velocity ({:.2}, {:.2}, {:.2})",
                quad.position.x,
                quad.position.y,
                quad.position.z,
                quad.velocity.x,
                quad.velocity.y,
                quad.velocity.z,
            );
        }
        std::thread::sleep(Duration::from_secs_f64(TICK_S));
    }

    let travelled = quad.position.norm();
    info!(
        "done: travelled {travelled:.2} units, {:.2} short of the target",
        (target - quad.position).norm()
    );
    bridge.stop_simulation()?;
    Ok(())
}
