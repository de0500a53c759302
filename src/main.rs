//! Headless demo: a turret fires projectiles from a background thread while
//! the main thread steps the simulation.

use std::f32::consts::TAU;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use projectile_pool::prelude::*;

const FRAMES: u32 = 240;
const SHOTS: u32 = 600;

fn demo_config() -> SimulationConfig {
    SimulationConfig::default()
        .with_pools(PoolConfig::default().with_initial_pool_size(40))
        .with_projectile("fireball", ProjectileSpec::new(1.5, 1200.0))
        .with_prewarm("fireball", 40)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match std::env::args().nth(1) {
        Some(path) => {
            log::info!("Loading config from {path}");
            SimulationConfig::load_ron(path)?
        }
        None => demo_config(),
    };

    let mut sim = Simulation::new(config)?;
    let mut world = hecs::World::new();
    let turret = world.spawn(("turret",));
    let target = world.spawn(("target",));

    let registry = Arc::clone(sim.registry());
    let kinds: Vec<ProjectileKind> = sim.config().projectiles.keys().cloned().collect();
    if kinds.is_empty() {
        return Err("config defines no projectiles".into());
    }

    let spawner = thread::spawn(move || {
        let (mut fired, mut refused, mut hits) = (0_u32, 0_u32, 0_u32);

        for shot in 0..SHOTS {
            let angle = shot as f32 / SHOTS as f32 * TAU;
            let request = SpawnRequest::new(
                kinds[shot as usize % kinds.len()].clone(),
                ProjectileData::new()
                    .with_instigator(turret)
                    .with_damage(DamageParams::new(10.0, 2.0)),
                Placement::new(Vec3::ZERO, Vec3::new(angle.cos(), 0.0, angle.sin())),
            );

            match registry.spawn(request) {
                Ok(handle) => {
                    fired += 1;
                    // Every seventh shot strikes the target straight away
                    if shot % 7 == 0
                        && let Some(impact) = handle.lock().handle_impact(target)
                    {
                        hits += 1;
                        log::debug!("Impact for {} damage", impact.damage.base_damage);
                    }
                }
                Err(PoolError::Exhausted { .. }) => refused += 1,
                Err(e) => {
                    log::error!("Spawner stopping: {e}");
                    break;
                }
            }

            thread::sleep(Duration::from_micros(400));
        }

        (fired, refused, hits)
    });

    let frame = Duration::from_secs_f32(1.0 / 60.0);
    for index in 0..FRAMES {
        sim.advance(frame);
        if index % 60 == 0 {
            log::info!("{}", sim.stats());
        }
        thread::sleep(Duration::from_millis(1));
    }

    let (fired, refused, hits) = spawner
        .join()
        .map_err(|_| "spawner thread panicked")?;
    log::info!("Fired {fired}, refused {refused}, hits {hits}");

    for kind in sim.registry().variants() {
        log::info!(
            "{kind}: {} pooled, {} free, {} active",
            sim.registry().pool_size(&kind).unwrap_or(0),
            sim.registry().free_count(&kind).unwrap_or(0),
            sim.registry().active_count_for(&kind)
        );
    }

    sim.shutdown();
    Ok(())
}
