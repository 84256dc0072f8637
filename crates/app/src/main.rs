use bevy::prelude::*;
use bevy::window::PresentMode;

use simulation::sim_rng::SimRng;
use simulation::world_init::WorldSettings;

/// Water ticks per second.
const SIMULATION_HZ: f64 = 60.0;

fn main() {
    let mut app = App::new();

    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: "Tidepool".to_string(),
            resolution: (1280.0, 720.0).into(),
            present_mode: PresentMode::AutoVsync,
            ..default()
        }),
        ..default()
    }))
    .insert_resource(Time::<Fixed>::from_hz(SIMULATION_HZ));

    // Seed and grid size overrides, read before the simulation initialises
    // its own defaults.
    if let Some(seed) = env_parse::<u64>("TIDEPOOL_SEED") {
        app.insert_resource(SimRng::from_seed_u64(seed));
    }
    if let Some(size) = env_parse::<usize>("TIDEPOOL_SIZE") {
        app.insert_resource(WorldSettings {
            size,
            ..default()
        });
    }

    app.add_plugins((simulation::SimulationPlugin, rendering::RenderingPlugin));

    app.run();
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.parse() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!("Ignoring {key}={raw}: not a valid value");
            None
        }
    }
}
