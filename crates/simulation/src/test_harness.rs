//! # TestWorld: headless harness for terrain and water tests
//!
//! Wraps `bevy::app::App` + `SimulationPlugin` so integration tests can
//! drive fixed ticks and inspect resources without a window or renderer.

use bevy::app::App;
use bevy::prelude::*;

use crate::sim_rng::SimRng;
use crate::terrain::Terrain;
use crate::wave::{Fluid, RainSettings};
use crate::world_init::WorldSettings;
use crate::SimulationPlugin;

/// A headless Bevy App wrapping `SimulationPlugin`.
pub struct TestWorld {
    app: App,
}

impl TestWorld {
    /// Flat terrain and still water of side `size`. Rain is off.
    pub fn new(size: usize) -> Self {
        Self::build(
            WorldSettings {
                size,
                generate_terrain: false,
                seed_disturbances: false,
            },
            None,
        )
    }

    /// Generated fractal terrain of side `size` from `seed`, water fitted to
    /// it. Rain is off.
    pub fn with_terrain(size: usize, seed: u64) -> Self {
        Self::build(
            WorldSettings {
                size,
                generate_terrain: true,
                seed_disturbances: false,
            },
            Some(seed),
        )
    }

    fn build(settings: WorldSettings, seed: Option<u64>) -> Self {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);

        // Inserted BEFORE SimulationPlugin so its init_resource calls keep them.
        app.insert_resource(settings);
        app.insert_resource(RainSettings {
            enabled: false,
            ..Default::default()
        });
        if let Some(seed) = seed {
            app.insert_resource(SimRng::from_seed_u64(seed));
        }
        app.add_plugins(SimulationPlugin);

        // Run one update so Startup systems execute.
        app.update();
        Self { app }
    }

    /// Run `n` fixed ticks.
    pub fn tick(&mut self, n: u32) {
        for _ in 0..n {
            self.app.world_mut().run_schedule(FixedUpdate);
        }
    }

    pub fn send<E: Event>(&mut self, event: E) {
        self.app.world_mut().send_event(event);
    }

    pub fn resource<R: Resource>(&self) -> &R {
        self.app.world().resource::<R>()
    }

    pub fn resource_mut<R: Resource>(&mut self) -> Mut<'_, R> {
        self.app.world_mut().resource_mut::<R>()
    }

    pub fn terrain(&self) -> &Terrain {
        self.resource::<Terrain>()
    }

    pub fn fluid(&self) -> &Fluid {
        self.resource::<Fluid>()
    }

    pub fn fluid_mut(&mut self) -> Mut<'_, Fluid> {
        self.resource_mut::<Fluid>()
    }

    pub fn app_mut(&mut self) -> &mut App {
        &mut self.app
    }
}
