// =============================================================================
// World setup: size the grids, generate the first terrain, fit the water
// surface to it and seed a few starting ripples.
// =============================================================================

use bevy::prelude::*;

use crate::config::{FLUID_SCALE, TERRAIN_SIZE};
use crate::sim_rng::SimRng;
use crate::terrain::{GenerationMode, GenerationParams, Terrain, TerrainGenerated};
use crate::wave::{Fluid, WaveParams};

/// Startup options. Insert before `SimulationPlugin` to override.
#[derive(Resource, Debug, Clone, Copy)]
pub struct WorldSettings {
    /// Side length of both grids; must be `2^k + 1`.
    pub size: usize,
    pub generate_terrain: bool,
    pub seed_disturbances: bool,
}

impl Default for WorldSettings {
    fn default() -> Self {
        Self {
            size: TERRAIN_SIZE,
            generate_terrain: true,
            seed_disturbances: true,
        }
    }
}

pub fn init_world(
    settings: Res<WorldSettings>,
    params: Res<GenerationParams>,
    wave: Res<WaveParams>,
    mut rng: ResMut<SimRng>,
    mut terrain: ResMut<Terrain>,
    mut fluid: ResMut<Fluid>,
    mut generated: EventWriter<TerrainGenerated>,
) {
    if terrain.size() != settings.size {
        match Terrain::new(settings.size) {
            Ok(t) => {
                *terrain = t;
                *fluid = Fluid::new(settings.size, FLUID_SCALE, &wave);
            }
            Err(e) => warn!(
                "Ignoring world size {}: {e}; using {}",
                settings.size,
                terrain.size()
            ),
        }
    }

    if settings.generate_terrain {
        match terrain.generate(&params, GenerationMode::Fractal, &mut rng.rng) {
            Ok(summary) => {
                info!(
                    "Initial terrain (seed {}, {}x{}): heights {:.2}..{:.2}",
                    rng.seed,
                    terrain.size(),
                    terrain.size(),
                    summary.min,
                    summary.max
                );
                generated.send(TerrainGenerated {
                    summary,
                    generation: terrain.generation,
                });
            }
            Err(e) => warn!("Initial terrain generation failed: {e}"),
        }
    }

    if let Err(e) = fluid.grid.set_borders(terrain.height_grid()) {
        warn!("Could not fit water to terrain: {e}");
    }
    if settings.seed_disturbances {
        fluid.grid.seed_disturbances();
    }
}

pub struct WorldInitPlugin;

impl Plugin for WorldInitPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<WorldSettings>()
            .add_systems(Startup, init_world);
    }
}
