//! Procedural terrain and wave-equation water surfaces.
//!
//! The terrain grid is produced by fractal midpoint displacement, particle
//! erosion, smoothing and normal estimation. The water grid is advanced
//! every fixed tick by an explicit 2D wave stencil whose boundary follows
//! the terrain coastline. Both are exposed as triangle lists for a renderer.

use bevy::prelude::*;

pub mod config;
pub mod erosion;
pub mod error;
pub mod fractal;
pub mod height_grid;
pub mod invariant_checks;
pub mod mesh;
pub mod normals;
pub mod sim_rng;
pub mod simulation_sets;
pub mod smoothing;
pub mod terrain;
pub mod test_harness;
pub mod wave;
pub mod world_init;

pub use simulation_sets::SimulationSet;

// ---------------------------------------------------------------------------
// Core resources
// ---------------------------------------------------------------------------

/// Global tick counter incremented each FixedUpdate.
#[derive(Resource, Default)]
pub struct TickCounter(pub u64);

pub fn advance_tick(mut tick: ResMut<TickCounter>) {
    tick.0 = tick.0.wrapping_add(1);
}

pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<TickCounter>()
            .configure_sets(
                FixedUpdate,
                (
                    SimulationSet::PreSim,
                    SimulationSet::Simulation,
                    SimulationSet::PostSim,
                )
                    .chain(),
            )
            .add_systems(
                FixedUpdate,
                advance_tick
                    .before(terrain::handle_generate_requests)
                    .in_set(SimulationSet::PreSim),
            );

        app.add_plugins((
            sim_rng::SimRngPlugin,
            terrain::TerrainPlugin,
            wave::FluidPlugin,
            invariant_checks::InvariantChecksPlugin,
            world_init::WorldInitPlugin,
        ));
    }
}
