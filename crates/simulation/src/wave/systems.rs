use bevy::prelude::*;
use rand::Rng;

use crate::config::{FLUID_SCALE, RAIN_DROPS_PER_BURST, RAIN_INTERVAL_TICKS, TERRAIN_SIZE};
use crate::error::GridResult;
use crate::height_grid::HeightField;
use crate::mesh::{tessellate, MeshData};
use crate::normals::calculate_normals;
use crate::sim_rng::SimRng;
use crate::terrain::{Terrain, TerrainGenerated};
use crate::TickCounter;

use super::fluid::FluidGrid;
use super::params::{StencilCoefficients, WaveParams};

// =============================================================================
// Resources
// =============================================================================

/// The simulated water surface plus the stencil coefficients currently in
/// use.
#[derive(Resource, Debug, Clone)]
pub struct Fluid {
    pub grid: FluidGrid,
    coefficients: StencilCoefficients,
    courant_squared: f32,
}

impl Default for Fluid {
    fn default() -> Self {
        Self::new(TERRAIN_SIZE, FLUID_SCALE, &WaveParams::default())
    }
}

impl Fluid {
    pub fn new(size: usize, scale: f32, params: &WaveParams) -> Self {
        Self {
            grid: FluidGrid::new(size, scale),
            coefficients: params.coefficients(),
            courant_squared: params.courant_squared(),
        }
    }

    pub fn apply_params(&mut self, params: &WaveParams) {
        self.coefficients = params.coefficients();
        self.courant_squared = params.courant_squared();
    }

    pub fn coefficients(&self) -> StencilCoefficients {
        self.coefficients
    }

    /// Advance one tick and refresh normals.
    pub fn step(&mut self) -> GridResult<()> {
        self.grid.step(&self.coefficients)?;
        calculate_normals(&mut self.grid)
    }

    pub fn add_water(&mut self, x: usize, z: usize, amount: f32) -> GridResult<()> {
        self.grid.add_water(x, z, amount)
    }

    pub fn energy(&self) -> f64 {
        self.grid.energy(self.courant_squared)
    }

    pub fn mesh_data(&self) -> MeshData {
        tessellate(&self.grid)
    }
}

/// Per-tick summary of the water surface.
#[derive(Resource, Debug, Default, Clone, Copy)]
pub struct FluidStats {
    pub ticks: u64,
    pub total_mass: f64,
    pub total_abs_mass: f64,
    pub peak: f32,
    pub energy: f64,
    pub boundary_cells: usize,
}

/// Periodic random drops.
#[derive(Resource, Debug, Clone, Copy)]
pub struct RainSettings {
    pub enabled: bool,
    pub interval_ticks: u64,
    pub drops_per_burst: u32,
}

impl Default for RainSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_ticks: RAIN_INTERVAL_TICKS,
            drops_per_burst: RAIN_DROPS_PER_BURST,
        }
    }
}

/// Add `amount` of water at cell `(x, z)`.
#[derive(Event, Debug, Clone, Copy)]
pub struct AddWaterRequest {
    pub x: usize,
    pub z: usize,
    pub amount: f32,
}

// =============================================================================
// Systems
// =============================================================================

/// Recompute stencil coefficients when `WaveParams` changes.
pub fn sync_wave_params(params: Res<WaveParams>, mut fluid: ResMut<Fluid>) {
    if !params.is_changed() {
        return;
    }
    if !params.is_stable() {
        warn!(
            "Wave parameters are unstable (courant^2 = {:.3} > 0.5); the surface will diverge",
            params.courant_squared()
        );
    }
    fluid.apply_params(&params);
    debug!("Wave coefficients: {:?}", fluid.coefficients());
}

/// Re-mark boundary cells after the terrain changed.
pub fn sync_fluid_borders(
    mut generated: EventReader<TerrainGenerated>,
    terrain: Res<Terrain>,
    mut fluid: ResMut<Fluid>,
) {
    if generated.read().last().is_none() {
        return;
    }
    match fluid.grid.set_borders(terrain.height_grid()) {
        Ok(count) => info!("Fluid borders synced: {count} boundary cells"),
        Err(e) => warn!("Could not sync fluid borders: {e}"),
    }
}

pub fn apply_add_water_requests(
    mut requests: EventReader<AddWaterRequest>,
    mut fluid: ResMut<Fluid>,
) {
    for req in requests.read() {
        if let Err(e) = fluid.add_water(req.x, req.z, req.amount) {
            warn!("Rejected add_water({}, {}, {}): {e}", req.x, req.z, req.amount);
        }
    }
}

/// Every `interval_ticks`, drop a few random amounts in `[0, 2)` on random
/// interior cells. Drops landing on a boundary cell are discarded.
pub fn rain_drops(
    settings: Res<RainSettings>,
    tick: Res<TickCounter>,
    mut rng: ResMut<SimRng>,
    mut fluid: ResMut<Fluid>,
) {
    if !settings.enabled
        || settings.interval_ticks == 0
        || !tick.0.is_multiple_of(settings.interval_ticks)
    {
        return;
    }
    let n = fluid.grid.size();
    if n < 3 {
        return;
    }
    for _ in 0..settings.drops_per_burst {
        let amount = rng.rng.gen_range(0..20) as f32 / 10.0;
        let x = rng.rng.gen_range(1..n - 1);
        let z = rng.rng.gen_range(1..n - 1);
        if fluid.add_water(x, z, amount).is_err() {
            trace!("Rain drop at ({x}, {z}) hit a boundary cell");
        }
    }
}

/// Advance the water surface by one tick.
pub fn step_fluid(mut fluid: ResMut<Fluid>) {
    if let Err(e) = fluid.step() {
        warn!("Fluid step failed, surface left at previous tick: {e}");
    }
}

pub fn update_fluid_stats(fluid: Res<Fluid>, mut stats: ResMut<FluidStats>) {
    let grid = &fluid.grid;
    let (lo, hi) = grid.min_max();
    stats.ticks += 1;
    stats.total_mass = grid.total_mass();
    stats.total_abs_mass = grid.total_abs_mass();
    stats.peak = lo.abs().max(hi.abs());
    stats.energy = fluid.energy();
    stats.boundary_cells = grid.boundary_count();
}

// =============================================================================
// Plugin
// =============================================================================

pub struct FluidPlugin;

impl Plugin for FluidPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Fluid>()
            .init_resource::<WaveParams>()
            .init_resource::<FluidStats>()
            .init_resource::<RainSettings>()
            .add_event::<AddWaterRequest>()
            .add_systems(
                FixedUpdate,
                (
                    sync_wave_params,
                    sync_fluid_borders,
                    apply_add_water_requests,
                    rain_drops,
                )
                    .chain()
                    .after(crate::terrain::handle_generate_requests)
                    .in_set(crate::SimulationSet::PreSim),
            )
            .add_systems(
                FixedUpdate,
                step_fluid.in_set(crate::SimulationSet::Simulation),
            )
            .add_systems(
                FixedUpdate,
                update_fluid_stats.in_set(crate::SimulationSet::PostSim),
            );
    }
}
