//! Terrain heightfield generation.
//!
//! The default pipeline layers fractal octaves, carves basins with
//! subsidence particles, raises ridges with uplift particles, relaxes the
//! result with a few smoothing passes and finally derives normals. All work
//! happens on a scratch copy; the live grid is replaced only when every
//! stage succeeds, so a failed request leaves the previous terrain intact.

use std::time::Instant;

use bevy::prelude::*;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::{
    DEFAULT_HEIGHT_SCALE, DEFAULT_OCTAVES, DEFAULT_ROUGHNESS, DEFAULT_SMOOTHING_PASSES,
    DEFAULT_SUBSIDENCE_ITERATIONS, DEFAULT_SUBSIDENCE_PASSES, DEFAULT_SUBSIDENCE_RANGE,
    DEFAULT_UPLIFT_ITERATIONS, DEFAULT_UPLIFT_PASSES, DEFAULT_UPLIFT_RANGE, TERRAIN_SIZE,
    TERRAIN_SPACING,
};
use crate::erosion::{deposition_passes, ParticleSettings};
use crate::error::{is_valid_fractal_size, GridError, GridResult};
use crate::fractal::layer_octaves;
use crate::height_grid::{HeightField, HeightGrid};
use crate::mesh::{tessellate, MeshData};
use crate::normals::calculate_normals;
use crate::sim_rng::SimRng;
use crate::smoothing::smooth;

// ---------------------------------------------------------------------------
// Parameters
// ---------------------------------------------------------------------------

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    /// Height scale of the first fractal octave.
    pub height_scale: f32,
    /// Roughness exponent `h`; the random offset shrinks by `2^-h` per level.
    pub roughness: f32,
    pub octaves: u32,
    pub subsidence_passes: u32,
    pub subsidence_iterations: u32,
    /// Per-pass particle height is drawn from this range.
    pub subsidence_range: (f32, f32),
    pub uplift_passes: u32,
    pub uplift_iterations: u32,
    pub uplift_range: (f32, f32),
    pub smoothing_passes: u32,
    pub particles: ParticleSettings,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            height_scale: DEFAULT_HEIGHT_SCALE,
            roughness: DEFAULT_ROUGHNESS,
            octaves: DEFAULT_OCTAVES,
            subsidence_passes: DEFAULT_SUBSIDENCE_PASSES,
            subsidence_iterations: DEFAULT_SUBSIDENCE_ITERATIONS,
            subsidence_range: DEFAULT_SUBSIDENCE_RANGE,
            uplift_passes: DEFAULT_UPLIFT_PASSES,
            uplift_iterations: DEFAULT_UPLIFT_ITERATIONS,
            uplift_range: DEFAULT_UPLIFT_RANGE,
            smoothing_passes: DEFAULT_SMOOTHING_PASSES,
            particles: ParticleSettings::default(),
        }
    }
}

/// How a generation request fills the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GenerationMode {
    /// Fractal octaves, erosion and smoothing from a flat start.
    #[default]
    Fractal,
    /// Add a random sine/cosine ridge pattern onto the current heights.
    Ripple,
    /// Independent uniform heights in `[-10, 10)`.
    Noise,
    /// Everything at zero.
    Flat,
}

// ---------------------------------------------------------------------------
// Generation stages
// ---------------------------------------------------------------------------

/// Run the fractal pipeline on `grid` in place. Heights are reset first.
pub fn generate_heights(
    grid: &mut HeightGrid,
    params: &GenerationParams,
    rng: &mut impl Rng,
) -> GridResult<()> {
    grid.flatten();
    {
        let _span = info_span!("fractal").entered();
        layer_octaves(
            grid,
            rng,
            params.height_scale,
            params.roughness,
            params.octaves,
        )?;
    }
    {
        let _span = info_span!("erosion").entered();
        deposition_passes(
            grid,
            rng,
            params.subsidence_passes,
            params.subsidence_iterations,
            params.subsidence_range,
            &params.particles,
        )?;
        deposition_passes(
            grid,
            rng,
            params.uplift_passes,
            params.uplift_iterations,
            params.uplift_range,
            &params.particles,
        )?;
    }
    {
        let _span = info_span!("smoothing").entered();
        smooth(grid, params.smoothing_passes)?;
    }
    let _span = info_span!("normals").entered();
    calculate_normals(grid)
}

/// Add `sin(x / (N / a)) * m + cos(z / b) * k` with random `a`, `b`, `m`,
/// `k` onto the current heights.
pub fn add_ripples(grid: &mut HeightGrid, rng: &mut impl Rng) -> GridResult<()> {
    let n = grid.size;
    let sin_freq = rng.gen_range(1..=12) as f32;
    let mut cos_period: f32 = rng.gen_range(-10.0..10.0);
    if cos_period == 0.0 {
        cos_period = 1.0;
    }
    let sin_amp: f32 = rng.gen_range(-5.0..5.0);
    let cos_amp: f32 = rng.gen_range(-2.5..2.5);
    let wavelength = n as f32 / sin_freq;

    for z in 0..n {
        for x in 0..n {
            let dy = (x as f32 / wavelength).sin() * sin_amp + (z as f32 / cos_period).cos() * cos_amp;
            let y = grid.height_at(x, z) + dy;
            if !y.is_finite() {
                return Err(GridError::NonFiniteHeight { x, z });
            }
            grid.set_height(x, z, y);
        }
    }
    calculate_normals(grid)
}

/// Fill with independent uniform heights in `[-10, 10)`.
pub fn fill_noise(grid: &mut HeightGrid, rng: &mut impl Rng) -> GridResult<()> {
    for c in &mut grid.cells {
        c.y = rng.gen_range(-10.0..10.0);
    }
    calculate_normals(grid)
}

// ---------------------------------------------------------------------------
// Terrain resource
// ---------------------------------------------------------------------------

/// Summary of one successful generation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TerrainSummary {
    pub mode: GenerationMode,
    pub min: f32,
    pub max: f32,
    pub mean: f64,
    pub std_dev: f64,
}

#[derive(Resource, Debug, Clone)]
pub struct Terrain {
    grid: HeightGrid,
    /// Bumped on every successful generation.
    pub generation: u32,
}

impl Default for Terrain {
    fn default() -> Self {
        Self {
            grid: HeightGrid::new(TERRAIN_SIZE, TERRAIN_SPACING),
            generation: 0,
        }
    }
}

impl Terrain {
    /// Flat terrain of side `size`, which must be `2^k + 1`.
    pub fn new(size: usize) -> GridResult<Self> {
        if !is_valid_fractal_size(size) {
            return Err(GridError::InvalidDimensions { size });
        }
        Ok(Self {
            grid: HeightGrid::new(size, TERRAIN_SPACING),
            generation: 0,
        })
    }

    /// Read-only view of the current heights.
    pub fn height_grid(&self) -> &HeightGrid {
        &self.grid
    }

    pub fn size(&self) -> usize {
        self.grid.size
    }

    /// Regenerate the grid. On error the previous grid is untouched.
    pub fn generate(
        &mut self,
        params: &GenerationParams,
        mode: GenerationMode,
        rng: &mut impl Rng,
    ) -> GridResult<TerrainSummary> {
        let mut scratch = self.grid.clone();
        match mode {
            GenerationMode::Fractal => generate_heights(&mut scratch, params, rng)?,
            GenerationMode::Ripple => add_ripples(&mut scratch, rng)?,
            GenerationMode::Noise => fill_noise(&mut scratch, rng)?,
            GenerationMode::Flat => scratch.flatten(),
        }
        if let Some((x, z)) = scratch.first_non_finite() {
            return Err(GridError::NonFiniteHeight { x, z });
        }

        self.grid = scratch;
        self.generation = self.generation.wrapping_add(1);
        let (min, max) = self.grid.min_max();
        Ok(TerrainSummary {
            mode,
            min,
            max,
            mean: self.grid.mean_height(),
            std_dev: self.grid.std_dev(),
        })
    }

    pub fn mesh_data(&self) -> MeshData {
        tessellate(&self.grid)
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Ask for a new terrain.
#[derive(Event, Debug, Clone, Copy, Default)]
pub struct GenerateTerrainRequest {
    pub mode: GenerationMode,
}

/// Sent after a request replaced the terrain.
#[derive(Event, Debug, Clone, Copy)]
pub struct TerrainGenerated {
    pub summary: TerrainSummary,
    pub generation: u32,
}

// ---------------------------------------------------------------------------
// System: handle generation requests
// ---------------------------------------------------------------------------

pub fn handle_generate_requests(
    mut requests: EventReader<GenerateTerrainRequest>,
    params: Res<GenerationParams>,
    mut rng: ResMut<SimRng>,
    mut terrain: ResMut<Terrain>,
    mut generated: EventWriter<TerrainGenerated>,
) {
    let seed = rng.seed;
    for request in requests.read() {
        let start = Instant::now();
        match terrain.generate(&params, request.mode, &mut rng.rng) {
            Ok(summary) => {
                info!(
                    "Generated {:?} terrain #{} (seed {}, {}x{}): heights {:.2}..{:.2}, std dev {:.2}, {:.1} ms",
                    summary.mode,
                    terrain.generation,
                    seed,
                    terrain.size(),
                    terrain.size(),
                    summary.min,
                    summary.max,
                    summary.std_dev,
                    start.elapsed().as_secs_f64() * 1000.0
                );
                generated.send(TerrainGenerated {
                    summary,
                    generation: terrain.generation,
                });
            }
            Err(e) => {
                warn!(
                    "Terrain generation ({:?}) failed, keeping previous terrain: {e}",
                    request.mode
                );
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Plugin
// ---------------------------------------------------------------------------

pub struct TerrainPlugin;

impl Plugin for TerrainPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Terrain>()
            .init_resource::<GenerationParams>()
            .add_event::<GenerateTerrainRequest>()
            .add_event::<TerrainGenerated>()
            .add_systems(
                FixedUpdate,
                handle_generate_requests.in_set(crate::SimulationSet::PreSim),
            );
    }
}
