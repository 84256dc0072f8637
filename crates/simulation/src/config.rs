//! Tunable constants shared by terrain generation and the fluid surface.

/// Default side length (vertex count) of both the terrain and the fluid grid.
/// Must be `2^k + 1` for midpoint displacement.
pub const TERRAIN_SIZE: usize = 129;

/// World-space distance between adjacent terrain vertices.
pub const TERRAIN_SPACING: f32 = 2.0;

/// Fluid grid scale. Water is laid out at `i / FLUID_SCALE` and impulses are
/// divided by it.
pub const FLUID_SCALE: f32 = 0.5;

// ---------------------------------------------------------------------------
// Generation defaults
// ---------------------------------------------------------------------------

/// Height scale of the first octave; each further octave halves it.
pub const DEFAULT_HEIGHT_SCALE: f32 = 20.0;
pub const DEFAULT_ROUGHNESS: f32 = 0.4;
pub const DEFAULT_OCTAVES: u32 = 4;

pub const DEFAULT_SUBSIDENCE_PASSES: u32 = 6;
pub const DEFAULT_SUBSIDENCE_ITERATIONS: u32 = 1500;
pub const DEFAULT_SUBSIDENCE_RANGE: (f32, f32) = (-10.0, 0.0);

pub const DEFAULT_UPLIFT_PASSES: u32 = 12;
pub const DEFAULT_UPLIFT_ITERATIONS: u32 = 3000;
pub const DEFAULT_UPLIFT_RANGE: (f32, f32) = (0.0, 10.0);

pub const DEFAULT_SMOOTHING_PASSES: u32 = 5;

/// Uplift particles are rerolled while their start cell is above this height.
pub const DEFAULT_REROLL_THRESHOLD: f32 = 5.0;
/// Maximum rerolls before an uplift particle starts wherever it landed.
pub const DEFAULT_REROLL_CAP: u32 = 30;

/// Upper bound on cells visited by a single deposit walk.
pub const DEPOSIT_STEP_CAP: usize = 4096;

// ---------------------------------------------------------------------------
// Wave defaults
// ---------------------------------------------------------------------------

pub const WAVE_SPEED: f32 = 1.0;
/// 1 / (2 * sqrt(2)): the largest step that keeps the stencil stable at c = 1.
pub const WAVE_TIME_STEP: f32 = 0.353_553_38;
pub const WAVE_GRID_SPACING: f32 = 1.0;
pub const WAVE_DAMPING_FACTOR: f32 = 0.05;

/// Fixed ticks between rain bursts.
pub const RAIN_INTERVAL_TICKS: u64 = 10;
pub const RAIN_DROPS_PER_BURST: u32 = 5;

/// Fixed ticks between invariant sweeps.
pub const INVARIANT_CHECK_INTERVAL: u64 = 50;
