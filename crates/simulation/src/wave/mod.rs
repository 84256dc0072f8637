//! Damped 2D wave-equation water surface.
//!
//! A [`FluidGrid`] keeps three time levels of the surface (`prev`, current
//! `y`, `next`). Every fixed tick the explicit five-point stencil writes
//! `next` for every interior, non-boundary cell, then the levels rotate.
//! Boundary cells (the edge ring plus every cell where the terrain rises
//! above the water plane) are never touched by the stencil.
//!
//! [`WaveParams`] folds wave speed, time step, grid spacing and damping into
//! three stencil coefficients once; they are recomputed only when the
//! parameters change.

pub mod fluid;
pub mod params;
pub mod systems;


pub use fluid::FluidGrid;
pub use params::{StencilCoefficients, WaveMode, WaveParams};
pub use systems::{step_fluid, AddWaterRequest, Fluid, FluidPlugin, FluidStats, RainSettings};
