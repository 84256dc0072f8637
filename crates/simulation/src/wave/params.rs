use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::{WAVE_DAMPING_FACTOR, WAVE_GRID_SPACING, WAVE_SPEED, WAVE_TIME_STEP};

/// Whether the surface loses energy each tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WaveMode {
    /// Energy decays; ripples die out.
    #[default]
    Damped,
    /// Non-dissipative; ripples bounce around forever.
    Perpetual,
}

#[derive(Resource, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaveParams {
    pub speed: f32,
    pub time_step: f32,
    pub grid_spacing: f32,
    /// Viscous damping per unit time. Only used in [`WaveMode::Damped`].
    pub damping: f32,
    pub mode: WaveMode,
}

impl Default for WaveParams {
    fn default() -> Self {
        Self {
            speed: WAVE_SPEED,
            time_step: WAVE_TIME_STEP,
            grid_spacing: WAVE_GRID_SPACING,
            damping: WAVE_DAMPING_FACTOR,
            mode: WaveMode::Damped,
        }
    }
}

/// `next = c1 * y + c2 * prev + c3 * (up + down + left + right)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StencilCoefficients {
    pub c1: f32,
    pub c2: f32,
    pub c3: f32,
}

impl WaveParams {
    /// Courant term `(c * t / d)^2`. The stencil is stable while this is at
    /// most 0.5.
    pub fn courant_squared(&self) -> f32 {
        let r = self.speed * self.time_step / self.grid_spacing;
        r * r
    }

    pub fn is_stable(&self) -> bool {
        let wt = self.courant_squared();
        wt.is_finite() && wt <= 0.5
    }

    pub fn coefficients(&self) -> StencilCoefficients {
        let wt = self.courant_squared();
        match self.mode {
            WaveMode::Perpetual => StencilCoefficients {
                c1: 2.0 - 4.0 * wt,
                c2: -1.0,
                c3: wt,
            },
            WaveMode::Damped => {
                let u = self.time_step * self.damping;
                StencilCoefficients {
                    c1: (4.0 - 8.0 * wt) / (u + 2.0),
                    c2: (u - 2.0) / (u + 2.0),
                    c3: 2.0 * wt / (u + 2.0),
                }
            }
        }
    }
}
