//! Seedable RNG resource for generation and rain.
//!
//! Wraps `ChaCha8Rng` for cross-platform deterministic randomness.
//! Algorithms take `&mut impl Rng`; systems pass `&mut rng.rng` so that
//! identical seeds produce identical terrain.

use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Default seed used when no explicit seed is provided.
pub const DEFAULT_SEED: u64 = 42;

/// Session RNG. Seeded once; every generation request draws from the same
/// stream so repeated generations differ.
#[derive(Resource)]
pub struct SimRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl Default for SimRng {
    fn default() -> Self {
        Self::from_seed_u64(DEFAULT_SEED)
    }
}

impl SimRng {
    /// Create a new `SimRng` seeded from the given `u64` value.
    pub fn from_seed_u64(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

// ---------------------------------------------------------------------------
// Plugin
// ---------------------------------------------------------------------------

pub struct SimRngPlugin;

impl Plugin for SimRngPlugin {
    fn build(&self, app: &mut App) {
        // An rng inserted before the plugin (e.g. from a CLI seed) is kept.
        app.init_resource::<SimRng>();
    }
}
