//! Particle deposition erosion.
//!
//! A particle carrying `value` units of material is dropped on the grid and
//! rolls to a local extremum of its 8-neighbourhood before settling:
//! downhill for uplift (`value > 0`), uphill for subsidence (`value < 0`).
//! Many particles random-walking across the grid build networks of ridges
//! and basins.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::{DEFAULT_REROLL_CAP, DEFAULT_REROLL_THRESHOLD, DEPOSIT_STEP_CAP};
use crate::error::{GridError, GridResult};
use crate::height_grid::HeightField;

/// Knobs for particle placement and the settling walk.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParticleSettings {
    /// Uplift particles whose start cell is above this height are rerolled.
    pub reroll_threshold: f32,
    /// Maximum rerolls per particle.
    pub reroll_cap: u32,
    /// Maximum cells a single deposit may roll across.
    pub step_cap: usize,
}

impl Default for ParticleSettings {
    fn default() -> Self {
        Self {
            reroll_threshold: DEFAULT_REROLL_THRESHOLD,
            reroll_cap: DEFAULT_REROLL_CAP,
            step_cap: DEPOSIT_STEP_CAP,
        }
    }
}

// ---------------------------------------------------------------------------
// Deposit
// ---------------------------------------------------------------------------

/// Roll from `(x, z)` to a local minimum (`value > 0`) or maximum
/// (`value < 0`) and add `value` there. Returns the settling cell.
///
/// Each move goes to the most extreme strictly-better neighbour, so the walk
/// cannot revisit a cell; `step_cap` bounds it on very large grids. The
/// total mass of the grid changes by exactly `value`.
pub fn deposit<G: HeightField>(
    grid: &mut G,
    x: usize,
    z: usize,
    value: f32,
    step_cap: usize,
) -> GridResult<(usize, usize)> {
    if !grid.in_bounds(x as i32, z as i32) {
        return Err(GridError::OutOfBounds { x, z });
    }
    let (mut cx, mut cz) = (x, z);
    if value == 0.0 {
        return Ok((cx, cz));
    }
    // Uplift settles in hollows, subsidence on peaks.
    let better = |candidate: f32, current: f32| {
        if value > 0.0 {
            candidate < current
        } else {
            candidate > current
        }
    };

    for _ in 0..step_cap {
        let current = grid.height_at(cx, cz);
        let (neighbors, count) = grid.neighbors8(cx, cz);
        let mut best: Option<(usize, usize, f32)> = None;
        for &(nx, nz) in &neighbors[..count] {
            let h = grid.height_at(nx, nz);
            if !better(h, current) {
                continue;
            }
            match best {
                Some((_, _, bh)) if !better(h, bh) => {}
                _ => best = Some((nx, nz, h)),
            }
        }
        match best {
            Some((nx, nz, _)) => {
                cx = nx;
                cz = nz;
            }
            None => break,
        }
    }

    let settled = grid.height_at(cx, cz) + value;
    if !settled.is_finite() {
        return Err(GridError::NonFiniteHeight { x: cx, z: cz });
    }
    grid.set_height(cx, cz, settled);
    Ok((cx, cz))
}

// ---------------------------------------------------------------------------
// Particle deposition
// ---------------------------------------------------------------------------

/// Drop one particle and random-walk it for `iterations` cardinal steps
/// (wrapping at the edges), depositing `height` after every step.
pub fn particle_deposition<G: HeightField>(
    grid: &mut G,
    rng: &mut impl Rng,
    iterations: u32,
    height: f32,
    settings: &ParticleSettings,
) -> GridResult<()> {
    let n = grid.size();
    if n == 0 {
        return Err(GridError::InvalidDimensions { size: n });
    }

    let mut x = rng.gen_range(0..n);
    let mut z = rng.gen_range(0..n);
    if height > 0.0 {
        let mut tries = 0;
        while grid.height_at(x, z) > settings.reroll_threshold && tries < settings.reroll_cap {
            x = rng.gen_range(0..n);
            z = rng.gen_range(0..n);
            tries += 1;
        }
    }

    for _ in 0..iterations {
        match rng.gen_range(0..4u8) {
            0 => x = (x + 1) % n,
            1 => x = (x + n - 1) % n,
            2 => z = (z + 1) % n,
            _ => z = (z + n - 1) % n,
        }
        deposit(grid, x, z, height, settings.step_cap)?;
    }
    Ok(())
}

/// Run `passes` particle depositions, each with a height drawn uniformly
/// from `range`.
pub fn deposition_passes<G: HeightField>(
    grid: &mut G,
    rng: &mut impl Rng,
    passes: u32,
    iterations: u32,
    range: (f32, f32),
    settings: &ParticleSettings,
) -> GridResult<()> {
    for _ in 0..passes {
        let height = sample_range(rng, range);
        particle_deposition(grid, rng, iterations, height, settings)?;
    }
    Ok(())
}

/// Uniform sample in `[lo, hi)`; a degenerate range yields `lo`.
fn sample_range(rng: &mut impl Rng, (lo, hi): (f32, f32)) -> f32 {
    if lo < hi {
        rng.gen_range(lo..hi)
    } else {
        lo
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::height_grid::HeightGrid;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    /// Bowl whose lowest point is at (cx, cz).
    fn bowl(n: usize, cx: usize, cz: usize) -> HeightGrid {
        let mut grid = HeightGrid::new(n, 1.0);
        for z in 0..n {
            for x in 0..n {
                let dx = x as f32 - cx as f32;
                let dz = z as f32 - cz as f32;
                grid.set_height(x, z, dx * dx + dz * dz);
            }
        }
        grid
    }

    #[test]
    fn test_uplift_rolls_to_minimum() {
        let mut grid = bowl(9, 4, 4);
        let settled = deposit(&mut grid, 0, 0, 1.0, DEPOSIT_STEP_CAP).unwrap();
        assert_eq!(settled, (4, 4));
        assert_eq!(grid.height_at(4, 4), 1.0);
    }

    #[test]
    fn test_subsidence_rolls_to_maximum() {
        let mut grid = bowl(9, 4, 4);
        for c in &mut grid.cells {
            c.y = -c.y;
        }
        let settled = deposit(&mut grid, 3, 3, -2.0, DEPOSIT_STEP_CAP).unwrap();
        assert_eq!(settled, (4, 4));
        assert_eq!(grid.height_at(4, 4), -2.0);
    }

    #[test]
    fn test_deposit_changes_mass_by_exact_value() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let mut grid = HeightGrid::new(17, 1.0);
        for c in &mut grid.cells {
            c.y = rng.gen_range(-4.0..4.0);
        }
        for &value in &[0.5f32, 2.0, -1.5, -0.25] {
            let before = grid.total_mass();
            deposit(&mut grid, 8, 8, value, DEPOSIT_STEP_CAP).unwrap();
            let delta = grid.total_mass() - before;
            assert!((delta - value as f64).abs() < 1e-4, "{value} -> {delta}");
        }
    }

    #[test]
    fn test_flat_grid_deposits_in_place() {
        let mut grid = HeightGrid::new(9, 1.0);
        assert_eq!(deposit(&mut grid, 2, 6, 1.0, DEPOSIT_STEP_CAP).unwrap(), (2, 6));
    }

    #[test]
    fn test_step_cap_stops_walk_early() {
        let mut grid = bowl(9, 8, 8);
        let settled = deposit(&mut grid, 0, 0, 1.0, 2).unwrap();
        assert_eq!(settled, (2, 2));
        assert_eq!(grid.height_at(2, 2), 36.0 + 36.0 + 1.0);
    }

    #[test]
    fn test_deposit_out_of_bounds_rejected() {
        let mut grid = HeightGrid::new(5, 1.0);
        let err = deposit(&mut grid, 5, 0, 1.0, DEPOSIT_STEP_CAP).unwrap_err();
        assert_eq!(err, GridError::OutOfBounds { x: 5, z: 0 });
    }

    #[test]
    fn test_particle_deposition_adds_iterations_times_height() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let mut grid = HeightGrid::new(33, 1.0);
        particle_deposition(&mut grid, &mut rng, 200, 0.5, &ParticleSettings::default()).unwrap();
        assert!((grid.total_mass() - 100.0).abs() < 1e-3);
    }

    #[test]
    fn test_subsidence_passes_lower_mass() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut grid = HeightGrid::new(33, 1.0);
        deposition_passes(
            &mut grid,
            &mut rng,
            3,
            100,
            (-10.0, 0.0),
            &ParticleSettings::default(),
        )
        .unwrap();
        assert!(grid.total_mass() < 0.0);
    }

    #[test]
    fn test_degenerate_range_uses_low_end() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert_eq!(sample_range(&mut rng, (3.0, 3.0)), 3.0);
    }

    #[test]
    fn test_settings_roundtrip_json() {
        let s = ParticleSettings {
            reroll_threshold: 2.5,
            reroll_cap: 7,
            step_cap: 64,
        };
        let json = serde_json::to_string(&s).unwrap();
        let back: ParticleSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(s, back);
    }
}
