//! Neighbourhood-averaging low-pass filter.

use crate::error::{GridError, GridResult};
use crate::height_grid::HeightField;

/// Relax `grid` over `passes` rounds. Each round blends every cell halfway
/// toward the mean of its in-bounds 8-neighbourhood:
/// `new = 0.5 * (old + mean)`.
///
/// Rounds read from one snapshot and write to another, so the visiting
/// order never matters. Heights are only committed once every round has
/// produced finite values.
pub fn smooth<G: HeightField>(grid: &mut G, passes: u32) -> GridResult<()> {
    let n = grid.size();
    if passes == 0 || n == 0 {
        return Ok(());
    }

    let mut front: Vec<f32> = grid.cells().iter().map(|c| c.y).collect();
    let mut back = vec![0.0f32; front.len()];

    for _ in 0..passes {
        for z in 0..n {
            for x in 0..n {
                let (neighbors, count) = grid.neighbors8(x, z);
                let sum: f32 = neighbors[..count]
                    .iter()
                    .map(|&(nx, nz)| front[nz * n + nx])
                    .sum();
                let idx = z * n + x;
                let mean = if count > 0 { sum / count as f32 } else { front[idx] };
                back[idx] = 0.5 * (front[idx] + mean);
            }
        }
        std::mem::swap(&mut front, &mut back);
    }

    if let Some(i) = front.iter().position(|y| !y.is_finite()) {
        return Err(GridError::NonFiniteHeight { x: i % n, z: i / n });
    }
    for (cell, y) in grid.cells_mut().iter_mut().zip(front) {
        cell.y = y;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::height_grid::HeightGrid;

    #[test]
    fn test_flat_grid_is_fixed_point() {
        let mut grid = HeightGrid::new(9, 1.0);
        for c in &mut grid.cells {
            c.y = 2.5;
        }
        let before = grid.clone();
        smooth(&mut grid, 1).unwrap();
        assert_eq!(grid, before);
    }

    #[test]
    fn test_spike_spreads_out() {
        let mut grid = HeightGrid::new(5, 1.0);
        grid.set_height(2, 2, 8.0);
        smooth(&mut grid, 1).unwrap();
        assert_eq!(grid.height_at(2, 2), 4.0);
        // Each neighbour sees the spike once among its neighbours.
        assert_eq!(grid.height_at(1, 2), 0.5 * (8.0 / 8.0));
        assert_eq!(grid.height_at(1, 1), 0.5 * (8.0 / 8.0));
        // Corner (0,0) has 3 neighbours, none of them the spike.
        assert_eq!(grid.height_at(0, 0), 0.0);
    }

    #[test]
    fn test_edge_cells_use_count_adjusted_mean() {
        let mut grid = HeightGrid::new(3, 1.0);
        grid.set_height(1, 1, 3.0);
        smooth(&mut grid, 1).unwrap();
        // Corner: 3 neighbours, one of which holds 3.0.
        assert_eq!(grid.height_at(0, 0), 0.5);
        // Edge midpoint: 5 neighbours.
        assert!((grid.height_at(1, 0) - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_smoothing_reduces_std_dev() {
        let mut grid = HeightGrid::new(17, 1.0);
        for (i, c) in grid.cells.iter_mut().enumerate() {
            c.y = if (i / 17 + i % 17) % 2 == 0 { 1.0 } else { -1.0 };
        }
        let before = grid.std_dev();
        smooth(&mut grid, 3).unwrap();
        assert!(grid.std_dev() < before);
    }

    #[test]
    fn test_zero_passes_is_noop() {
        let mut grid = HeightGrid::new(5, 1.0);
        grid.set_height(1, 3, 9.0);
        let before = grid.clone();
        smooth(&mut grid, 0).unwrap();
        assert_eq!(grid, before);
    }

    #[test]
    fn test_non_finite_input_rejected() {
        let mut grid = HeightGrid::new(5, 1.0);
        grid.set_height(2, 2, f32::INFINITY);
        grid.set_height(0, 0, -f32::INFINITY);
        let err = smooth(&mut grid, 2).unwrap_err();
        assert!(matches!(err, GridError::NonFiniteHeight { .. }));
    }
}
