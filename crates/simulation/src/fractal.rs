//! Diamond-square midpoint displacement.
//!
//! Fills a `2^k + 1` heightfield with self-similar roughness. Each stride
//! level runs a square step (centres of squares) then a diamond step
//! (centres of diamonds, wrapping at the edges), copying row 0 into the
//! last row and column 0 into the last column so tiled copies join
//! seamlessly. `ratio = 2^-h` scales the random offset down after every
//! level: small `h` keeps high-frequency detail, large `h` smooths it out.

use bevy::log::info_span;
use rand::Rng;

use crate::error::{is_valid_fractal_size, GridError, GridResult};
use crate::height_grid::HeightField;

/// Overwrite every height in `grid` with one diamond-square field.
///
/// The four corners are seeded to 0. Nothing is written unless the size is
/// valid and every generated height is finite.
pub fn midpoint_displacement<G: HeightField>(
    grid: &mut G,
    rng: &mut impl Rng,
    height_scale: f32,
    h: f32,
) -> GridResult<()> {
    let size = grid.size();
    if !is_valid_fractal_size(size) {
        return Err(GridError::InvalidDimensions { size });
    }

    let heights = displacement_field(size, rng, height_scale, h);
    commit(grid, &heights, |_, new| new)
}

/// Sum `octaves` independent fields into `grid`, halving the height scale
/// for each octave. Existing heights are kept and added to.
pub fn layer_octaves<G: HeightField>(
    grid: &mut G,
    rng: &mut impl Rng,
    height_scale: f32,
    h: f32,
    octaves: u32,
) -> GridResult<()> {
    let size = grid.size();
    if !is_valid_fractal_size(size) {
        return Err(GridError::InvalidDimensions { size });
    }
    let _span = info_span!("fractal_octaves", octaves).entered();

    let mut acc = vec![0.0f32; size * size];
    let mut scale = height_scale;
    for _ in 0..octaves {
        let layer = displacement_field(size, rng, scale, h);
        for (a, l) in acc.iter_mut().zip(&layer) {
            *a += l;
        }
        scale *= 0.5;
    }
    commit(grid, &acc, |old, add| old + add)
}

/// Write `field` into `grid` through `combine(old, new)`, refusing if any
/// result would be non-finite.
fn commit<G: HeightField>(
    grid: &mut G,
    field: &[f32],
    combine: impl Fn(f32, f32) -> f32,
) -> GridResult<()> {
    let size = grid.size();
    let combined: Vec<f32> = grid
        .cells()
        .iter()
        .zip(field)
        .map(|(c, &v)| combine(c.y, v))
        .collect();
    if let Some(i) = combined.iter().position(|y| !y.is_finite()) {
        return Err(GridError::NonFiniteHeight {
            x: i % size,
            z: i / size,
        });
    }
    for (cell, y) in grid.cells_mut().iter_mut().zip(combined) {
        cell.y = y;
    }
    Ok(())
}

/// Generate one diamond-square field as a row-major `size * size` buffer.
/// `size` must already be validated.
fn displacement_field(size: usize, rng: &mut impl Rng, height_scale: f32, h: f32) -> Vec<f32> {
    let connectors = size - 1;
    let at = |row: usize, col: usize| row * size + col;
    let mut fa = vec![0.0f32; size * size];

    let ratio = 2.0f32.powf(-h);
    let mut scale = height_scale;
    let mut stride = connectors / 2;

    // Corners are already 0; they stay equal because no later step writes them.
    while stride != 0 {
        // Square step: centres of squares of half-width `stride`.
        let mut i = stride;
        while i < connectors {
            let mut j = stride;
            while j < connectors {
                let avg = (fa[at(i - stride, j - stride)]
                    + fa[at(i - stride, j + stride)]
                    + fa[at(i + stride, j - stride)]
                    + fa[at(i + stride, j + stride)])
                    * 0.25;
                fa[at(i, j)] = avg + scale * rng.gen_range(-0.5..0.5);
                j += 2 * stride;
            }
            i += 2 * stride;
        }

        // Diamond step: rows alternate between starting at `stride` and 0.
        let mut odd_line = false;
        let mut i = 0;
        while i < connectors {
            odd_line = !odd_line;
            let mut j = if odd_line { stride } else { 0 };
            while j < connectors {
                let avg = diamond_average(&fa, size, i, j, stride);
                fa[at(i, j)] = avg + scale * rng.gen_range(-0.5..0.5);

                // Seam: mirror the first row/column onto the last.
                if i == 0 {
                    fa[at(connectors, j)] = fa[at(i, j)];
                }
                if j == 0 {
                    fa[at(i, connectors)] = fa[at(i, j)];
                }
                j += 2 * stride;
            }
            i += stride;
        }

        scale *= ratio;
        stride /= 2;
    }
    fa
}

/// Mean of the four diamond corners around `(i, j)`. Corners that fall off
/// an edge are taken from the opposite side of the tile.
fn diamond_average(fa: &[f32], size: usize, i: usize, j: usize, stride: usize) -> f32 {
    let at = |row: usize, col: usize| fa[row * size + col];
    let last = size - 1;
    let sum = if i == 0 {
        at(i, j - stride) + at(i, j + stride) + at(last - stride, j) + at(i + stride, j)
    } else if i == last {
        at(i, j - stride) + at(i, j + stride) + at(i - stride, j) + at(stride, j)
    } else if j == 0 {
        at(i - stride, j) + at(i + stride, j) + at(i, j + stride) + at(i, last - stride)
    } else if j == last {
        at(i - stride, j) + at(i + stride, j) + at(i, j - stride) + at(i, stride)
    } else {
        at(i - stride, j) + at(i + stride, j) + at(i, j - stride) + at(i, j + stride)
    };
    sum * 0.25
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::height_grid::HeightGrid;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn rng(seed: u64) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(seed)
    }

    fn assert_seamless(grid: &HeightGrid) {
        let n = grid.size;
        for k in 0..n {
            assert_eq!(grid.height_at(k, 0), grid.height_at(k, n - 1), "row seam at {k}");
            assert_eq!(grid.height_at(0, k), grid.height_at(n - 1, k), "col seam at {k}");
        }
    }

    #[test]
    fn test_corners_equal_for_all_sizes() {
        for k in 1..=7 {
            let n = (1 << k) + 1;
            let mut grid = HeightGrid::new(n, 1.0);
            midpoint_displacement(&mut grid, &mut rng(k as u64), 10.0, 0.4).unwrap();
            let c = grid.height_at(0, 0);
            assert_eq!(grid.height_at(n - 1, 0), c);
            assert_eq!(grid.height_at(0, n - 1), c);
            assert_eq!(grid.height_at(n - 1, n - 1), c);
        }
    }

    #[test]
    fn test_seams_match_for_many_seeds() {
        for seed in 0..20 {
            let mut grid = HeightGrid::new(33, 1.0);
            midpoint_displacement(&mut grid, &mut rng(seed), 25.0, 0.7).unwrap();
            assert_seamless(&grid);
        }
    }

    #[test]
    fn test_produces_variation() {
        let mut grid = HeightGrid::new(65, 1.0);
        midpoint_displacement(&mut grid, &mut rng(3), 10.0, 0.4).unwrap();
        assert!(grid.std_dev() > 0.0);
        assert_eq!(grid.first_non_finite(), None);
    }

    #[test]
    fn test_zero_scale_leaves_grid_flat() {
        let mut grid = HeightGrid::new(17, 1.0);
        midpoint_displacement(&mut grid, &mut rng(1), 0.0, 0.4).unwrap();
        assert!(grid.cells.iter().all(|c| c.y == 0.0));
    }

    #[test]
    fn test_same_seed_same_field() {
        let mut a = HeightGrid::new(33, 1.0);
        let mut b = HeightGrid::new(33, 1.0);
        midpoint_displacement(&mut a, &mut rng(11), 10.0, 0.4).unwrap();
        midpoint_displacement(&mut b, &mut rng(11), 10.0, 0.4).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_repeated_calls_on_one_stream_differ() {
        let mut r = rng(5);
        let mut a = HeightGrid::new(17, 1.0);
        let mut b = HeightGrid::new(17, 1.0);
        midpoint_displacement(&mut a, &mut r, 10.0, 0.4).unwrap();
        midpoint_displacement(&mut b, &mut r, 10.0, 0.4).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_invalid_size_rejected_without_mutation() {
        let mut grid = HeightGrid::new(64, 1.0);
        grid.set_height(3, 3, 1.5);
        let before = grid.clone();
        let err = midpoint_displacement(&mut grid, &mut rng(0), 10.0, 0.4).unwrap_err();
        assert_eq!(err, GridError::InvalidDimensions { size: 64 });
        assert_eq!(grid, before);
    }

    #[test]
    fn test_non_finite_scale_rejected_without_mutation() {
        let mut grid = HeightGrid::new(9, 1.0);
        let before = grid.clone();
        let err = midpoint_displacement(&mut grid, &mut rng(0), f32::INFINITY, 0.4).unwrap_err();
        assert!(matches!(err, GridError::NonFiniteHeight { .. }));
        assert_eq!(grid, before);
    }

    #[test]
    fn test_octaves_accumulate_onto_existing_heights() {
        let mut grid = HeightGrid::new(17, 1.0);
        for c in &mut grid.cells {
            c.y = 3.0;
        }
        layer_octaves(&mut grid, &mut rng(8), 10.0, 0.4, 4).unwrap();
        // Corners of every layer are 0, so corners keep the base height.
        assert_eq!(grid.height_at(0, 0), 3.0);
        assert_eq!(grid.height_at(16, 16), 3.0);
        assert_seamless(&grid);
        assert!(grid.std_dev() > 0.0);
    }
}
