//! Per-vertex normals from adjacent face cross products.
//!
//! Each grid quad contributes one face normal built from the triangle
//! `(x, z)`, `(x+1, z)`, `(x, z+1)`. A vertex averages the faces of the up
//! to four quads that touch it and normalises the result.

use bevy::math::Vec3;

use crate::error::{GridError, GridResult};
use crate::height_grid::{Cell, HeightField};

#[inline]
fn pos(c: &Cell) -> Vec3 {
    Vec3::new(c.x, c.y, c.z)
}

/// Recompute every normal in `grid`.
///
/// Fails with [`GridError::DegenerateNormal`] if any vertex ends up with a
/// zero-length (or non-finite) normal; no normal is written in that case.
pub fn calculate_normals<G: HeightField>(grid: &mut G) -> GridResult<()> {
    let n = grid.size();
    if n < 2 {
        return Err(GridError::InvalidDimensions { size: n });
    }
    let faces_per_row = n - 1;

    let mut faces = Vec::with_capacity(faces_per_row * faces_per_row);
    for z in 0..faces_per_row {
        for x in 0..faces_per_row {
            let v1 = pos(grid.cell_at(x, z));
            let v2 = pos(grid.cell_at(x + 1, z));
            let v3 = pos(grid.cell_at(x, z + 1));
            let a = v1 - v3;
            let b = v3 - v2;
            faces.push(a.cross(b));
        }
    }

    let mut normals = Vec::with_capacity(n * n);
    for z in 0..n {
        for x in 0..n {
            let mut sum = Vec3::ZERO;
            let mut count = 0.0f32;
            // Quads up-left, up, left and at the vertex; wrapping_sub pushes
            // missing ones out of range.
            let touching = [
                (x.wrapping_sub(1), z.wrapping_sub(1)),
                (x, z.wrapping_sub(1)),
                (x.wrapping_sub(1), z),
                (x, z),
            ];
            for (fx, fz) in touching {
                if fx < faces_per_row && fz < faces_per_row {
                    sum += faces[fz * faces_per_row + fx];
                    count += 1.0;
                }
            }
            let avg = sum / count;
            let len = avg.length();
            if len <= f32::EPSILON || !len.is_finite() {
                return Err(GridError::DegenerateNormal { x, z });
            }
            normals.push(avg / len);
        }
    }

    for (cell, nrm) in grid.cells_mut().iter_mut().zip(normals) {
        cell.nx = nrm.x;
        cell.ny = nrm.y;
        cell.nz = nrm.z;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::height_grid::HeightGrid;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    fn assert_unit(grid: &HeightGrid) {
        for c in &grid.cells {
            let len = (c.nx * c.nx + c.ny * c.ny + c.nz * c.nz).sqrt();
            assert!((len - 1.0).abs() < 1e-5, "normal length {len}");
        }
    }

    #[test]
    fn test_flat_grid_points_up() {
        let mut grid = HeightGrid::new(9, 2.0);
        calculate_normals(&mut grid).unwrap();
        for c in &grid.cells {
            assert!((c.ny - 1.0).abs() < 1e-6);
            assert!(c.nx.abs() < 1e-6 && c.nz.abs() < 1e-6);
        }
    }

    #[test]
    fn test_random_grid_normals_are_unit_length() {
        let mut rng = ChaCha8Rng::seed_from_u64(12);
        let mut grid = HeightGrid::new(33, 1.0);
        for c in &mut grid.cells {
            c.y = rng.gen_range(-20.0..20.0);
        }
        calculate_normals(&mut grid).unwrap();
        assert_unit(&grid);
        assert!(grid.cells.iter().all(|c| c.ny > 0.0));
    }

    #[test]
    fn test_slope_along_x_tilts_normal_back() {
        let mut grid = HeightGrid::new(5, 1.0);
        for z in 0..5 {
            for x in 0..5 {
                grid.set_height(x, z, x as f32);
            }
        }
        calculate_normals(&mut grid).unwrap();
        let c = grid.cell_at(2, 2);
        // y = x  => normal ∝ (-1, 1, 0)
        assert!((c.nx + std::f32::consts::FRAC_1_SQRT_2).abs() < 1e-5);
        assert!((c.ny - std::f32::consts::FRAC_1_SQRT_2).abs() < 1e-5);
        assert!(c.nz.abs() < 1e-5);
    }

    #[test]
    fn test_coincident_vertices_are_degenerate() {
        let mut grid = HeightGrid::new(3, 0.0);
        let before = grid.clone();
        let err = calculate_normals(&mut grid).unwrap_err();
        assert_eq!(err, GridError::DegenerateNormal { x: 0, z: 0 });
        assert_eq!(grid, before);
    }

    #[test]
    fn test_single_vertex_grid_rejected() {
        let mut grid = HeightGrid::new(1, 1.0);
        assert!(matches!(
            calculate_normals(&mut grid),
            Err(GridError::InvalidDimensions { size: 1 })
        ));
    }
}
