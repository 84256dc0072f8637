//! Shared heightfield data model.
//!
//! A [`HeightGrid`] is a square, row-major grid of [`Cell`]s. Planar
//! positions are laid out once at construction and never touched again;
//! only `y` (and the derived normal) change over the grid's lifetime.
//!
//! The [`HeightField`] trait is the seam that lets one smoother and one
//! normal estimator serve both the terrain grid and the fluid surface.

use serde::{Deserialize, Serialize};

/// One vertex of a heightfield.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub nx: f32,
    pub ny: f32,
    pub nz: f32,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
            nx: 0.0,
            ny: 1.0,
            nz: 0.0,
        }
    }
}

impl Cell {
    #[inline]
    pub fn position(&self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }

    #[inline]
    pub fn normal(&self) -> [f32; 3] {
        [self.nx, self.ny, self.nz]
    }
}

// ---------------------------------------------------------------------------
// HeightField trait
// ---------------------------------------------------------------------------

/// Read/write access to a square heightfield indexed by `(x, z)`.
///
/// Implementors only expose their cell storage; everything else, from
/// bounds checks to summary statistics, is provided.
pub trait HeightField {
    /// Side length in vertices.
    fn size(&self) -> usize;
    fn cells(&self) -> &[Cell];
    fn cells_mut(&mut self) -> &mut [Cell];

    #[inline]
    fn index(&self, x: usize, z: usize) -> usize {
        z * self.size() + x
    }

    #[inline]
    fn in_bounds(&self, x: i32, z: i32) -> bool {
        let n = self.size() as i32;
        x >= 0 && z >= 0 && x < n && z < n
    }

    #[inline]
    fn cell_at(&self, x: usize, z: usize) -> &Cell {
        &self.cells()[self.index(x, z)]
    }

    #[inline]
    fn cell_at_mut(&mut self, x: usize, z: usize) -> &mut Cell {
        let idx = self.index(x, z);
        &mut self.cells_mut()[idx]
    }

    #[inline]
    fn height_at(&self, x: usize, z: usize) -> f32 {
        self.cell_at(x, z).y
    }

    #[inline]
    fn set_height(&mut self, x: usize, z: usize, y: f32) {
        self.cell_at_mut(x, z).y = y;
    }

    /// Up to 8 in-bounds neighbours of `(x, z)`. No wraparound.
    fn neighbors8(&self, x: usize, z: usize) -> ([(usize, usize); 8], usize) {
        let mut out = [(0, 0); 8];
        let mut count = 0;
        for dz in -1i32..=1 {
            for dx in -1i32..=1 {
                if dx == 0 && dz == 0 {
                    continue;
                }
                let nx = x as i32 + dx;
                let nz = z as i32 + dz;
                if self.in_bounds(nx, nz) {
                    out[count] = (nx as usize, nz as usize);
                    count += 1;
                }
            }
        }
        (out, count)
    }

    /// Sum of all heights.
    fn total_mass(&self) -> f64 {
        self.cells().iter().map(|c| c.y as f64).sum()
    }

    /// Sum of absolute heights.
    fn total_abs_mass(&self) -> f64 {
        self.cells().iter().map(|c| c.y.abs() as f64).sum()
    }

    fn mean_height(&self) -> f64 {
        let n = self.cells().len();
        if n == 0 {
            return 0.0;
        }
        self.total_mass() / n as f64
    }

    fn std_dev(&self) -> f64 {
        let n = self.cells().len();
        if n == 0 {
            return 0.0;
        }
        let mean = self.mean_height();
        let var = self
            .cells()
            .iter()
            .map(|c| {
                let d = c.y as f64 - mean;
                d * d
            })
            .sum::<f64>()
            / n as f64;
        var.sqrt()
    }

    /// `(min, max)` height, or `(0, 0)` for an empty grid.
    fn min_max(&self) -> (f32, f32) {
        let mut iter = self.cells().iter().map(|c| c.y);
        let Some(first) = iter.next() else {
            return (0.0, 0.0);
        };
        iter.fold((first, first), |(lo, hi), y| (lo.min(y), hi.max(y)))
    }

    /// First cell whose height is NaN or infinite.
    fn first_non_finite(&self) -> Option<(usize, usize)> {
        let n = self.size();
        self.cells()
            .iter()
            .position(|c| !c.y.is_finite())
            .map(|i| (i % n, i / n))
    }
}

// ---------------------------------------------------------------------------
// HeightGrid
// ---------------------------------------------------------------------------

/// Owned square heightfield.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeightGrid {
    pub cells: Vec<Cell>,
    pub size: usize,
}

impl HeightGrid {
    /// Flat grid with `spacing` world units between vertices, offset by
    /// half the vertex count: `x = i * spacing - size / 2`. Only a spacing
    /// of 1 centres it on the origin.
    pub fn new(size: usize, spacing: f32) -> Self {
        let half = (size / 2) as f32;
        let mut cells = Vec::with_capacity(size * size);
        for z in 0..size {
            for x in 0..size {
                cells.push(Cell {
                    x: x as f32 * spacing - half,
                    z: z as f32 * spacing - half,
                    ..Cell::default()
                });
            }
        }
        Self { cells, size }
    }

    /// Zero every height and reset normals to straight up.
    pub fn flatten(&mut self) {
        for c in &mut self.cells {
            c.y = 0.0;
            c.nx = 0.0;
            c.ny = 1.0;
            c.nz = 0.0;
        }
    }

    /// Overwrite heights from `other` without touching layout.
    pub fn copy_heights_from(&mut self, other: &impl HeightField) {
        for (dst, src) in self.cells.iter_mut().zip(other.cells()) {
            dst.y = src.y;
            dst.nx = src.nx;
            dst.ny = src.ny;
            dst.nz = src.nz;
        }
    }
}

impl HeightField for HeightGrid {
    #[inline]
    fn size(&self) -> usize {
        self.size
    }

    #[inline]
    fn cells(&self) -> &[Cell] {
        &self.cells
    }

    #[inline]
    fn cells_mut(&mut self) -> &mut [Cell] {
        &mut self.cells
    }
}
