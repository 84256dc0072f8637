use crate::error::{GridError, GridResult};
use crate::height_grid::{Cell, HeightField};

use super::params::StencilCoefficients;

/// Water surface with wave history.
///
/// `cells[i].y` is the current height; `prev` and `next` hold the previous
/// and pending time levels as parallel arrays so the stencil never reads a
/// half-updated neighbour.
#[derive(Debug, Clone, PartialEq)]
pub struct FluidGrid {
    pub cells: Vec<Cell>,
    pub prev: Vec<f32>,
    pub next: Vec<f32>,
    pub boundary: Vec<bool>,
    pub size: usize,
    /// Layout and impulse scale: cells sit `1 / scale` apart and
    /// `add_water` divides its amount by it.
    pub scale: f32,
}

impl FluidGrid {
    pub fn new(size: usize, scale: f32) -> Self {
        let half = (size / 2) as f32;
        let mut cells = Vec::with_capacity(size * size);
        for z in 0..size {
            for x in 0..size {
                cells.push(Cell {
                    x: x as f32 / scale - half,
                    z: z as f32 / scale - half,
                    ..Cell::default()
                });
            }
        }
        let mut grid = Self {
            cells,
            prev: vec![0.0; size * size],
            next: vec![0.0; size * size],
            boundary: vec![false; size * size],
            size,
            scale,
        };
        grid.reset_borders();
        grid
    }

    #[inline]
    fn on_edge(&self, x: usize, z: usize) -> bool {
        x == 0 || z == 0 || x + 1 == self.size || z + 1 == self.size
    }

    #[inline]
    pub fn is_boundary(&self, x: usize, z: usize) -> bool {
        self.boundary[self.index(x, z)]
    }

    /// Mark only the outer ring as boundary.
    pub fn reset_borders(&mut self) {
        for z in 0..self.size {
            for x in 0..self.size {
                let edge = self.on_edge(x, z);
                self.boundary[z * self.size + x] = edge;
            }
        }
    }

    /// Mark every cell where `terrain` rises above zero as boundary, on top
    /// of the edge ring, and still its water. Returns the number of boundary
    /// cells.
    pub fn set_borders(&mut self, terrain: &impl HeightField) -> GridResult<usize> {
        if terrain.size() != self.size {
            return Err(GridError::DimensionMismatch {
                expected: self.size,
                found: terrain.size(),
            });
        }
        self.reset_borders();
        let mut count = 0;
        for (idx, t) in terrain.cells().iter().enumerate() {
            if t.y > 0.0 {
                self.boundary[idx] = true;
                self.cells[idx].y = 0.0;
                self.prev[idx] = 0.0;
                self.next[idx] = 0.0;
            }
            if self.boundary[idx] {
                count += 1;
            }
        }
        Ok(count)
    }

    /// Zero all three time levels and reset normals.
    pub fn reset_water(&mut self) {
        for c in &mut self.cells {
            c.y = 0.0;
            c.nx = 0.0;
            c.ny = 1.0;
            c.nz = 0.0;
        }
        self.prev.fill(0.0);
        self.next.fill(0.0);
    }

    /// Raise a non-boundary cell by `amount / scale`.
    ///
    /// The previous level is raised by the same amount so the new water
    /// starts at rest and then spreads out, instead of launching upward.
    pub fn add_water(&mut self, x: usize, z: usize, amount: f32) -> GridResult<()> {
        if !self.in_bounds(x as i32, z as i32) {
            return Err(GridError::OutOfBounds { x, z });
        }
        let idx = self.index(x, z);
        if self.boundary[idx] {
            return Err(GridError::BoundaryCell { x, z });
        }
        let delta = amount / self.scale;
        let y = self.cells[idx].y + delta;
        let prev = self.prev[idx] + delta;
        if !y.is_finite() || !prev.is_finite() {
            return Err(GridError::NonFiniteHeight { x, z });
        }
        self.cells[idx].y = y;
        self.prev[idx] = prev;
        Ok(())
    }

    /// Set every non-boundary cell in the square `lo..hi` (both axes) to
    /// `height`, at rest. Out-of-range parts of the square are ignored.
    pub fn fill_patch(&mut self, lo: usize, hi: usize, height: f32) {
        let hi = hi.min(self.size);
        for z in lo..hi {
            for x in lo..hi {
                let idx = z * self.size + x;
                if !self.boundary[idx] {
                    self.cells[idx].y = height;
                    self.prev[idx] = height;
                }
            }
        }
    }

    /// Three starting disturbances around the centre: a raised bump, a
    /// trough, and a smaller raised patch further out.
    pub fn seed_disturbances(&mut self) {
        // No interior cells to disturb.
        if self.size < 3 {
            return;
        }
        let c = self.size / 2;
        let s = self.scale;
        self.fill_patch(c.saturating_sub(2), c + 2, 2.0 / s);
        self.fill_patch(c.saturating_sub(10), c.saturating_sub(5), -5.0 / s);
        self.fill_patch(c + 20, c + 25, 1.5 / s);
    }

    /// Advance one tick: write `next` for interior non-boundary cells, then
    /// rotate `prev <- y <- next`. Boundary cells keep their height.
    ///
    /// Nothing rotates if any new height is non-finite.
    pub fn step(&mut self, k: &StencilCoefficients) -> GridResult<()> {
        let n = self.size;
        for z in 0..n {
            for x in 0..n {
                let idx = z * n + x;
                // Boundary check first: edge cells have no neighbours to read.
                if self.boundary[idx] || self.on_edge(x, z) {
                    self.next[idx] = self.cells[idx].y;
                    continue;
                }
                let sum = self.cells[idx - 1].y
                    + self.cells[idx + 1].y
                    + self.cells[idx - n].y
                    + self.cells[idx + n].y;
                let next = k.c1 * self.cells[idx].y + k.c2 * self.prev[idx] + k.c3 * sum;
                if !next.is_finite() {
                    return Err(GridError::NonFiniteHeight { x, z });
                }
                self.next[idx] = next;
            }
        }

        for (idx, cell) in self.cells.iter_mut().enumerate() {
            self.prev[idx] = cell.y;
            cell.y = self.next[idx];
        }
        Ok(())
    }

    /// Discrete wave energy: kinetic `(y - prev)^2` plus a strain term over
    /// every horizontal and vertical edge. Constant in perpetual mode,
    /// decreasing in damped mode.
    pub fn energy(&self, courant_squared: f32) -> f64 {
        let n = self.size;
        let wt = courant_squared as f64;
        let mut e = 0.0f64;
        for z in 0..n {
            for x in 0..n {
                let idx = z * n + x;
                let y = self.cells[idx].y as f64;
                let p = self.prev[idx] as f64;
                e += (y - p) * (y - p);
                if x + 1 < n {
                    let dy = y - self.cells[idx + 1].y as f64;
                    let dp = p - self.prev[idx + 1] as f64;
                    e += wt * dy * dp;
                }
                if z + 1 < n {
                    let dy = y - self.cells[idx + n].y as f64;
                    let dp = p - self.prev[idx + n] as f64;
                    e += wt * dy * dp;
                }
            }
        }
        e
    }

    pub fn boundary_count(&self) -> usize {
        self.boundary.iter().filter(|&&b| b).count()
    }
}

impl HeightField for FluidGrid {
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
