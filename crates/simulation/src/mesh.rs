//! Heightfield to triangle-list tessellation.
//!
//! Every grid quad becomes two triangles written out as six unshared
//! vertices. The split diagonal alternates in a checkerboard ("quilt") so
//! neighbouring quads mirror each other and no direction is favoured.
//! Triangles wind counter-clockwise when seen from above.

use serde::{Deserialize, Serialize};

use crate::height_grid::{Cell, HeightField};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl From<&Cell> for MeshVertex {
    fn from(c: &Cell) -> Self {
        Self {
            position: c.position(),
            normal: c.normal(),
        }
    }
}

/// Flat vertex + index arrays ready for upload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeshData {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn positions(&self) -> Vec<[f32; 3]> {
        self.vertices.iter().map(|v| v.position).collect()
    }

    pub fn normals(&self) -> Vec<[f32; 3]> {
        self.vertices.iter().map(|v| v.normal).collect()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Number of vertices [`tessellate`] emits for a grid of side `size`.
pub fn vertex_count(size: usize) -> usize {
    let quads = size.saturating_sub(1);
    quads * quads * 6
}

/// Snapshot `grid` into a triangle list.
pub fn tessellate<G: HeightField>(grid: &G) -> MeshData {
    let n = grid.size();
    let count = vertex_count(n);
    let mut vertices = Vec::with_capacity(count);

    for z in 0..n.saturating_sub(1) {
        for x in 0..n - 1 {
            let bottom_left = grid.cell_at(x, z);
            let bottom_right = grid.cell_at(x + 1, z);
            let upper_left = grid.cell_at(x, z + 1);
            let upper_right = grid.cell_at(x + 1, z + 1);

            let quad = if (x % 2 == 1) != (z % 2 == 1) {
                [
                    upper_left,
                    upper_right,
                    bottom_right,
                    bottom_right,
                    bottom_left,
                    upper_left,
                ]
            } else {
                [
                    upper_left,
                    upper_right,
                    bottom_left,
                    bottom_left,
                    upper_right,
                    bottom_right,
                ]
            };
            vertices.extend(quad.into_iter().map(MeshVertex::from));
        }
    }

    let indices = (0..count as u32).collect();
    MeshData { vertices, indices }
}
