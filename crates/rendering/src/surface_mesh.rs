//! Terrain and water surface entities.
//!
//! Both surfaces are plain triangle lists taken from the simulation's
//! `MeshData`. The terrain mesh is rebuilt when a new terrain is generated;
//! the water mesh has its positions and normals rewritten every frame,
//! after the fixed-tick simulation has finished.

use bevy::prelude::*;
use bevy::render::mesh::{Indices, PrimitiveTopology};
use bevy::render::render_asset::RenderAssetUsages;

use simulation::mesh::MeshData;
use simulation::terrain::{Terrain, TerrainGenerated};
use simulation::wave::Fluid;

/// Marker for the terrain mesh entity.
#[derive(Component)]
pub struct TerrainSurface;

/// Marker for the water mesh entity.
#[derive(Component)]
pub struct WaterSurface;

// ---------------------------------------------------------------------------
// Mesh construction
// ---------------------------------------------------------------------------

/// Convert simulation mesh data into a bevy mesh kept in both worlds so it
/// can be updated in place.
pub fn build_mesh(data: &MeshData) -> Mesh {
    Mesh::new(
        PrimitiveTopology::TriangleList,
        RenderAssetUsages::RENDER_WORLD | RenderAssetUsages::MAIN_WORLD,
    )
    .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, data.positions())
    .with_inserted_attribute(Mesh::ATTRIBUTE_NORMAL, data.normals())
    .with_inserted_indices(Indices::U32(data.indices.clone()))
}

/// Terrain mesh with a height-based vertex colour.
pub fn build_terrain_mesh(data: &MeshData) -> Mesh {
    let colors: Vec<[f32; 4]> = data
        .vertices
        .iter()
        .map(|v| height_color(v.position[1]))
        .collect();
    build_mesh(data).with_inserted_attribute(Mesh::ATTRIBUTE_COLOR, colors)
}

/// Seabed below zero, then sand, grass, rock and snow.
pub fn height_color(y: f32) -> [f32; 4] {
    let stops: [(f32, [f32; 3]); 6] = [
        (-15.0, [0.20, 0.18, 0.15]),
        (0.0, [0.55, 0.50, 0.38]),
        (1.5, [0.76, 0.70, 0.50]),
        (6.0, [0.30, 0.52, 0.22]),
        (14.0, [0.45, 0.42, 0.38]),
        (22.0, [0.95, 0.95, 0.97]),
    ];
    if y <= stops[0].0 {
        let c = stops[0].1;
        return [c[0], c[1], c[2], 1.0];
    }
    for pair in stops.windows(2) {
        let (y0, c0) = pair[0];
        let (y1, c1) = pair[1];
        if y <= y1 {
            let t = (y - y0) / (y1 - y0);
            return [
                c0[0] + (c1[0] - c0[0]) * t,
                c0[1] + (c1[1] - c0[1]) * t,
                c0[2] + (c1[2] - c0[2]) * t,
                1.0,
            ];
        }
    }
    let c = stops[stops.len() - 1].1;
    [c[0], c[1], c[2], 1.0]
}

// ---------------------------------------------------------------------------
// Systems
// ---------------------------------------------------------------------------

pub fn spawn_surfaces(
    mut commands: Commands,
    terrain: Res<Terrain>,
    fluid: Res<Fluid>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let terrain_mesh = meshes.add(build_terrain_mesh(&terrain.mesh_data()));
    let terrain_material = materials.add(StandardMaterial {
        base_color: Color::WHITE,
        perceptual_roughness: 0.9,
        ..default()
    });
    commands.spawn((
        Mesh3d(terrain_mesh),
        MeshMaterial3d(terrain_material),
        Transform::IDENTITY,
        TerrainSurface,
    ));

    let water_mesh = meshes.add(build_mesh(&fluid.mesh_data()));
    let water_material = materials.add(StandardMaterial {
        base_color: Color::srgba(0.10, 0.32, 0.60, 0.75),
        alpha_mode: AlphaMode::Blend,
        perceptual_roughness: 0.08,
        reflectance: 0.6,
        ..default()
    });
    commands.spawn((
        Mesh3d(water_mesh),
        MeshMaterial3d(water_material),
        Transform::IDENTITY,
        WaterSurface,
    ));
}

/// Replace the terrain mesh after a new terrain was generated.
pub fn rebuild_terrain_mesh(
    mut generated: EventReader<TerrainGenerated>,
    terrain: Res<Terrain>,
    query: Query<&Mesh3d, With<TerrainSurface>>,
    mut meshes: ResMut<Assets<Mesh>>,
) {
    if generated.read().last().is_none() {
        return;
    }
    let Ok(handle) = query.get_single() else {
        return;
    };
    if let Some(mesh) = meshes.get_mut(&handle.0) {
        *mesh = build_terrain_mesh(&terrain.mesh_data());
    }
}

/// Rewrite water positions and normals from the latest fluid tick.
pub fn update_water_mesh(
    fluid: Res<Fluid>,
    query: Query<&Mesh3d, With<WaterSurface>>,
    mut meshes: ResMut<Assets<Mesh>>,
) {
    if !fluid.is_changed() {
        return;
    }
    let Ok(handle) = query.get_single() else {
        return;
    };
    let Some(mesh) = meshes.get_mut(&handle.0) else {
        return;
    };
    let data = fluid.mesh_data();
    if mesh.count_vertices() == data.vertices.len() {
        mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, data.positions());
        mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, data.normals());
    } else {
        *mesh = build_mesh(&data);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use simulation::height_grid::HeightGrid;
    use simulation::mesh::tessellate;

    #[test]
    fn test_build_mesh_counts() {
        let data = tessellate(&HeightGrid::new(5, 1.0));
        let mesh = build_mesh(&data);
        assert_eq!(mesh.count_vertices(), 4 * 4 * 6);
        assert_eq!(mesh.indices().map(|i| i.len()), Some(4 * 4 * 6));
    }

    #[test]
    fn test_terrain_mesh_has_colors() {
        let data = tessellate(&HeightGrid::new(3, 1.0));
        let mesh = build_terrain_mesh(&data);
        assert!(mesh.attribute(Mesh::ATTRIBUTE_COLOR).is_some());
    }

    #[test]
    fn test_height_color_ramp() {
        assert_eq!(height_color(-100.0), [0.20, 0.18, 0.15, 1.0]);
        assert_eq!(height_color(100.0), [0.95, 0.95, 0.97, 1.0]);
        let mid = height_color(3.0);
        assert!(mid[1] > 0.5 && mid[1] < 0.71);
    }
}
