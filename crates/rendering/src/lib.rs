use bevy::prelude::*;

pub mod camera;
pub mod controls;
pub mod surface_mesh;

pub struct RenderingPlugin;

impl Plugin for RenderingPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(ClearColor(Color::srgb(0.62, 0.75, 0.88)))
            .add_systems(Startup, setup_lighting)
            // PostStartup: the world has been sized and generated by then.
            .add_systems(
                PostStartup,
                (camera::setup_camera, surface_mesh::spawn_surfaces),
            )
            .add_systems(
                Update,
                (
                    camera::refresh_camera_bounds,
                    camera::camera_pan_keyboard,
                    camera::camera_orbit_drag,
                    camera::camera_zoom,
                    camera::apply_orbit_camera,
                )
                    .chain(),
            )
            .add_systems(Update, (controls::terrain_keys, controls::water_keys))
            .add_systems(
                Update,
                (
                    surface_mesh::rebuild_terrain_mesh,
                    surface_mesh::update_water_mesh,
                )
                    .after(controls::water_keys),
            );
    }
}

fn setup_lighting(mut commands: Commands) {
    // Ambient light for baseline illumination
    commands.insert_resource(AmbientLight {
        color: Color::srgb(0.9, 0.9, 1.0),
        brightness: 300.0,
    });

    // Directional light (sun) angled from above
    commands.spawn((
        DirectionalLight {
            illuminance: 10000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_rotation(Quat::from_euler(
            EulerRot::XYZ,
            -std::f32::consts::FRAC_PI_4,
            std::f32::consts::FRAC_PI_6,
            0.0,
        )),
    ));
}
