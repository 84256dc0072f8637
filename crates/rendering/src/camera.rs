//! Orbit camera framed on the terrain.
//!
//! The focus point is confined to the terrain's horizontal footprint, read
//! from the `Terrain` cells rather than from the compile-time defaults, so a
//! resized world (`TIDEPOOL_SIZE`) can still be panned edge to edge.

use bevy::input::mouse::{MouseMotion, MouseScrollUnit, MouseWheel};
use bevy::prelude::*;

use simulation::height_grid::HeightField;
use simulation::terrain::{Terrain, TerrainGenerated};

/// World units per second at the reference distance.
const PAN_SPEED: f32 = 150.0;
const PAN_REFERENCE_DISTANCE: f32 = 350.0;
/// Fractional distance change per scroll line.
const ZOOM_STEP: f32 = 0.15;
const MIN_DISTANCE: f32 = 10.0;
/// Farthest zoom, as a multiple of the terrain's widest side.
const MAX_DISTANCE_SPANS: f32 = 3.0;
/// Starting distance, as a multiple of the terrain's widest side.
const FIT_DISTANCE_SPANS: f32 = 1.2;
const MIN_PITCH: f32 = 5.0 * std::f32::consts::PI / 180.0;
const MAX_PITCH: f32 = 85.0 * std::f32::consts::PI / 180.0;
/// Radians per pixel of right-drag.
const ORBIT_SENSITIVITY: f32 = 0.005;
const PIXELS_PER_LINE: f32 = 100.0;

// ---------------------------------------------------------------------------
// Bounds
// ---------------------------------------------------------------------------

/// Horizontal extent of the terrain in world units (x, z).
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct CameraBounds {
    pub min: Vec2,
    pub max: Vec2,
}

impl CameraBounds {
    pub fn from_field(field: &impl HeightField) -> Self {
        let (min, max) = field.cells().iter().fold(
            (Vec2::splat(f32::MAX), Vec2::splat(f32::MIN)),
            |(lo, hi), c| {
                let p = Vec2::new(c.x, c.z);
                (lo.min(p), hi.max(p))
            },
        );
        if min.x > max.x {
            return Self {
                min: Vec2::ZERO,
                max: Vec2::ZERO,
            };
        }
        Self { min, max }
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Widest side, never below `MIN_DISTANCE`.
    pub fn span(&self) -> f32 {
        (self.max - self.min).max_element().max(MIN_DISTANCE)
    }

    pub fn max_distance(&self) -> f32 {
        self.span() * MAX_DISTANCE_SPANS
    }

    pub fn clamp(&self, focus: Vec3) -> Vec3 {
        Vec3::new(
            focus.x.clamp(self.min.x, self.max.x),
            focus.y,
            focus.z.clamp(self.min.y, self.max.y),
        )
    }
}

// ---------------------------------------------------------------------------
// Orbit model
// ---------------------------------------------------------------------------

/// Camera orbiting a focus point on the water plane.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct OrbitCamera {
    pub focus: Vec3,
    /// Radians around +Y.
    pub yaw: f32,
    /// Elevation, kept within `MIN_PITCH..=MAX_PITCH`.
    pub pitch: f32,
    pub distance: f32,
}

impl OrbitCamera {
    /// Look at the middle of `bounds` from far enough to see all of it.
    pub fn framing(bounds: &CameraBounds) -> Self {
        let c = bounds.center();
        Self {
            focus: Vec3::new(c.x, 0.0, c.y),
            yaw: std::f32::consts::FRAC_PI_4,
            pitch: 40.0_f32.to_radians(),
            distance: bounds.span() * FIT_DISTANCE_SPANS,
        }
    }

    pub fn eye(&self) -> Vec3 {
        let (sin_p, cos_p) = self.pitch.sin_cos();
        let (sin_y, cos_y) = self.yaw.sin_cos();
        self.focus + self.distance * Vec3::new(cos_p * sin_y, sin_p, cos_p * cos_y)
    }

    pub fn transform(&self) -> Transform {
        Transform::from_translation(self.eye()).looking_at(self.focus, Vec3::Y)
    }

    /// Move the focus by a screen-space direction (x right, y down the
    /// screen) turned into the ground plane by the current yaw.
    pub fn pan(&mut self, screen_dir: Vec2, amount: f32, bounds: &CameraBounds) {
        let ground = Vec2::from_angle(-self.yaw).rotate(screen_dir) * amount;
        self.focus = bounds.clamp(self.focus + Vec3::new(ground.x, 0.0, ground.y));
    }

    pub fn orbit(&mut self, drag: Vec2) {
        self.yaw += drag.x * ORBIT_SENSITIVITY;
        self.pitch = (self.pitch - drag.y * ORBIT_SENSITIVITY).clamp(MIN_PITCH, MAX_PITCH);
    }

    /// Positive `lines` moves closer.
    pub fn zoom(&mut self, lines: f32, bounds: &CameraBounds) {
        let factor = (1.0 - lines * ZOOM_STEP).max(ZOOM_STEP);
        self.distance = (self.distance * factor).clamp(MIN_DISTANCE, bounds.max_distance());
    }
}

fn pan_direction(keys: &ButtonInput<KeyCode>) -> Vec2 {
    let held = |a: KeyCode, b: KeyCode| keys.pressed(a) || keys.pressed(b);
    let mut dir = Vec2::ZERO;
    if held(KeyCode::KeyW, KeyCode::ArrowUp) {
        dir.y -= 1.0;
    }
    if held(KeyCode::KeyS, KeyCode::ArrowDown) {
        dir.y += 1.0;
    }
    if held(KeyCode::KeyA, KeyCode::ArrowLeft) {
        dir.x -= 1.0;
    }
    if held(KeyCode::KeyD, KeyCode::ArrowRight) {
        dir.x += 1.0;
    }
    dir.normalize_or_zero()
}

// ---------------------------------------------------------------------------
// Systems
// ---------------------------------------------------------------------------

/// Runs after world init so the terrain already has its final size.
pub fn setup_camera(mut commands: Commands, terrain: Res<Terrain>) {
    let bounds = CameraBounds::from_field(terrain.height_grid());
    let orbit = OrbitCamera::framing(&bounds);
    commands.spawn((Camera3d::default(), orbit.transform()));
    commands.insert_resource(bounds);
    commands.insert_resource(orbit);
}

/// Re-read the footprint after generation and pull the focus back inside.
pub fn refresh_camera_bounds(
    mut generated: EventReader<TerrainGenerated>,
    terrain: Res<Terrain>,
    mut bounds: ResMut<CameraBounds>,
    mut orbit: ResMut<OrbitCamera>,
) {
    if generated.read().last().is_none() {
        return;
    }
    let fresh = CameraBounds::from_field(terrain.height_grid());
    if fresh != *bounds {
        *bounds = fresh;
        let focus = bounds.clamp(orbit.focus);
        orbit.focus = focus;
        orbit.distance = orbit.distance.min(bounds.max_distance());
    }
}

/// WASD / arrows, faster when zoomed out.
pub fn camera_pan_keyboard(
    keys: Res<ButtonInput<KeyCode>>,
    time: Res<Time>,
    bounds: Res<CameraBounds>,
    mut orbit: ResMut<OrbitCamera>,
) {
    let dir = pan_direction(&keys);
    if dir == Vec2::ZERO {
        return;
    }
    let amount = PAN_SPEED * (orbit.distance / PAN_REFERENCE_DISTANCE) * time.delta_secs();
    orbit.pan(dir, amount, &bounds);
}

/// Right-drag orbits: horizontal motion turns, vertical motion tilts.
pub fn camera_orbit_drag(
    buttons: Res<ButtonInput<MouseButton>>,
    mut motion: EventReader<MouseMotion>,
    mut orbit: ResMut<OrbitCamera>,
) {
    let drag: Vec2 = motion.read().map(|m| m.delta).sum();
    if buttons.pressed(MouseButton::Right) && drag != Vec2::ZERO {
        orbit.orbit(drag);
    }
}

pub fn camera_zoom(
    mut wheel: EventReader<MouseWheel>,
    bounds: Res<CameraBounds>,
    mut orbit: ResMut<OrbitCamera>,
) {
    let lines: f32 = wheel
        .read()
        .map(|w| match w.unit {
            MouseScrollUnit::Line => w.y,
            MouseScrollUnit::Pixel => w.y / PIXELS_PER_LINE,
        })
        .sum();
    if lines != 0.0 {
        orbit.zoom(lines, &bounds);
    }
}

pub fn apply_orbit_camera(
    orbit: Res<OrbitCamera>,
    mut query: Query<&mut Transform, With<Camera3d>>,
) {
    if !orbit.is_changed() {
        return;
    }
    for mut transform in &mut query {
        *transform = orbit.transform();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use simulation::height_grid::HeightGrid;

    fn bounds_for(size: usize) -> CameraBounds {
        CameraBounds::from_field(&HeightGrid::new(size, 2.0))
    }

    #[test]
    fn test_bounds_follow_grid_layout() {
        let b = bounds_for(129);
        assert_eq!(b.min, Vec2::splat(-64.0));
        assert_eq!(b.max, Vec2::splat(192.0));
        assert_eq!(b.center(), Vec2::splat(64.0));

        let b = bounds_for(257);
        assert_eq!(b.min, Vec2::splat(-128.0));
        assert_eq!(b.max, Vec2::splat(384.0));
    }

    #[test]
    fn test_empty_field_has_point_bounds() {
        let b = CameraBounds::from_field(&HeightGrid::new(0, 2.0));
        assert_eq!(b.center(), Vec2::ZERO);
        assert_eq!(b.span(), MIN_DISTANCE);
    }

    #[test]
    fn test_framing_looks_at_terrain_center() {
        let b = bounds_for(129);
        let orbit = OrbitCamera::framing(&b);
        assert_eq!(orbit.focus, Vec3::new(64.0, 0.0, 64.0));
        let eye = orbit.eye();
        assert!(((eye - orbit.focus).length() - orbit.distance).abs() < 1e-3);
        assert!(eye.y > 0.0);
    }

    #[test]
    fn test_pan_reaches_far_edge_of_large_world() {
        let b = bounds_for(257);
        let mut orbit = OrbitCamera::framing(&b);
        orbit.yaw = 0.0;
        orbit.pan(Vec2::X, 1.0e4, &b);
        assert_eq!(orbit.focus.x, 384.0);
        orbit.pan(Vec2::new(0.0, -1.0), 1.0e4, &b);
        assert_eq!(orbit.focus.z, -128.0);
    }

    #[test]
    fn test_pan_is_turned_by_yaw() {
        let b = bounds_for(129);
        let mut orbit = OrbitCamera::framing(&b);
        orbit.yaw = std::f32::consts::FRAC_PI_2;
        let start = orbit.focus;
        // Screen-right at a quarter turn points along world -z.
        orbit.pan(Vec2::X, 10.0, &b);
        let moved = orbit.focus - start;
        assert!(moved.x.abs() < 1e-4);
        assert!((moved.z + 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_orbit_clamps_pitch() {
        let mut orbit = OrbitCamera::framing(&bounds_for(33));
        orbit.orbit(Vec2::new(0.0, -1.0e5));
        assert_eq!(orbit.pitch, MAX_PITCH);
        orbit.orbit(Vec2::new(0.0, 1.0e5));
        assert_eq!(orbit.pitch, MIN_PITCH);
    }

    #[test]
    fn test_zoom_stays_within_limits() {
        let b = bounds_for(65);
        let mut orbit = OrbitCamera::framing(&b);
        for _ in 0..100 {
            orbit.zoom(3.0, &b);
        }
        assert_eq!(orbit.distance, MIN_DISTANCE);
        for _ in 0..100 {
            orbit.zoom(-3.0, &b);
        }
        assert_eq!(orbit.distance, b.max_distance());
    }

    #[test]
    fn test_setup_frames_resized_terrain() {
        let mut app = App::new();
        app.insert_resource(Terrain::new(257).unwrap())
            .add_systems(Update, setup_camera);
        app.update();
        let bounds = *app.world().resource::<CameraBounds>();
        assert_eq!(bounds.max, Vec2::splat(384.0));
        let orbit = app.world().resource::<OrbitCamera>();
        assert_eq!(orbit.focus, Vec3::new(128.0, 0.0, 128.0));
    }
}
