//! Keyboard controls for regenerating terrain and disturbing the water.
//!
//! | Key   | Action                                   |
//! |-------|------------------------------------------|
//! | G     | new fractal terrain                      |
//! | R     | add a sine/cosine ripple to the terrain  |
//! | N     | random noise terrain                     |
//! | F     | flatten the terrain                      |
//! | Space | drop water at the centre                 |
//! | C     | calm the water                           |
//! | P     | toggle damped / perpetual waves          |

use bevy::prelude::*;

use simulation::height_grid::HeightField;
use simulation::terrain::{GenerateTerrainRequest, GenerationMode};
use simulation::wave::{AddWaterRequest, Fluid, WaveMode, WaveParams};

const DROP_AMOUNT: f32 = 2.0;

pub fn terrain_keys(
    keys: Res<ButtonInput<KeyCode>>,
    mut requests: EventWriter<GenerateTerrainRequest>,
) {
    let mode = if keys.just_pressed(KeyCode::KeyG) {
        GenerationMode::Fractal
    } else if keys.just_pressed(KeyCode::KeyR) {
        GenerationMode::Ripple
    } else if keys.just_pressed(KeyCode::KeyN) {
        GenerationMode::Noise
    } else if keys.just_pressed(KeyCode::KeyF) {
        GenerationMode::Flat
    } else {
        return;
    };
    requests.send(GenerateTerrainRequest { mode });
}

pub fn water_keys(
    keys: Res<ButtonInput<KeyCode>>,
    mut fluid: ResMut<Fluid>,
    mut params: ResMut<WaveParams>,
    mut drops: EventWriter<AddWaterRequest>,
) {
    if keys.just_pressed(KeyCode::Space) {
        let c = fluid.grid.size() / 2;
        drops.send(AddWaterRequest {
            x: c,
            z: c,
            amount: DROP_AMOUNT,
        });
    }
    if keys.just_pressed(KeyCode::KeyC) {
        fluid.grid.reset_water();
        info!("Water calmed");
    }
    if keys.just_pressed(KeyCode::KeyP) {
        params.mode = match params.mode {
            WaveMode::Damped => WaveMode::Perpetual,
            WaveMode::Perpetual => WaveMode::Damped,
        };
        info!("Wave mode: {:?}", params.mode);
    }
}
