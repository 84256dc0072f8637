//! Runtime invariant guards for the terrain and water grids.
//!
//! Every `INVARIANT_CHECK_INTERVAL` ticks the grids are scanned for NaN or
//! infinite heights. A violation is logged once per sweep and counted; the
//! water surface is reset so a blown-up simulation does not keep
//! propagating garbage.

use bevy::prelude::*;

use crate::config::INVARIANT_CHECK_INTERVAL;
use crate::height_grid::HeightField;
use crate::terrain::Terrain;
use crate::wave::Fluid;
use crate::TickCounter;

/// Violations seen by the most recent sweep, plus a running total.
#[derive(Resource, Default, Debug)]
pub struct InvariantViolations {
    pub terrain: u32,
    pub fluid: u32,
    pub total: u64,
}

pub fn validate_grids(
    tick: Res<TickCounter>,
    terrain: Res<Terrain>,
    mut fluid: ResMut<Fluid>,
    mut violations: ResMut<InvariantViolations>,
) {
    if !tick.0.is_multiple_of(INVARIANT_CHECK_INTERVAL) {
        return;
    }
    violations.terrain = 0;
    violations.fluid = 0;

    if let Some((x, z)) = terrain.height_grid().first_non_finite() {
        warn!("Invariant violation: terrain height at ({x}, {z}) is not finite");
        violations.terrain += 1;
    }

    if let Some((x, z)) = fluid.grid.first_non_finite() {
        warn!("Invariant violation: water height at ({x}, {z}) is not finite. Resetting water.");
        fluid.grid.reset_water();
        violations.fluid += 1;
    }

    violations.total += (violations.terrain + violations.fluid) as u64;
}

pub struct InvariantChecksPlugin;

impl Plugin for InvariantChecksPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<InvariantViolations>().add_systems(
            FixedUpdate,
            validate_grids
                .after(crate::wave::systems::update_fluid_stats)
                .in_set(crate::SimulationSet::PostSim),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_harness::TestWorld;

    #[test]
    fn test_clean_grids_report_no_violations() {
        let mut world = TestWorld::new(17);
        world.tick(INVARIANT_CHECK_INTERVAL as u32);
        let v = world.resource::<InvariantViolations>();
        assert_eq!(v.total, 0);
    }

    #[test]
    fn test_non_finite_water_is_reset() {
        let mut world = TestWorld::new(17);
        world.fluid_mut().grid.set_height(8, 8, f32::NAN);
        world.tick(INVARIANT_CHECK_INTERVAL as u32);
        let v = world.resource::<InvariantViolations>();
        assert!(v.total >= 1);
        assert_eq!(world.fluid().grid.first_non_finite(), None);
    }
}
