//! Deterministic ordering via `SystemSet` phases.
//!
//! ```text
//! PreSim  →  Simulation  →  PostSim
//! ```
//!
//! * **PreSim** – Tick counter, terrain generation requests, border sync,
//!   water impulses and rain.
//! * **Simulation** – The wave step.
//! * **PostSim** – Statistics and invariant checks. These only *read*
//!   simulation state, so rendering in `Update` always sees a completed tick.

use bevy::prelude::*;

/// Ordered phases for systems running in the `FixedUpdate` schedule.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SimulationSet {
    PreSim,
    Simulation,
    PostSim,
}
