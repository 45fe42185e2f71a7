#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Agent controllers that plan over the world grid and act one step at a time.
//!
//! A [`Controller`] owns a [`DestinationQueue`] and, every tick, re-reads the
//! agent's position, drops destinations that are gone, completes the one it
//! stands on, searches toward the rest and issues the first step of the
//! found route. Everything agent-specific sits behind the [`Pilot`] trait,
//! implemented by [`PlayerAutopilot`] and [`EnemyPursuit`].

mod controller;
mod destination;
mod pilot;
mod player;
mod pursuit;

use std::sync::Arc;

use delve_core::{EntityId, Heuristic, SearchAlgorithm};
use delve_world::World;
use serde::Deserialize;

pub use controller::{Controller, TickOutcome};
pub use destination::{importance_of, Availability, Destination, DestinationQueue};
pub use pilot::Pilot;
pub use player::PlayerAutopilot;
pub use pursuit::EnemyPursuit;

/// Search configuration for both kinds of controllers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Algorithm the player autopilot plans with.
    pub autopilot: SearchAlgorithm,
    /// Algorithm enemies chase the player with.
    pub pursuit: SearchAlgorithm,
    /// Distance estimate used whenever A* is selected.
    pub heuristic: Heuristic,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            autopilot: SearchAlgorithm::BreadthFirst,
            pursuit: SearchAlgorithm::AStar,
            heuristic: Heuristic::Manhattan,
        }
    }
}

/// Creates the autopilot controller for the world's player.
#[must_use]
pub fn player_controller(
    world: Arc<World>,
    settings: &SearchSettings,
    seed: u64,
) -> Controller<PlayerAutopilot> {
    let pilot = PlayerAutopilot::new(world);
    let queue = pilot.destinations();
    Controller::new(pilot, queue, settings.autopilot, settings.heuristic, seed)
}

/// Creates the pursuit controller for `enemy`.
#[must_use]
pub fn pursuit_controller(
    world: Arc<World>,
    enemy: EntityId,
    settings: &SearchSettings,
    seed: u64,
) -> Controller<EnemyPursuit> {
    let pilot = EnemyPursuit::new(world, enemy);
    Controller::new(
        pilot,
        DestinationQueue::new(),
        settings.pursuit,
        settings.heuristic,
        seed,
    )
}
