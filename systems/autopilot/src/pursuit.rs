//! Enemy pursuit: chase the player's current cell.

use std::sync::Arc;

use delve_core::{CellCoord, Direction, EntityId, GoalKind};
use delve_system_search::SearchGrid;
use delve_world::World;

use crate::{Availability, Destination, DestinationQueue, Pilot};

/// Steers one enemy toward the player by recording movement intents.
///
/// The enemy's own loop executes the intent, so an attack happens when the
/// chosen step runs into the player.
#[derive(Clone, Debug)]
pub struct EnemyPursuit {
    world: Arc<World>,
    agent: EntityId,
}

impl EnemyPursuit {
    /// Creates a pursuit adapter for `enemy`.
    #[must_use]
    pub fn new(world: Arc<World>, enemy: EntityId) -> Self {
        Self {
            world,
            agent: enemy,
        }
    }
}

impl Pilot for EnemyPursuit {
    fn agent(&self) -> EntityId {
        self.agent
    }

    fn is_active(&self) -> bool {
        self.world.is_active(self.agent)
    }

    fn position(&self) -> Option<CellCoord> {
        self.world.position(self.agent)
    }

    fn refresh(&self, queue: &mut DestinationQueue) {
        queue.clear();
        let player = self.world.player();
        if !self.world.is_active(player) {
            return;
        }
        if let Some(cell) = self.world.position(player) {
            queue.push(Destination::new(cell, GoalKind::Player, Some(player)));
        }
    }

    fn availability(&self, _destination: &Destination) -> Availability {
        Availability::Obtainable
    }

    fn has_arrived(&self, _start: CellCoord, _destination: &Destination) -> bool {
        false
    }

    fn complete(&self, _destination: &Destination) -> bool {
        false
    }

    fn snapshot(&self, terminals: &[CellCoord]) -> SearchGrid {
        self.world.search_grid(self.agent, terminals)
    }

    fn act(&self, direction: Direction) -> bool {
        self.world.set_intent(self.agent, Some(direction));
        true
    }
}
