//! Player autopilot: collects keys, opens chests, uses portals and leaves.

use std::sync::Arc;

use delve_core::{CellCoord, Direction, EntityId, GoalKind};
use delve_system_search::SearchGrid;
use delve_world::{
    query, ChestState, EntityClass, EntityKind, KeyState, PortalState, StepOutcome, World,
};

use crate::{Availability, Destination, DestinationQueue, Pilot};

/// Steers the player of a world.
#[derive(Clone, Debug)]
pub struct PlayerAutopilot {
    world: Arc<World>,
    agent: EntityId,
}

impl PlayerAutopilot {
    /// Creates an autopilot for the world's player.
    #[must_use]
    pub fn new(world: Arc<World>) -> Self {
        let agent = world.player();
        Self { world, agent }
    }

    /// Builds the initial queue: every unused key, closed chest and portal,
    /// plus the exit.
    #[must_use]
    pub fn destinations(&self) -> DestinationQueue {
        let view = query::entity_view(&self.world);
        let mut queue: DestinationQueue = view
            .iter()
            .filter_map(|snapshot| {
                let kind = match &snapshot.kind {
                    EntityKind::Key(KeyState::Unused) => GoalKind::Key,
                    EntityKind::Chest(data) if data.state == ChestState::Closed => GoalKind::Chest,
                    EntityKind::Portal(_) => GoalKind::Portal,
                    _ => return None,
                };
                Some(Destination::new(snapshot.cell, kind, Some(snapshot.id)))
            })
            .collect();
        if let Some(exit) = self.world.exit() {
            queue.push(Destination::new(exit, GoalKind::Exit, None));
        }
        queue
    }

    fn key_availability(&self, key: EntityId) -> Availability {
        match self.world.inspect(key, |entity| entity.kind.clone()) {
            Some(EntityKind::Key(KeyState::Unused)) => Availability::Obtainable,
            _ => Availability::Gone,
        }
    }

    fn chest_availability(&self, chest: EntityId) -> Availability {
        let state = self
            .world
            .inspect(chest, |entity| match &entity.kind {
                EntityKind::Chest(data) => Some(data.state),
                _ => None,
            })
            .flatten();
        if state != Some(ChestState::Closed) {
            return Availability::Gone;
        }
        let win_gems = self.world.rules().win_gems;
        let ready = self
            .world
            .inspect(self.agent, |entity| {
                entity
                    .as_player()
                    .is_some_and(|player| !player.keys.is_empty() && player.gems < win_gems)
            })
            .unwrap_or(false);
        if ready {
            Availability::Obtainable
        } else {
            Availability::Unavailable
        }
    }

    fn portal_availability(&self, portal: EntityId) -> Availability {
        let state = self
            .world
            .inspect(portal, |entity| match &entity.kind {
                EntityKind::Portal(data) => Some(data.state),
                _ => None,
            })
            .flatten();
        match state {
            Some(PortalState::Active) => Availability::Obtainable,
            Some(PortalState::Inactive) => Availability::Unavailable,
            None => Availability::Gone,
        }
    }
}

impl Pilot for PlayerAutopilot {
    fn agent(&self) -> EntityId {
        self.agent
    }

    fn is_active(&self) -> bool {
        self.world.is_active(self.agent)
    }

    fn position(&self) -> Option<CellCoord> {
        self.world.position(self.agent)
    }

    fn refresh(&self, _queue: &mut DestinationQueue) {}

    fn availability(&self, destination: &Destination) -> Availability {
        match (destination.kind(), destination.target()) {
            (GoalKind::Key, Some(key)) => self.key_availability(key),
            (GoalKind::Chest, Some(chest)) => self.chest_availability(chest),
            (GoalKind::Portal, Some(portal)) => self.portal_availability(portal),
            (GoalKind::Exit, _) if self.world.door_open() => Availability::Obtainable,
            (GoalKind::Exit, _) => Availability::Unavailable,
            _ => Availability::Gone,
        }
    }

    fn has_arrived(&self, start: CellCoord, destination: &Destination) -> bool {
        let blocking = destination
            .target()
            .and_then(|target| self.world.class_of(target))
            .is_some_and(|class| class == EntityClass::Chest);
        if blocking {
            start.manhattan_distance(destination.cell()) == 1
        } else {
            start == destination.cell()
        }
    }

    fn complete(&self, destination: &Destination) -> bool {
        self.world
            .on_arrive(self.agent, destination.kind(), destination.target())
    }

    fn snapshot(&self, terminals: &[CellCoord]) -> SearchGrid {
        self.world.search_grid(self.agent, terminals)
    }

    fn act(&self, direction: Direction) -> bool {
        matches!(self.world.step(self.agent, direction), StepOutcome::Moved(_))
    }
}
