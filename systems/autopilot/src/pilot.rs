//! Capabilities a controller needs from the agent it steers.

use delve_core::{CellCoord, Direction, EntityId};
use delve_system_search::SearchGrid;

use crate::{Availability, Destination, DestinationQueue};

/// Agent adapter driven by [`Controller`](crate::Controller).
pub trait Pilot {
    /// Entity being steered.
    fn agent(&self) -> EntityId;

    /// Reports whether the entity is in play and the scene still runs.
    fn is_active(&self) -> bool;

    /// Current cell of the entity.
    fn position(&self) -> Option<CellCoord>;

    /// Brings the queue up to date before destinations are ranked.
    fn refresh(&self, queue: &mut DestinationQueue);

    /// Evaluates the destination's preconditions.
    fn availability(&self, destination: &Destination) -> Availability;

    /// Reports whether an agent on `start` is close enough to complete
    /// `destination`.
    fn has_arrived(&self, start: CellCoord, destination: &Destination) -> bool;

    /// Runs the completion action; returns whether it committed.
    fn complete(&self, destination: &Destination) -> bool;

    /// Passability field to plan against; occupied `terminals` stay
    /// enterable as goals.
    fn snapshot(&self, terminals: &[CellCoord]) -> SearchGrid;

    /// Issues one move; returns whether it was accepted.
    fn act(&self, direction: Direction) -> bool;
}
