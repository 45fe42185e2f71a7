//! Goals an agent controller works through.

use delve_core::{CellCoord, EntityId, GoalKind, Operation};
use delve_system_search::{State, Target};

/// Ranking weight of a goal kind; higher values are pursued first.
#[must_use]
pub const fn importance_of(kind: GoalKind) -> i32 {
    match kind {
        GoalKind::Key => 4,
        GoalKind::Chest => 3,
        GoalKind::Portal => 2,
        GoalKind::Exit => 1,
        GoalKind::Player => 0,
    }
}

/// Whether a destination can be pursued right now.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Availability {
    /// Conditions hold; the destination takes part in this tick's search.
    Obtainable,
    /// Conditions fail for now; the destination is skipped without searching.
    Unavailable,
    /// The target is gone for good; the destination is dropped.
    Gone,
}

/// Goal node tagged with the entity waiting there.
#[derive(Clone, Debug)]
pub struct Destination {
    goal: State,
    target: Option<EntityId>,
}

impl Destination {
    /// Creates a destination of `kind` at `cell`, ranked by [`importance_of`].
    #[must_use]
    pub fn new(cell: CellCoord, kind: GoalKind, target: Option<EntityId>) -> Self {
        Self {
            goal: State::goal(cell, kind, importance_of(kind)),
            target,
        }
    }

    /// Goal node describing the destination.
    #[must_use]
    pub fn goal(&self) -> &State {
        &self.goal
    }

    /// Cell to reach.
    #[must_use]
    pub fn cell(&self) -> CellCoord {
        self.goal.cell()
    }

    /// Kind of completion action waiting at the destination.
    #[must_use]
    pub fn kind(&self) -> GoalKind {
        match self.goal.operation() {
            Operation::Arrive(kind) => kind,
            Operation::Start | Operation::Move(_) => GoalKind::Player,
        }
    }

    /// Entity the completion action applies to.
    #[must_use]
    pub const fn target(&self) -> Option<EntityId> {
        self.target
    }

    /// Ranking weight.
    #[must_use]
    pub fn importance(&self) -> i32 {
        self.goal.importance()
    }

    /// Search target equivalent of the destination.
    #[must_use]
    pub fn as_target(&self) -> Target {
        Target::new(self.cell(), self.importance())
    }
}

/// Ordered collection of destinations owned by one controller.
#[derive(Clone, Debug, Default)]
pub struct DestinationQueue {
    entries: Vec<Destination>,
}

impl DestinationQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a destination.
    pub fn push(&mut self, destination: Destination) {
        self.entries.push(destination);
    }

    /// Drops every destination.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Keeps only the destinations `keep` approves of.
    pub fn retain<F>(&mut self, keep: F)
    where
        F: FnMut(&Destination) -> bool,
    {
        self.entries.retain(keep);
    }

    /// Removes the first destination equal in cell, kind and target to
    /// `destination`, returning whether one was found.
    pub fn remove(&mut self, destination: &Destination) -> bool {
        let position = self.entries.iter().position(|entry| {
            entry.cell() == destination.cell()
                && entry.kind() == destination.kind()
                && entry.target == destination.target
        });
        match position {
            Some(index) => {
                let _ = self.entries.remove(index);
                true
            }
            None => false,
        }
    }

    /// Number of queued destinations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Reports whether nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Queued destinations in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Destination> {
        self.entries.iter()
    }

    /// Destinations ranked for an agent standing on `start`: importance
    /// descending, then Manhattan distance ascending, then insertion order.
    #[must_use]
    pub fn ranked_from(&self, start: CellCoord) -> Vec<&Destination> {
        let mut ranked: Vec<&Destination> = self.entries.iter().collect();
        ranked.sort_by(|a, b| {
            b.importance()
                .cmp(&a.importance())
                .then_with(|| {
                    start
                        .manhattan_distance(a.cell())
                        .cmp(&start.manhattan_distance(b.cell()))
                })
        });
        ranked
    }
}

impl FromIterator<Destination> for DestinationQueue {
    fn from_iter<I: IntoIterator<Item = Destination>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
