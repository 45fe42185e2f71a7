//! Search nodes and the routes reconstructed from their predecessor chains.

use std::{
    hash::{Hash, Hasher},
    sync::Arc,
};

use delve_core::{CellCoord, Direction, GoalKind, Operation};

/// Immutable search node.
///
/// Equality and hashing consider only the coordinates, so a visited set
/// collapses nodes that reached the same cell along different paths.
#[derive(Clone, Debug)]
pub struct State {
    cell: CellCoord,
    operation: Operation,
    importance: i32,
    predecessor: Option<Arc<State>>,
}

impl State {
    /// Root node of a search rooted at `cell`.
    #[must_use]
    pub const fn start(cell: CellCoord) -> Self {
        Self {
            cell,
            operation: Operation::Start,
            importance: 0,
            predecessor: None,
        }
    }

    /// Destination-shaped node describing a goal of `kind` at `cell`.
    #[must_use]
    pub const fn goal(cell: CellCoord, kind: GoalKind, importance: i32) -> Self {
        Self {
            cell,
            operation: Operation::Arrive(kind),
            importance,
            predecessor: None,
        }
    }

    /// Node reached from `parent` by moving in `direction` onto `cell`.
    #[must_use]
    pub fn successor(parent: &Arc<State>, direction: Direction, cell: CellCoord) -> Self {
        Self {
            cell,
            operation: Operation::Move(direction),
            importance: parent.importance,
            predecessor: Some(Arc::clone(parent)),
        }
    }

    /// Cell the node stands on.
    #[must_use]
    pub const fn cell(&self) -> CellCoord {
        self.cell
    }

    /// Operation that produced the node.
    #[must_use]
    pub const fn operation(&self) -> Operation {
        self.operation
    }

    /// Importance weight carried by destination nodes.
    #[must_use]
    pub const fn importance(&self) -> i32 {
        self.importance
    }

    /// Node this one was expanded from, if any.
    #[must_use]
    pub fn predecessor(&self) -> Option<&State> {
        self.predecessor.as_deref()
    }

    /// Number of predecessor links between this node and its root.
    #[must_use]
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut current = self.predecessor();
        while let Some(node) = current {
            depth += 1;
            current = node.predecessor();
        }
        depth
    }

    /// Walks the predecessor chain back to the root and returns the steps in
    /// travel order, root first.
    #[must_use]
    pub fn route(&self) -> Route {
        let mut steps = Vec::with_capacity(self.depth() + 1);
        let mut current = Some(self);
        while let Some(node) = current {
            steps.push(RouteStep {
                cell: node.cell,
                operation: node.operation,
            });
            current = node.predecessor();
        }
        steps.reverse();
        Route { steps }
    }
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.cell == other.cell
    }
}

impl Eq for State {}

impl Hash for State {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.cell.hash(state);
    }
}

/// Single element of a reconstructed route.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RouteStep {
    /// Cell occupied after the operation.
    pub cell: CellCoord,
    /// Operation that led onto the cell.
    pub operation: Operation,
}

/// Ordered step list produced by a successful search.
///
/// The first step is always the start marker; the second, when present, is
/// the first move the agent has to make.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Route {
    steps: Vec<RouteStep>,
}

impl Route {
    /// Steps in travel order, start marker first.
    #[must_use]
    pub fn steps(&self) -> &[RouteStep] {
        &self.steps
    }

    /// Operations in travel order, start marker first.
    #[must_use]
    pub fn operations(&self) -> Vec<Operation> {
        self.steps.iter().map(|step| step.operation).collect()
    }

    /// Cells visited in travel order, start cell first.
    pub fn cells(&self) -> impl Iterator<Item = CellCoord> + '_ {
        self.steps.iter().map(|step| step.cell)
    }

    /// Number of steps including the start marker.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Reports whether the route holds no steps at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Cell the route ends on.
    #[must_use]
    pub fn goal(&self) -> Option<CellCoord> {
        self.steps.last().map(|step| step.cell)
    }

    /// First move to make, i.e. the operation of step one.
    #[must_use]
    pub fn first_move(&self) -> Option<Direction> {
        self.steps.get(1).and_then(|step| step.operation.direction())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_ignores_the_path_taken() {
        let root = Arc::new(State::start(CellCoord::new(0, 0)));
        let east = Arc::new(State::successor(&root, Direction::East, CellCoord::new(1, 0)));
        let via_east = State::successor(&east, Direction::South, CellCoord::new(1, 1));
        let south = Arc::new(State::successor(&root, Direction::South, CellCoord::new(0, 1)));
        let via_south = State::successor(&south, Direction::East, CellCoord::new(1, 1));

        assert_eq!(via_east, via_south);
        assert_ne!(via_east.operation(), via_south.operation());
    }

    #[test]
    fn route_lists_start_marker_then_moves() {
        let root = Arc::new(State::start(CellCoord::new(2, 2)));
        let up = Arc::new(State::successor(&root, Direction::North, CellCoord::new(2, 1)));
        let left = State::successor(&up, Direction::West, CellCoord::new(1, 1));
        let route = left.route();

        assert_eq!(
            route.operations(),
            vec![
                Operation::Start,
                Operation::Move(Direction::North),
                Operation::Move(Direction::West),
            ]
        );
        assert_eq!(route.first_move(), Some(Direction::North));
        assert_eq!(route.goal(), Some(CellCoord::new(1, 1)));
        assert_eq!(left.depth(), 2);
    }

    #[test]
    fn root_route_has_no_move() {
        let route = State::start(CellCoord::new(4, 4)).route();
        assert_eq!(route.len(), 1);
        assert_eq!(route.first_move(), None);
    }
}
