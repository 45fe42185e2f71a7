#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Grid pathfinding engine shared by the player autopilot, enemy pursuit and
//! scene generation.
//!
//! Every algorithm expands nodes through the same primitive (up, down, left,
//! right onto cells the agent may enter) and reconstructs its answer from the
//! predecessor chain of the node it terminated on, so the resulting [`Route`]
//! has identical shape regardless of the strategy that produced it.

mod astar;
mod breadth_first;
mod depth_first;
mod grid;
mod state;

use delve_core::{CellCoord, Heuristic, SearchAlgorithm};

pub use astar::{a_star, EXPLORED_LIMIT_FACTOR};
pub use breadth_first::{breadth_first, breadth_first_multi, reachable};
pub use depth_first::depth_first;
pub use grid::{
    Passage, SearchGrid, DANGER_DIAGONAL, DANGER_DIRECT, DANGER_ORTHOGONAL, DANGER_OUTER,
};
pub use state::{Route, RouteStep, State};

/// Goal offered to a multi-goal search together with its ranking weight.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Target {
    /// Cell the agent wants to reach.
    pub cell: CellCoord,
    /// Higher values win over closer but less important targets.
    pub importance: i32,
}

impl Target {
    /// Creates a new target.
    #[must_use]
    pub const fn new(cell: CellCoord, importance: i32) -> Self {
        Self { cell, importance }
    }
}

/// Result of a single search call.
#[derive(Clone, Debug, Default)]
pub struct SearchOutcome {
    /// Route to the selected goal, or `None` when no goal was reached.
    pub route: Option<Route>,
    /// Index of the goal the route leads to within the offered list.
    pub goal: Option<usize>,
    /// Cells in the order their nodes were expanded.
    pub expanded: Vec<CellCoord>,
}

impl SearchOutcome {
    /// Reports whether the search reached a goal.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.route.is_some()
    }
}

/// Runs the single-goal variant of `algorithm` from `start` to `goal`.
///
/// `heuristic` only influences [`SearchAlgorithm::AStar`].
#[must_use]
pub fn plan(
    algorithm: SearchAlgorithm,
    grid: &SearchGrid,
    start: CellCoord,
    goal: CellCoord,
    heuristic: Heuristic,
) -> SearchOutcome {
    match algorithm {
        SearchAlgorithm::BreadthFirst => breadth_first(grid, start, goal),
        SearchAlgorithm::DepthFirst => depth_first(grid, start, goal),
        SearchAlgorithm::AStar => a_star(grid, start, goal, heuristic),
    }
}
