//! A* search with danger-weighted step costs.

use std::{cmp::Ordering, collections::BinaryHeap, sync::Arc};

use delve_core::{CellCoord, Heuristic};

use crate::{SearchGrid, SearchOutcome, State};

/// The search gives up once it popped this many times the cell count from
/// its frontier.
pub const EXPLORED_LIMIT_FACTOR: usize = 5;

/// Frontier entry pairing an immutable [`State`] with its queue priority.
#[derive(Debug)]
struct Frontier {
    priority: f64,
    cost: f64,
    sequence: u64,
    state: Arc<State>,
}

impl PartialEq for Frontier {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Frontier {}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed for min-heap behaviour; older entries win ties.
        other
            .priority
            .total_cmp(&self.priority)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

/// A* search from `start` toward `goal`.
///
/// Each step costs `1 + danger(cell)`, so routes bend away from hostile
/// entities without treating their surroundings as walls. The search aborts
/// once it popped more than [`EXPLORED_LIMIT_FACTOR`] times the number of
/// grid cells from its frontier, counting entries superseded by a cheaper
/// route to the same cell.
#[must_use]
pub fn a_star(
    grid: &SearchGrid,
    start: CellCoord,
    goal: CellCoord,
    heuristic: Heuristic,
) -> SearchOutcome {
    let limit = grid.cell_count().saturating_mul(EXPLORED_LIMIT_FACTOR);
    bounded(grid, start, goal, heuristic, limit)
}

fn bounded(
    grid: &SearchGrid,
    start: CellCoord,
    goal: CellCoord,
    heuristic: Heuristic,
    limit: usize,
) -> SearchOutcome {
    let mut outcome = SearchOutcome::default();
    let mut explored = 0_usize;
    let mut best_cost = vec![f64::INFINITY; grid.cell_count()];
    let mut closed = vec![false; grid.cell_count()];
    let mut frontier = BinaryHeap::new();
    let mut sequence = 0_u64;

    best_cost[grid.index(start)] = 0.0;
    frontier.push(Frontier {
        priority: heuristic.estimate(start, goal),
        cost: 0.0,
        sequence,
        state: Arc::new(State::start(start)),
    });

    while let Some(Frontier { cost, state, .. }) = frontier.pop() {
        explored += 1;
        if explored > limit {
            break;
        }

        let cell = state.cell();
        let index = grid.index(cell);
        if closed[index] {
            continue;
        }
        closed[index] = true;
        outcome.expanded.push(cell);

        if cell == goal {
            outcome.goal = Some(0);
            outcome.route = Some(state.route());
            break;
        }

        if !grid.expandable(cell, start) {
            continue;
        }

        for (direction, next) in grid.successors(cell) {
            let next_index = grid.index(next);
            if closed[next_index] {
                continue;
            }

            let next_cost = cost + grid.step_cost(next);
            if next_cost >= best_cost[next_index] {
                continue;
            }
            best_cost[next_index] = next_cost;

            sequence += 1;
            frontier.push(Frontier {
                priority: next_cost + heuristic.estimate(next, goal),
                cost: next_cost,
                sequence,
                state: Arc::new(State::successor(&state, direction, next)),
            });
        }
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frontier_pops_lowest_priority_first() {
        let state = Arc::new(State::start(CellCoord::new(0, 0)));
        let mut heap = BinaryHeap::new();
        for (sequence, priority) in [(0, 4.0), (1, 1.5), (2, 1.5), (3, 9.0)] {
            heap.push(Frontier {
                priority,
                cost: 0.0,
                sequence,
                state: Arc::clone(&state),
            });
        }

        let order: Vec<u64> =
            std::iter::from_fn(|| heap.pop().map(|entry| entry.sequence)).collect();
        assert_eq!(order, vec![1, 2, 0, 3]);
    }

    #[test]
    fn walks_around_walls() {
        let mut grid = SearchGrid::new(3, 3);
        grid.block(CellCoord::new(1, 0));
        grid.block(CellCoord::new(1, 1));

        let outcome = a_star(
            &grid,
            CellCoord::new(0, 0),
            CellCoord::new(2, 0),
            Heuristic::Manhattan,
        );

        let route = outcome.route.expect("route around the wall");
        assert_eq!(route.len(), 7);
        assert!(route.cells().all(|cell| grid.passage(cell) != crate::Passage::Blocked));
    }

    #[test]
    fn stops_once_frontier_pops_exceed_limit() {
        let grid = SearchGrid::new(5, 5);
        let start = CellCoord::new(0, 0);
        let goal = CellCoord::new(4, 4);

        let cut_short = bounded(&grid, start, goal, Heuristic::Manhattan, 3);
        assert!(!cut_short.is_success());
        assert_eq!(cut_short.expanded.len(), 3);

        let generous = bounded(&grid, start, goal, Heuristic::Manhattan, 25);
        assert_eq!(generous.route.map(|route| route.len()), Some(9));
    }

    #[test]
    fn limit_below_required_pops_gives_up() {
        let mut grid = SearchGrid::new(4, 1);
        grid.mark_hostile(CellCoord::new(3, 0));
        let start = CellCoord::new(0, 0);
        let goal = CellCoord::new(3, 0);

        let full = bounded(&grid, start, goal, Heuristic::Manhattan, usize::MAX);
        assert!(full.is_success());

        let exact = full.expanded.len();
        let tight = bounded(&grid, start, goal, Heuristic::Manhattan, exact - 1);
        assert!(!tight.is_success());
    }
}
