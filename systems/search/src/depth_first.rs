//! Depth-first single-goal search.

use std::sync::Arc;

use delve_core::CellCoord;

use crate::{SearchGrid, SearchOutcome, State};

/// Depth-first search from `start` toward `goal`.
///
/// Routes are valid but not necessarily shortest.
#[must_use]
pub fn depth_first(grid: &SearchGrid, start: CellCoord, goal: CellCoord) -> SearchOutcome {
    let mut outcome = SearchOutcome::default();
    let mut visited = vec![false; grid.cell_count()];
    let mut stack = vec![Arc::new(State::start(start))];
    visited[grid.index(start)] = true;

    while let Some(state) = stack.pop() {
        let cell = state.cell();
        outcome.expanded.push(cell);

        if cell == goal {
            outcome.goal = Some(0);
            outcome.route = Some(state.route());
            break;
        }

        if !grid.expandable(cell, start) {
            continue;
        }

        // Reversed so the first neighbour in expansion order is popped first.
        for (direction, next) in grid.successors(cell).rev() {
            let index = grid.index(next);
            if visited[index] {
                continue;
            }
            visited[index] = true;
            stack.push(Arc::new(State::successor(&state, direction, next)));
        }
    }

    outcome
}
