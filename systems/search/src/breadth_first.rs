//! Breadth-first search with multi-goal re-targeting.

use std::{collections::VecDeque, sync::Arc};

use delve_core::CellCoord;

use crate::{SearchGrid, SearchOutcome, State, Target};

/// Breadth-first search from `start` toward a single `goal`.
#[must_use]
pub fn breadth_first(grid: &SearchGrid, start: CellCoord, goal: CellCoord) -> SearchOutcome {
    breadth_first_multi(grid, start, &[Target::new(goal, 0)])
}

/// Breadth-first search against several goals at once.
///
/// The selected goal is the most important reached target; among equally
/// important targets the one fewer steps away wins, and remaining ties go to
/// the target discovered first. The flood stops as soon as a target of the
/// highest offered importance is popped, because no later pop can be closer.
#[must_use]
pub fn breadth_first_multi(grid: &SearchGrid, start: CellCoord, targets: &[Target]) -> SearchOutcome {
    let mut outcome = SearchOutcome::default();
    let Some(best_importance) = targets.iter().map(|target| target.importance).max() else {
        return outcome;
    };

    let mut reached: Vec<(usize, Arc<State>)> = Vec::new();
    let mut visited = vec![false; grid.cell_count()];
    let mut queue = VecDeque::new();

    visited[grid.index(start)] = true;
    queue.push_back(Arc::new(State::start(start)));

    while let Some(state) = queue.pop_front() {
        let cell = state.cell();
        outcome.expanded.push(cell);

        let mut settled = false;
        for (index, target) in targets.iter().enumerate() {
            if target.cell != cell || reached.iter().any(|(seen, _)| *seen == index) {
                continue;
            }
            reached.push((index, Arc::clone(&state)));
            settled |= target.importance == best_importance;
        }
        if settled || reached.len() == targets.len() {
            break;
        }

        if !grid.expandable(cell, start) {
            continue;
        }

        for (direction, next) in grid.successors(cell) {
            let index = grid.index(next);
            if visited[index] {
                continue;
            }
            visited[index] = true;
            queue.push_back(Arc::new(State::successor(&state, direction, next)));
        }
    }

    // `reached` is in pop order; on a full tie the earlier pop ranks higher.
    let best = reached
        .iter()
        .enumerate()
        .max_by(|(order_a, (index_a, state_a)), (order_b, (index_b, state_b))| {
            targets[*index_a]
                .importance
                .cmp(&targets[*index_b].importance)
                .then_with(|| state_b.depth().cmp(&state_a.depth()))
                .then_with(|| order_b.cmp(order_a))
        })
        .map(|(_, entry)| entry);

    if let Some((index, state)) = best {
        outcome.goal = Some(*index);
        outcome.route = Some(state.route());
    }
    outcome
}

/// Feasibility oracle: reports whether `to` can be reached from `from`.
#[must_use]
pub fn reachable(grid: &SearchGrid, from: CellCoord, to: CellCoord) -> bool {
    breadth_first(grid, from, to).is_success()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefers_important_targets_over_close_ones() {
        let grid = SearchGrid::new(6, 1);
        let near = Target::new(CellCoord::new(1, 0), 1);
        let far = Target::new(CellCoord::new(5, 0), 3);

        let outcome = breadth_first_multi(&grid, CellCoord::new(0, 0), &[near, far]);

        assert_eq!(outcome.goal, Some(1));
        assert_eq!(outcome.route.map(|route| route.len()), Some(6));
    }

    #[test]
    fn breaks_importance_ties_by_distance() {
        let grid = SearchGrid::new(7, 1);
        let start = CellCoord::new(3, 0);
        let far = Target::new(CellCoord::new(0, 0), 2);
        let near = Target::new(CellCoord::new(5, 0), 2);

        let outcome = breadth_first_multi(&grid, start, &[far, near]);

        assert_eq!(outcome.goal, Some(1));
    }

    #[test]
    fn falls_back_to_less_important_reachable_target() {
        let mut grid = SearchGrid::new(5, 1);
        grid.block(CellCoord::new(3, 0));
        let blocked = Target::new(CellCoord::new(4, 0), 5);
        let open = Target::new(CellCoord::new(0, 0), 1);

        let outcome = breadth_first_multi(&grid, CellCoord::new(2, 0), &[blocked, open]);

        assert_eq!(outcome.goal, Some(1));
    }

    #[test]
    fn empty_target_list_expands_nothing() {
        let grid = SearchGrid::new(3, 3);
        let outcome = breadth_first_multi(&grid, CellCoord::new(0, 0), &[]);
        assert!(!outcome.is_success());
        assert!(outcome.expanded.is_empty());
    }
}
