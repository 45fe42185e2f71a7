//! Passability view that every search algorithm traverses.

use delve_core::{CellCoord, Direction};

/// Extra cost charged for entering a cell that holds a hostile entity.
pub const DANGER_DIRECT: u32 = 12;
/// Extra cost charged for a cell orthogonally adjacent to a hostile entity.
pub const DANGER_ORTHOGONAL: u32 = 8;
/// Extra cost charged for a cell diagonally adjacent to a hostile entity.
pub const DANGER_DIAGONAL: u32 = 5;
/// Extra cost charged for a cell two cells away from a hostile entity.
pub const DANGER_OUTER: u32 = 2;

/// How a cell participates in a search.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Passage {
    /// The cell may be entered and expanded.
    #[default]
    Open,
    /// The cell can never be entered.
    Blocked,
    /// The cell may be entered as a goal but is never expanded from.
    Terminal,
}

/// Dense passability and danger field captured for one agent.
///
/// The grid is an owned snapshot: searches never observe concurrent
/// mutation of the world while they run.
#[derive(Clone, Debug)]
pub struct SearchGrid {
    columns: u32,
    rows: u32,
    passages: Vec<Passage>,
    danger: Vec<u32>,
}

impl SearchGrid {
    /// Creates a fully open grid with the provided dimensions.
    #[must_use]
    pub fn new(columns: u32, rows: u32) -> Self {
        let count = cell_count(columns, rows);
        Self {
            columns,
            rows,
            passages: vec![Passage::Open; count],
            danger: vec![0; count],
        }
    }

    /// Builds a grid by classifying every cell with `classify`.
    #[must_use]
    pub fn from_fn<F>(columns: u32, rows: u32, mut classify: F) -> Self
    where
        F: FnMut(CellCoord) -> Passage,
    {
        let mut grid = Self::new(columns, rows);
        for row in 0..rows {
            for column in 0..columns {
                let cell = CellCoord::new(column, row);
                let index = grid.index(cell);
                grid.passages[index] = classify(cell);
            }
        }
        grid
    }

    /// Number of columns and rows covered by the grid.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    /// Total number of cells.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.passages.len()
    }

    /// Reports whether `cell` lies inside the grid.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.columns && cell.row() < self.rows
    }

    /// Passage class of `cell`.
    ///
    /// # Panics
    ///
    /// Panics when `cell` lies outside the grid.
    #[must_use]
    pub fn passage(&self, cell: CellCoord) -> Passage {
        self.passages[self.index(cell)]
    }

    /// Overrides the passage class of `cell`.
    pub fn set_passage(&mut self, cell: CellCoord, passage: Passage) {
        let index = self.index(cell);
        self.passages[index] = passage;
    }

    /// Marks `cell` as impassable.
    pub fn block(&mut self, cell: CellCoord) {
        self.set_passage(cell, Passage::Blocked);
    }

    /// Registers a hostile entity at `cell`, raising the danger of the
    /// surrounding rings. Danger from several hostiles accumulates.
    pub fn mark_hostile(&mut self, cell: CellCoord) {
        let column_start = cell.column().saturating_sub(2);
        let row_start = cell.row().saturating_sub(2);
        let column_end = cell.column().saturating_add(2).min(self.columns.saturating_sub(1));
        let row_end = cell.row().saturating_add(2).min(self.rows.saturating_sub(1));

        for row in row_start..=row_end {
            for column in column_start..=column_end {
                let neighbour = CellCoord::new(column, row);
                if !self.contains(neighbour) {
                    continue;
                }
                let extra = match (
                    cell.chebyshev_distance(neighbour),
                    cell.manhattan_distance(neighbour),
                ) {
                    (0, _) => DANGER_DIRECT,
                    (1, 1) => DANGER_ORTHOGONAL,
                    (1, _) => DANGER_DIAGONAL,
                    _ => DANGER_OUTER,
                };
                let index = self.index(neighbour);
                self.danger[index] = self.danger[index].saturating_add(extra);
            }
        }
    }

    /// Accumulated danger surcharge for `cell`.
    #[must_use]
    pub fn danger(&self, cell: CellCoord) -> u32 {
        self.danger[self.index(cell)]
    }

    /// Cost A* charges for stepping into `cell`.
    #[must_use]
    pub fn step_cost(&self, cell: CellCoord) -> f64 {
        1.0 + f64::from(self.danger(cell))
    }

    pub(crate) fn index(&self, cell: CellCoord) -> usize {
        assert!(
            self.contains(cell),
            "cell {cell} lies outside the {}x{} search grid",
            self.columns,
            self.rows
        );
        cell.row() as usize * self.columns as usize + cell.column() as usize
    }

    /// Whether a node at `cell` may be expanded. The start node always may.
    pub(crate) fn expandable(&self, cell: CellCoord, start: CellCoord) -> bool {
        cell == start || self.passage(cell) != Passage::Terminal
    }

    /// In-bounds, enterable neighbours of `cell` in up, down, left, right order.
    pub(crate) fn successors(
        &self,
        cell: CellCoord,
    ) -> impl DoubleEndedIterator<Item = (Direction, CellCoord)> + '_ {
        Direction::ALL
            .map(|direction| {
                cell.step(direction, self.columns, self.rows)
                    .filter(|next| self.passage(*next) != Passage::Blocked)
                    .map(|next| (direction, next))
            })
            .into_iter()
            .flatten()
    }
}

fn cell_count(columns: u32, rows: u32) -> usize {
    let count = u64::from(columns) * u64::from(rows);
    usize::try_from(count).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hostile_rings_escalate_toward_the_enemy() {
        let mut grid = SearchGrid::new(7, 7);
        let enemy = CellCoord::new(3, 3);
        grid.mark_hostile(enemy);

        assert_eq!(grid.danger(enemy), DANGER_DIRECT);
        assert_eq!(grid.danger(CellCoord::new(3, 2)), DANGER_ORTHOGONAL);
        assert_eq!(grid.danger(CellCoord::new(4, 4)), DANGER_DIAGONAL);
        assert_eq!(grid.danger(CellCoord::new(5, 3)), DANGER_OUTER);
        assert_eq!(grid.danger(CellCoord::new(6, 3)), 0);
    }

    #[test]
    fn hostile_rings_clip_at_the_border() {
        let mut grid = SearchGrid::new(3, 3);
        grid.mark_hostile(CellCoord::new(0, 0));

        assert_eq!(grid.danger(CellCoord::new(0, 0)), DANGER_DIRECT);
        assert_eq!(grid.danger(CellCoord::new(2, 2)), DANGER_OUTER);
    }

    #[test]
    fn successors_skip_blocked_cells() {
        let mut grid = SearchGrid::new(3, 3);
        grid.block(CellCoord::new(1, 0));
        let neighbours: Vec<_> = grid.successors(CellCoord::new(1, 1)).collect();

        assert_eq!(
            neighbours,
            vec![
                (Direction::South, CellCoord::new(1, 2)),
                (Direction::West, CellCoord::new(0, 1)),
                (Direction::East, CellCoord::new(2, 1)),
            ]
        );
    }

    #[test]
    #[should_panic(expected = "outside")]
    fn indexing_outside_the_grid_panics() {
        let grid = SearchGrid::new(2, 2);
        let _ = grid.passage(CellCoord::new(2, 0));
    }
}
