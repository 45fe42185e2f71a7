//! Occupancy grid with one lock per cell.

use delve_core::{CellCoord, EntityId};
use parking_lot::{Mutex, MutexGuard};

/// Static terrain of a cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Tile {
    /// Walkable floor.
    #[default]
    Floor,
    /// Impassable wall.
    Wall,
}

/// Occupant slot within a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Layer {
    /// Slot holding the single entity that prevents traversal.
    Blocking,
    /// Passable slot beneath the blocking occupant (keys, portals).
    Bottom,
    /// Passable decoration above everything else (gems in transit).
    Top,
}

/// Contents of a single grid location.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Cell {
    /// Terrain beneath the occupants.
    pub tile: Tile,
    /// Entity preventing traversal, if any.
    pub blocking: Option<EntityId>,
    /// Passable entity lying on the floor, if any.
    pub bottom: Option<EntityId>,
    /// Decoration drawn above the cell, if any.
    pub top: Option<EntityId>,
}

impl Cell {
    /// Reports whether any of the three occupant slots is filled.
    #[must_use]
    pub fn contains_any(&self) -> bool {
        self.blocking.is_some() || self.bottom.is_some() || self.top.is_some()
    }

    /// Occupant stored in `layer`.
    #[must_use]
    pub fn slot(&self, layer: Layer) -> Option<EntityId> {
        match layer {
            Layer::Blocking => self.blocking,
            Layer::Bottom => self.bottom,
            Layer::Top => self.top,
        }
    }

    fn slot_mut(&mut self, layer: Layer) -> &mut Option<EntityId> {
        match layer {
            Layer::Blocking => &mut self.blocking,
            Layer::Bottom => &mut self.bottom,
            Layer::Top => &mut self.top,
        }
    }
}

/// Result of attempting to move an occupant between two cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transfer {
    /// The occupant now sits in the target cell.
    Moved,
    /// The target slot already holds another entity.
    Occupied(EntityId),
    /// The target cell is a wall.
    Walled,
    /// The occupant was no longer found in the source cell.
    Stale,
}

/// Fixed-size grid of cells guarded by one mutex each.
///
/// Cell coordinates outside the grid are a programming error and panic.
#[derive(Debug)]
pub struct Grid {
    columns: u32,
    rows: u32,
    cells: Vec<Mutex<Cell>>,
}

impl Grid {
    /// Creates an empty floor grid.
    #[must_use]
    pub fn new(columns: u32, rows: u32) -> Self {
        let capacity_u64 = u64::from(columns) * u64::from(rows);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        Self {
            columns,
            rows,
            cells: (0..capacity).map(|_| Mutex::new(Cell::default())).collect(),
        }
    }

    /// Number of columns and rows in the grid.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    /// Reports whether `cell` lies inside the grid.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.columns && cell.row() < self.rows
    }

    /// Copy of the cell contents taken under the cell's lock.
    #[must_use]
    pub fn cell(&self, cell: CellCoord) -> Cell {
        *self.lock(cell)
    }

    /// Blocking occupant of `cell`.
    #[must_use]
    pub fn occupant(&self, cell: CellCoord) -> Option<EntityId> {
        self.lock(cell).blocking
    }

    /// Replaces the blocking occupant of `cell`.
    pub fn set_occupant(&self, cell: CellCoord, occupant: Option<EntityId>) {
        self.set_occupant_in(cell, Layer::Blocking, occupant);
    }

    /// Occupant of `cell` in `layer`.
    #[must_use]
    pub fn occupant_in(&self, cell: CellCoord, layer: Layer) -> Option<EntityId> {
        self.lock(cell).slot(layer)
    }

    /// Replaces the occupant of `cell` in `layer`.
    pub fn set_occupant_in(&self, cell: CellCoord, layer: Layer, occupant: Option<EntityId>) {
        *self.lock(cell).slot_mut(layer) = occupant;
    }

    /// Stores `occupant` in `layer` only when the slot is empty.
    pub fn claim(&self, cell: CellCoord, layer: Layer, occupant: EntityId) -> bool {
        let mut guard = self.lock(cell);
        let slot = guard.slot_mut(layer);
        if slot.is_some() {
            return false;
        }
        *slot = Some(occupant);
        true
    }

    /// Empties `layer` of `cell` if it still holds `occupant`.
    pub fn release(&self, cell: CellCoord, layer: Layer, occupant: EntityId) -> bool {
        let mut guard = self.lock(cell);
        let slot = guard.slot_mut(layer);
        if *slot != Some(occupant) {
            return false;
        }
        *slot = None;
        true
    }

    /// Reports whether any occupant slot of `cell` is filled.
    #[must_use]
    pub fn contains_any(&self, cell: CellCoord) -> bool {
        self.lock(cell).contains_any()
    }

    /// Terrain of `cell`.
    #[must_use]
    pub fn tile(&self, cell: CellCoord) -> Tile {
        self.lock(cell).tile
    }

    /// Replaces the terrain of `cell`.
    pub fn set_tile(&self, cell: CellCoord, tile: Tile) {
        self.lock(cell).tile = tile;
    }

    /// Moves `occupant` from `from` to `to` within `layer`.
    ///
    /// Both cells are locked in ascending index order for the duration of the
    /// check-and-swap, so two movers can never claim the same slot. Blocking
    /// occupants cannot enter walls; decorations fly over them. `on_commit`
    /// runs while both cells are still locked.
    pub fn transfer<F>(
        &self,
        layer: Layer,
        occupant: EntityId,
        from: CellCoord,
        to: CellCoord,
        on_commit: F,
    ) -> Transfer
    where
        F: FnOnce(),
    {
        let source_index = self.index(from);
        let target_index = self.index(to);
        if source_index == target_index {
            return Transfer::Moved;
        }

        let (mut source, mut target) = if source_index < target_index {
            let source = self.cells[source_index].lock();
            let target = self.cells[target_index].lock();
            (source, target)
        } else {
            let target = self.cells[target_index].lock();
            let source = self.cells[source_index].lock();
            (source, target)
        };

        if source.slot(layer) != Some(occupant) {
            return Transfer::Stale;
        }
        if layer == Layer::Blocking && target.tile == Tile::Wall {
            return Transfer::Walled;
        }
        if let Some(other) = target.slot(layer) {
            return Transfer::Occupied(other);
        }

        *source.slot_mut(layer) = None;
        *target.slot_mut(layer) = Some(occupant);
        on_commit();
        Transfer::Moved
    }

    fn lock(&self, cell: CellCoord) -> MutexGuard<'_, Cell> {
        self.cells[self.index(cell)].lock()
    }

    fn index(&self, cell: CellCoord) -> usize {
        assert!(
            self.contains(cell),
            "cell {cell} lies outside the {}x{} grid",
            self.columns,
            self.rows
        );
        cell.row() as usize * self.columns as usize + cell.column() as usize
    }
}
