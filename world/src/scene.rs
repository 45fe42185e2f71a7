//! Scene layouts and their conversion into a running [`World`].

use std::{collections::HashSet, sync::Arc};

use delve_core::{CellCoord, EntityId, Presentation};
use delve_system_search::{reachable, Passage, SearchGrid};
use thiserror::Error;
use tracing::debug;

use crate::{
    entity::{
        ChestData, ChestState, EnemyState, EntityKind, KeyState, PlayerState, PortalData,
        PortalState,
    },
    grid::{Layer, Tile},
    rules::Rules,
    World,
};

/// Errors raised while building or generating a scene.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SceneError {
    /// The scene has no cells at all.
    #[error("scene must be at least one cell wide and tall (received {columns}x{rows})")]
    Empty {
        /// Requested column count.
        columns: u32,
        /// Requested row count.
        rows: u32,
    },
    /// A placement lies outside the scene.
    #[error("{what} at {cell} lies outside the {columns}x{rows} scene")]
    OutOfBounds {
        /// Description of the placed object.
        what: &'static str,
        /// Offending cell.
        cell: CellCoord,
        /// Scene width.
        columns: u32,
        /// Scene height.
        rows: u32,
    },
    /// A placement sits on a wall.
    #[error("{what} at {cell} sits on a wall")]
    OnWall {
        /// Description of the placed object.
        what: &'static str,
        /// Offending cell.
        cell: CellCoord,
    },
    /// Two placements compete for the same slot.
    #[error("{what} at {cell} overlaps another placement")]
    Overlap {
        /// Description of the placed object.
        what: &'static str,
        /// Offending cell.
        cell: CellCoord,
    },
    /// The generator gave up without finding a playable layout.
    #[error("no playable scene found after {attempts} attempts")]
    Exhausted {
        /// Layouts tried and rejected.
        attempts: u32,
    },
}

/// Declarative description of a scene before any entity exists.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SceneLayout {
    columns: u32,
    rows: u32,
    player: CellCoord,
    walls: Vec<CellCoord>,
    enemies: Vec<CellCoord>,
    keys: Vec<CellCoord>,
    chests: Vec<(CellCoord, u32)>,
    portals: Vec<(CellCoord, CellCoord)>,
    exit: Option<CellCoord>,
}

impl SceneLayout {
    /// Starts an empty floor layout with the player on `player`.
    #[must_use]
    pub fn new(columns: u32, rows: u32, player: CellCoord) -> Self {
        Self {
            columns,
            rows,
            player,
            walls: Vec::new(),
            enemies: Vec::new(),
            keys: Vec::new(),
            chests: Vec::new(),
            portals: Vec::new(),
            exit: None,
        }
    }

    /// Adds a wall tile.
    #[must_use]
    pub fn with_wall(mut self, cell: CellCoord) -> Self {
        self.walls.push(cell);
        self
    }

    /// Adds a wall tile on every cell yielded by `cells`.
    #[must_use]
    pub fn with_walls<I>(mut self, cells: I) -> Self
    where
        I: IntoIterator<Item = CellCoord>,
    {
        self.walls.extend(cells);
        self
    }

    /// Adds an enemy.
    #[must_use]
    pub fn with_enemy(mut self, cell: CellCoord) -> Self {
        self.enemies.push(cell);
        self
    }

    /// Adds an unused key.
    #[must_use]
    pub fn with_key(mut self, cell: CellCoord) -> Self {
        self.keys.push(cell);
        self
    }

    /// Adds a closed chest holding `gems`.
    #[must_use]
    pub fn with_chest(mut self, cell: CellCoord, gems: u32) -> Self {
        self.chests.push((cell, gems));
        self
    }

    /// Adds two portals linked to each other.
    #[must_use]
    pub fn with_portal_pair(mut self, first: CellCoord, second: CellCoord) -> Self {
        self.portals.push((first, second));
        self
    }

    /// Places the exit door.
    #[must_use]
    pub fn with_exit(mut self, cell: CellCoord) -> Self {
        self.exit = Some(cell);
        self
    }

    /// Number of columns and rows.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    /// Player start cell.
    #[must_use]
    pub const fn player(&self) -> CellCoord {
        self.player
    }

    /// Wall cells.
    #[must_use]
    pub fn walls(&self) -> &[CellCoord] {
        &self.walls
    }

    /// Enemy start cells.
    #[must_use]
    pub fn enemies(&self) -> &[CellCoord] {
        &self.enemies
    }

    /// Key cells.
    #[must_use]
    pub fn keys(&self) -> &[CellCoord] {
        &self.keys
    }

    /// Chest cells with their gem contents.
    #[must_use]
    pub fn chests(&self) -> &[(CellCoord, u32)] {
        &self.chests
    }

    /// Linked portal pairs.
    #[must_use]
    pub fn portals(&self) -> &[(CellCoord, CellCoord)] {
        &self.portals
    }

    /// Exit door cell.
    #[must_use]
    pub const fn exit(&self) -> Option<CellCoord> {
        self.exit
    }

    /// Checks every placement against the bounds, the walls and each other.
    pub fn validate(&self) -> Result<(), SceneError> {
        if self.columns == 0 || self.rows == 0 {
            return Err(SceneError::Empty {
                columns: self.columns,
                rows: self.rows,
            });
        }

        for &cell in &self.walls {
            self.check_bounds("wall", cell)?;
        }
        let walls: HashSet<CellCoord> = self.walls.iter().copied().collect();
        let mut blocking = HashSet::new();
        let mut bottom = HashSet::new();

        let blocking_placements = std::iter::once(("player", self.player))
            .chain(self.enemies.iter().map(|&cell| ("enemy", cell)))
            .chain(self.chests.iter().map(|&(cell, _)| ("chest", cell)));
        for (what, cell) in blocking_placements {
            self.check_floor(what, cell, &walls)?;
            if !blocking.insert(cell) {
                return Err(SceneError::Overlap { what, cell });
            }
        }

        let bottom_placements = self
            .keys
            .iter()
            .map(|&cell| ("key", cell))
            .chain(
                self.portals
                    .iter()
                    .flat_map(|&(first, second)| [("portal", first), ("portal", second)]),
            );
        for (what, cell) in bottom_placements {
            self.check_floor(what, cell, &walls)?;
            if !bottom.insert(cell) {
                return Err(SceneError::Overlap { what, cell });
            }
        }

        if let Some(exit) = self.exit {
            self.check_floor("exit", exit, &walls)?;
        }
        Ok(())
    }

    /// Feasibility oracle: reports whether the player can reach every key,
    /// portal and the exit, stand next to every chest, and whether every
    /// enemy can reach the player.
    ///
    /// Walls and chests obstruct; players and enemies are assumed to move
    /// out of the way eventually.
    #[must_use]
    pub fn is_playable(&self) -> bool {
        if self.validate().is_err() {
            return false;
        }
        let mut grid = self.static_grid();
        let start = self.player;

        let mut walkable = self
            .keys
            .iter()
            .copied()
            .chain(self.portals.iter().flat_map(|&(first, second)| [first, second]))
            .chain(self.exit);
        if !walkable.all(|target| reachable(&grid, start, target)) {
            return false;
        }

        for &(chest, _) in &self.chests {
            grid.set_passage(chest, Passage::Terminal);
            let open = reachable(&grid, start, chest);
            grid.block(chest);
            if !open {
                return false;
            }
        }

        self.enemies
            .iter()
            .all(|&enemy| reachable(&grid, enemy, start))
    }

    fn static_grid(&self) -> SearchGrid {
        let mut grid = SearchGrid::new(self.columns, self.rows);
        for &cell in self
            .walls
            .iter()
            .chain(self.chests.iter().map(|(cell, _)| cell))
        {
            grid.block(cell);
        }
        grid
    }

    fn check_bounds(&self, what: &'static str, cell: CellCoord) -> Result<(), SceneError> {
        if cell.column() < self.columns && cell.row() < self.rows {
            Ok(())
        } else {
            Err(SceneError::OutOfBounds {
                what,
                cell,
                columns: self.columns,
                rows: self.rows,
            })
        }
    }

    fn check_floor(
        &self,
        what: &'static str,
        cell: CellCoord,
        walls: &HashSet<CellCoord>,
    ) -> Result<(), SceneError> {
        self.check_bounds(what, cell)?;
        if walls.contains(&cell) {
            return Err(SceneError::OnWall { what, cell });
        }
        Ok(())
    }
}

impl World {
    /// Builds a world from a validated layout. The player always receives
    /// [`EntityId`] zero.
    pub fn from_layout(
        layout: &SceneLayout,
        rules: Rules,
        presentation: Arc<dyn Presentation>,
    ) -> Result<Self, SceneError> {
        layout.validate()?;
        let (columns, rows) = layout.dimensions();
        let health = rules.player_health;
        let world = World::empty(
            columns,
            rows,
            EntityId::new(0),
            layout.exit(),
            rules,
            presentation,
        );

        for &wall in layout.walls() {
            world.grid().set_tile(wall, Tile::Wall);
        }

        let player = world.place(
            layout.player(),
            EntityKind::Player(PlayerState {
                health,
                keys: Vec::new(),
                gems: 0,
            }),
        );
        debug_assert_eq!(player, world.player());

        for &cell in layout.enemies() {
            let _ = world.place(cell, EntityKind::Enemy(EnemyState::default()));
        }
        for &cell in layout.keys() {
            let _ = world.place(cell, EntityKind::Key(KeyState::Unused));
        }
        for &(cell, gems) in layout.chests() {
            let _ = world.place(
                cell,
                EntityKind::Chest(ChestData {
                    state: ChestState::Closed,
                    gems,
                }),
            );
        }
        for &(first, second) in layout.portals() {
            let first_id = world.place(first, portal(None));
            let second_id = world.place(second, portal(Some(first_id)));
            let _ = world.update(first_id, |entity| {
                if let EntityKind::Portal(data) = &mut entity.kind {
                    data.partner = Some(second_id);
                }
            });
        }

        debug!(
            columns,
            rows,
            entities = world.entity_ids().len(),
            "scene constructed"
        );
        Ok(world)
    }

    fn place(&self, cell: CellCoord, kind: EntityKind) -> EntityId {
        let layer: Layer = kind.class().layer();
        let id = self.register(cell, kind);
        self.grid().set_occupant_in(cell, layer, Some(id));
        id
    }
}

fn portal(partner: Option<EntityId>) -> EntityKind {
    EntityKind::Portal(PortalData {
        state: PortalState::Active,
        partner,
        cooldown: 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Headless;

    fn open_layout() -> SceneLayout {
        SceneLayout::new(6, 4, CellCoord::new(0, 0))
            .with_key(CellCoord::new(2, 0))
            .with_chest(CellCoord::new(4, 2), 2)
            .with_exit(CellCoord::new(5, 3))
    }

    #[test]
    fn validate_rejects_out_of_bounds_placements() {
        let layout = open_layout().with_enemy(CellCoord::new(6, 0));
        assert_eq!(
            layout.validate(),
            Err(SceneError::OutOfBounds {
                what: "enemy",
                cell: CellCoord::new(6, 0),
                columns: 6,
                rows: 4,
            })
        );
    }

    #[test]
    fn validate_rejects_overlaps_and_walls() {
        let overlapping = open_layout().with_enemy(CellCoord::new(4, 2));
        assert_eq!(
            overlapping.validate(),
            Err(SceneError::Overlap {
                what: "chest",
                cell: CellCoord::new(4, 2),
            })
        );

        let walled = open_layout().with_wall(CellCoord::new(2, 0));
        assert_eq!(
            walled.validate(),
            Err(SceneError::OnWall {
                what: "key",
                cell: CellCoord::new(2, 0),
            })
        );
    }

    #[test]
    fn key_may_share_a_cell_with_a_blocking_occupant() {
        let layout = open_layout().with_key(CellCoord::new(0, 0));
        assert_eq!(layout.validate(), Ok(()));
    }

    #[test]
    fn playable_layout_passes_the_oracle() {
        assert!(open_layout().is_playable());
    }

    #[test]
    fn sealed_exit_fails_the_oracle() {
        let layout = open_layout().with_walls([CellCoord::new(4, 3), CellCoord::new(5, 2)]);
        assert!(!layout.is_playable());
    }

    #[test]
    fn enclosed_enemy_fails_the_oracle() {
        let layout = SceneLayout::new(5, 3, CellCoord::new(0, 0))
            .with_walls([
                CellCoord::new(3, 0),
                CellCoord::new(3, 1),
                CellCoord::new(3, 2),
            ])
            .with_enemy(CellCoord::new(4, 1));
        assert!(!layout.is_playable());
    }

    #[test]
    fn chest_behind_other_chest_is_rejected() {
        let layout = SceneLayout::new(3, 1, CellCoord::new(0, 0))
            .with_chest(CellCoord::new(1, 0), 1)
            .with_chest(CellCoord::new(2, 0), 1);
        assert!(!layout.is_playable());
    }

    #[test]
    fn from_layout_registers_player_first_and_links_portals() {
        let layout = open_layout().with_portal_pair(CellCoord::new(1, 3), CellCoord::new(3, 0));
        let world = World::from_layout(&layout, Rules::default(), Arc::new(Headless))
            .expect("layout is valid");

        assert_eq!(world.player(), EntityId::new(0));
        assert_eq!(world.grid().occupant(CellCoord::new(0, 0)), Some(world.player()));
        assert!(world.grid().occupant_in(CellCoord::new(2, 0), Layer::Bottom).is_some());

        let first = world
            .grid()
            .occupant_in(CellCoord::new(1, 3), Layer::Bottom)
            .expect("portal placed");
        let second = world
            .grid()
            .occupant_in(CellCoord::new(3, 0), Layer::Bottom)
            .expect("portal placed");
        let partner_of = |id| {
            world
                .inspect(id, |entity| match &entity.kind {
                    EntityKind::Portal(data) => data.partner,
                    _ => None,
                })
                .flatten()
        };
        assert_eq!(partner_of(first), Some(second));
        assert_eq!(partner_of(second), Some(first));
    }
}
