#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative scene state for Delve.
//!
//! A [`World`] is shared through `Arc` between every entity loop and every
//! agent controller of one scene. Locking follows two rules: each grid cell
//! and each entity has its own mutex, and a thread holding an entity lock
//! never goes on to lock a cell. Cell locks may be held while an entity lock
//! is taken, and several entity locks are always taken in ascending id order.

mod entity;
mod generation;
mod grid;
mod interactions;
mod liveness;
mod presentation;
mod rules;
mod scene;

use std::{fmt, sync::Arc};

use delve_core::{CellCoord, Direction, EntityId, Presentation, SoundKind, WELCOME_BANNER};
use delve_system_search::{Passage, SearchGrid};
use parking_lot::{Mutex, RwLock};
use tracing::{debug, info, trace};

pub use entity::{
    ChestData, ChestState, EnemyState, Entity, EntityClass, EntityKind, GemData, KeyState,
    PlayerState, PortalData, PortalState,
};
pub use generation::{generate, SceneTuning};
pub use grid::{Cell, Grid, Layer, Tile, Transfer};
pub use interactions::GemProgress;
pub use liveness::Liveness;
pub use presentation::{Headless, RecordingPresentation};
pub use rules::Rules;
pub use scene::{SceneError, SceneLayout};

/// How a finished scene ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// The player left through the open door.
    Won,
    /// The player ran out of health.
    Lost,
}

/// Result of asking an entity to take one step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// The entity now stands on the given cell.
    Moved(CellCoord),
    /// The entity struck the given entity instead of moving.
    Attacked(EntityId),
    /// The move was refused; the entity did not change cells.
    Blocked,
    /// The entity is unknown or no longer in play.
    Inactive,
}

#[derive(Debug)]
struct Slot {
    class: EntityClass,
    entity: Mutex<Entity>,
}

/// Represents the authoritative state of one scene.
pub struct World {
    banner: &'static str,
    grid: Grid,
    registry: RwLock<Vec<Arc<Slot>>>,
    player: EntityId,
    exit: Option<CellCoord>,
    rules: Rules,
    presentation: Arc<dyn Presentation>,
    liveness: Liveness,
    outcome: Mutex<Option<Outcome>>,
}

impl fmt::Debug for World {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("World")
            .field("dimensions", &self.grid.dimensions())
            .field("player", &self.player)
            .field("exit", &self.exit)
            .field("outcome", &*self.outcome.lock())
            .finish_non_exhaustive()
    }
}

impl World {
    fn empty(
        columns: u32,
        rows: u32,
        player: EntityId,
        exit: Option<CellCoord>,
        rules: Rules,
        presentation: Arc<dyn Presentation>,
    ) -> Self {
        Self {
            banner: WELCOME_BANNER,
            grid: Grid::new(columns, rows),
            registry: RwLock::new(Vec::new()),
            player,
            exit,
            rules,
            presentation,
            liveness: Liveness::new(),
            outcome: Mutex::new(None),
        }
    }

    /// Occupancy grid shared by every loop.
    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Rules the scene was built with.
    #[must_use]
    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    /// Handle of the scene's player.
    #[must_use]
    pub const fn player(&self) -> EntityId {
        self.player
    }

    /// Cell of the exit door, if the scene has one.
    #[must_use]
    pub const fn exit(&self) -> Option<CellCoord> {
        self.exit
    }

    /// Run flag shared by every loop of the scene.
    #[must_use]
    pub fn liveness(&self) -> &Liveness {
        &self.liveness
    }

    /// How the scene ended, once it has.
    #[must_use]
    pub fn outcome(&self) -> Option<Outcome> {
        *self.outcome.lock()
    }

    /// Reports whether loops should keep running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.liveness.is_active()
    }

    /// Identifiers of every entity ever registered, in creation order.
    #[must_use]
    pub fn entity_ids(&self) -> Vec<EntityId> {
        self.registry
            .read()
            .iter()
            .map(|slot| slot.entity.lock().id)
            .collect()
    }

    /// Class of the entity, if it exists.
    #[must_use]
    pub fn class_of(&self, id: EntityId) -> Option<EntityClass> {
        self.slot(id).map(|slot| slot.class)
    }

    /// Runs `inspect` against the entity under its monitor.
    pub fn inspect<R, F>(&self, id: EntityId, inspect: F) -> Option<R>
    where
        F: FnOnce(&Entity) -> R,
    {
        let slot = self.slot(id)?;
        let entity = slot.entity.lock();
        Some(inspect(&entity))
    }

    /// Runs `update` against the entity under its monitor.
    pub fn update<R, F>(&self, id: EntityId, update: F) -> Option<R>
    where
        F: FnOnce(&mut Entity) -> R,
    {
        let slot = self.slot(id)?;
        let mut entity = slot.entity.lock();
        Some(update(&mut entity))
    }

    /// Current cell of the entity.
    #[must_use]
    pub fn position(&self, id: EntityId) -> Option<CellCoord> {
        self.inspect(id, |entity| entity.cell)
    }

    /// Reports whether the entity exists, is in play and the scene runs.
    #[must_use]
    pub fn is_active(&self, id: EntityId) -> bool {
        self.is_running() && self.inspect(id, |entity| entity.active).unwrap_or(false)
    }

    /// Reports whether the player holds enough gems for the door to open.
    #[must_use]
    pub fn door_open(&self) -> bool {
        self.exit.is_some()
            && self
                .inspect(self.player, |entity| {
                    entity
                        .as_player()
                        .is_some_and(|player| player.gems >= self.rules.win_gems)
                })
                .unwrap_or(false)
    }

    /// Forwards a repaint request to the renderer.
    pub fn request_redraw(&self) {
        self.presentation.request_redraw();
    }

    /// Forwards a sound request to the audio collaborator.
    pub fn play_sound(&self, sound: SoundKind) {
        self.presentation.play_sound(sound);
    }

    /// Moves the entity one cell in `direction`, or resolves the collision
    /// with whatever blocks the way.
    pub fn step(&self, id: EntityId, direction: Direction) -> StepOutcome {
        let Some(from) = self
            .inspect(id, |entity| entity.active.then_some(entity.cell))
            .flatten()
        else {
            return StepOutcome::Inactive;
        };
        let (columns, rows) = self.grid.dimensions();
        let Some(to) = from.step(direction, columns, rows) else {
            return StepOutcome::Blocked;
        };

        match self.relocate(id, to, Some(direction)) {
            Transfer::Moved => {
                trace!(entity = %id, %from, %to, "entity moved");
                self.request_redraw();
                StepOutcome::Moved(to)
            }
            Transfer::Occupied(occupant) => self.on_collide(id, occupant, direction),
            Transfer::Walled | Transfer::Stale => StepOutcome::Blocked,
        }
    }

    /// Moves the entity to `to` within its own grid layer, updating its
    /// position while both cells are locked.
    pub fn relocate(&self, id: EntityId, to: CellCoord, heading: Option<Direction>) -> Transfer {
        let Some(slot) = self.slot(id) else {
            return Transfer::Stale;
        };
        let from = slot.entity.lock().cell;
        self.grid.transfer(slot.class.layer(), id, from, to, || {
            let mut entity = slot.entity.lock();
            entity.cell = to;
            if let Some(direction) = heading {
                entity.facing = entity.facing.toward(direction);
            }
        })
    }

    /// Records the direction an enemy should try on its next move.
    pub fn set_intent(&self, id: EntityId, direction: Option<Direction>) {
        let _ = self.update(id, |entity| {
            if let EntityKind::Enemy(enemy) = &mut entity.kind {
                enemy.intent = direction;
            }
        });
    }

    /// Takes the pending intent of an enemy.
    #[must_use]
    pub fn take_intent(&self, id: EntityId) -> Option<Direction> {
        self.update(id, |entity| match &mut entity.kind {
            EntityKind::Enemy(enemy) => enemy.intent.take(),
            _ => None,
        })
        .flatten()
    }

    /// Removes `amount` health from the player; ends the scene at zero.
    pub fn hurt(&self, id: EntityId, amount: i32) {
        let died = self
            .update(id, |entity| {
                let alive = entity.active;
                let Some(player) = entity.as_player_mut() else {
                    return false;
                };
                player.health = player.health.saturating_sub(amount);
                if alive && player.health <= 0 {
                    entity.active = false;
                    return true;
                }
                false
            })
            .unwrap_or(false);

        if died {
            info!(entity = %id, "player died");
            self.play_sound(SoundKind::Death);
            self.finish(Outcome::Lost);
        }
    }

    /// Records the outcome and stops every loop. Only the first outcome sticks.
    pub fn finish(&self, outcome: Outcome) {
        {
            let mut slot = self.outcome.lock();
            if slot.is_some() {
                return;
            }
            *slot = Some(outcome);
        }
        info!(?outcome, "scene finished");
        self.halt();
    }

    /// Stops every loop without recording an outcome.
    pub fn halt(&self) {
        if self.liveness.is_active() {
            debug!("halting scene loops");
        }
        self.liveness.deactivate();
    }

    /// Captures the passability field `agent` plans against.
    ///
    /// Walls and every blocking occupant other than the agent are blocked;
    /// hostile occupants additionally raise danger for the player. Occupied
    /// floor cells listed in `terminals` become enterable goals. Cells are
    /// read one lock at a time, so the field may mix moments; a plan made
    /// from a stale field fails its move and is redone on the next tick.
    #[must_use]
    pub fn search_grid(&self, agent: EntityId, terminals: &[CellCoord]) -> SearchGrid {
        let (columns, rows) = self.grid.dimensions();
        let fears_hostiles = self.class_of(agent) == Some(EntityClass::Player);
        let mut grid = SearchGrid::new(columns, rows);

        for row in 0..rows {
            for column in 0..columns {
                let coord = CellCoord::new(column, row);
                let cell = self.grid.cell(coord);
                if cell.tile == Tile::Wall {
                    grid.block(coord);
                    continue;
                }
                let Some(occupant) = cell.blocking.filter(|occupant| *occupant != agent) else {
                    continue;
                };
                grid.block(coord);
                if fears_hostiles && self.class_of(occupant).is_some_and(EntityClass::is_hostile) {
                    grid.mark_hostile(coord);
                }
            }
        }

        for &terminal in terminals {
            if grid.contains(terminal)
                && grid.passage(terminal) == Passage::Blocked
                && self.grid.tile(terminal) == Tile::Floor
            {
                grid.set_passage(terminal, Passage::Terminal);
            }
        }
        grid
    }

    fn slot(&self, id: EntityId) -> Option<Arc<Slot>> {
        let index = usize::try_from(id.get()).ok()?;
        self.registry.read().get(index).cloned()
    }

    fn register(&self, cell: CellCoord, kind: EntityKind) -> EntityId {
        let mut registry = self.registry.write();
        let id = EntityId::new(u32::try_from(registry.len()).unwrap_or(u32::MAX));
        let class = kind.class();
        registry.push(Arc::new(Slot {
            class,
            entity: Mutex::new(Entity::new(id, cell, kind)),
        }));
        id
    }

    /// Locks two distinct entities in ascending id order and runs `update`
    /// with them in argument order.
    fn update_pair<R, F>(&self, first: EntityId, second: EntityId, update: F) -> Option<R>
    where
        F: FnOnce(&mut Entity, &mut Entity) -> R,
    {
        if first == second {
            return None;
        }
        let first_slot = self.slot(first)?;
        let second_slot = self.slot(second)?;
        let (mut first_guard, mut second_guard) = if first < second {
            let first_guard = first_slot.entity.lock();
            let second_guard = second_slot.entity.lock();
            (first_guard, second_guard)
        } else {
            let second_guard = second_slot.entity.lock();
            let first_guard = first_slot.entity.lock();
            (first_guard, second_guard)
        };
        Some(update(&mut first_guard, &mut second_guard))
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use delve_core::{CellCoord, EntityId, Facing};

    use super::{EntityClass, EntityKind, World};

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Captures a read-only view of every entity in creation order.
    #[must_use]
    pub fn entity_view(world: &World) -> EntityView {
        let snapshots = world
            .entity_ids()
            .into_iter()
            .filter_map(|id| {
                world.inspect(id, |entity| EntitySnapshot {
                    id: entity.id,
                    class: entity.class(),
                    cell: entity.cell,
                    active: entity.active,
                    frame: entity.frame,
                    facing: entity.facing,
                    kind: entity.kind.clone(),
                })
            })
            .collect();
        EntityView { snapshots }
    }

    /// Summarises the player's progress.
    #[must_use]
    pub fn player_status(world: &World) -> Option<PlayerStatus> {
        world
            .inspect(world.player(), |entity| {
                entity.as_player().map(|player| PlayerStatus {
                    cell: entity.cell,
                    health: player.health,
                    keys: player.keys.len(),
                    gems: player.gems,
                    alive: entity.active,
                })
            })
            .flatten()
    }

    /// Read-only snapshot describing every entity of the scene.
    #[derive(Clone, Debug)]
    pub struct EntityView {
        snapshots: Vec<EntitySnapshot>,
    }

    impl EntityView {
        /// Iterator over the captured snapshots in creation order.
        pub fn iter(&self) -> impl Iterator<Item = &EntitySnapshot> {
            self.snapshots.iter()
        }

        /// Snapshots of the entities of one class.
        pub fn of_class(&self, class: EntityClass) -> impl Iterator<Item = &EntitySnapshot> {
            self.snapshots
                .iter()
                .filter(move |snapshot| snapshot.class == class)
        }

        /// Consumes the view, yielding the underlying snapshots.
        #[must_use]
        pub fn into_vec(self) -> Vec<EntitySnapshot> {
            self.snapshots
        }
    }

    /// Immutable copy of a single entity's state.
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub struct EntitySnapshot {
        /// Identifier of the entity.
        pub id: EntityId,
        /// Class of the entity.
        pub class: EntityClass,
        /// Cell the entity stands on.
        pub cell: CellCoord,
        /// Whether the entity is still in play.
        pub active: bool,
        /// Animation frame counter.
        pub frame: u32,
        /// Sprite orientation.
        pub facing: Facing,
        /// Kind-specific state.
        pub kind: EntityKind,
    }

    /// Player progress summary.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct PlayerStatus {
        /// Cell the player stands on.
        pub cell: CellCoord,
        /// Remaining health.
        pub health: i32,
        /// Keys carried.
        pub keys: usize,
        /// Gems collected.
        pub gems: u32,
        /// Whether the player is still alive.
        pub alive: bool,
    }
}
