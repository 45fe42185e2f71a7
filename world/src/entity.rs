//! Entity records: one struct for every kind, with kind-specific data in a
//! tagged union.

use delve_core::{CellCoord, Direction, EntityId, Facing};

use crate::grid::Layer;

/// Discriminant of [`EntityKind`], cheap to copy and compare.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityClass {
    /// The adventurer steered by the autopilot.
    Player,
    /// Hostile pursuer.
    Enemy,
    /// Key lying on the floor.
    Key,
    /// Chest that yields gems when opened with a key.
    Chest,
    /// One end of a linked portal pair.
    Portal,
    /// Gem travelling from an opened chest to the player.
    Gem,
}

impl EntityClass {
    /// Grid slot the entity occupies.
    #[must_use]
    pub const fn layer(self) -> Layer {
        match self {
            EntityClass::Player | EntityClass::Enemy | EntityClass::Chest => Layer::Blocking,
            EntityClass::Key | EntityClass::Portal => Layer::Bottom,
            EntityClass::Gem => Layer::Top,
        }
    }

    /// Reports whether entities of this class attack the player on contact.
    #[must_use]
    pub const fn is_hostile(self) -> bool {
        matches!(self, EntityClass::Enemy)
    }
}

/// Player-specific state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlayerState {
    /// Remaining health; the game is lost when it reaches zero.
    pub health: i32,
    /// Keys picked up and not yet spent, oldest first.
    pub keys: Vec<EntityId>,
    /// Gems collected so far.
    pub gems: u32,
}

/// Enemy-specific state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EnemyState {
    /// Direction chosen by the pursuit controller, consumed by the next move.
    pub intent: Option<Direction>,
}

/// Lifecycle of a key.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum KeyState {
    /// Lying on the floor.
    #[default]
    Unused,
    /// Carried by the player.
    Held,
    /// Spent on a chest.
    Used,
}

/// Lifecycle of a chest lid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ChestState {
    /// Waiting for a key.
    #[default]
    Closed,
    /// Lid animation in progress.
    Opening,
    /// Emptied.
    Opened,
}

/// Chest-specific state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChestData {
    /// Lid lifecycle.
    pub state: ChestState,
    /// Gems released when the lid finishes opening.
    pub gems: u32,
}

/// Whether a portal currently accepts travellers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PortalState {
    /// Travellers are teleported to the partner portal.
    #[default]
    Active,
    /// Cooling down after a teleport.
    Inactive,
}

/// Portal-specific state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PortalData {
    /// Current availability.
    pub state: PortalState,
    /// Portal at the other end of the link.
    pub partner: Option<EntityId>,
    /// Animation frames left before an inactive portal reactivates.
    pub cooldown: u32,
}

/// Gem-specific state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GemData {
    /// Entity the gem flies toward.
    pub recipient: EntityId,
    /// Gems credited on delivery.
    pub value: u32,
}

/// Kind-specific entity data.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EntityKind {
    /// See [`PlayerState`].
    Player(PlayerState),
    /// See [`EnemyState`].
    Enemy(EnemyState),
    /// See [`KeyState`].
    Key(KeyState),
    /// See [`ChestData`].
    Chest(ChestData),
    /// See [`PortalData`].
    Portal(PortalData),
    /// See [`GemData`].
    Gem(GemData),
}

impl EntityKind {
    /// Discriminant of the kind.
    #[must_use]
    pub const fn class(&self) -> EntityClass {
        match self {
            EntityKind::Player(_) => EntityClass::Player,
            EntityKind::Enemy(_) => EntityClass::Enemy,
            EntityKind::Key(_) => EntityClass::Key,
            EntityKind::Chest(_) => EntityClass::Chest,
            EntityKind::Portal(_) => EntityClass::Portal,
            EntityKind::Gem(_) => EntityClass::Gem,
        }
    }
}

/// A scene object with a position and its own run loop.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entity {
    /// Identifier unique within the scene.
    pub id: EntityId,
    /// Cell the entity stands on.
    pub cell: CellCoord,
    /// Cleared when the entity leaves play; its loops stop on the next check.
    pub active: bool,
    /// Animation frame counter advanced by the entity's own loop.
    pub frame: u32,
    /// Horizontal orientation of the sprite.
    pub facing: Facing,
    /// Kind-specific state.
    pub kind: EntityKind,
}

impl Entity {
    /// Creates an active entity on `cell`.
    #[must_use]
    pub fn new(id: EntityId, cell: CellCoord, kind: EntityKind) -> Self {
        Self {
            id,
            cell,
            active: true,
            frame: 0,
            facing: Facing::default(),
            kind,
        }
    }

    /// Discriminant of the entity's kind.
    #[must_use]
    pub const fn class(&self) -> EntityClass {
        self.kind.class()
    }

    /// Player state, when the entity is the player.
    #[must_use]
    pub fn as_player(&self) -> Option<&PlayerState> {
        match &self.kind {
            EntityKind::Player(state) => Some(state),
            _ => None,
        }
    }

    /// Mutable player state, when the entity is the player.
    pub fn as_player_mut(&mut self) -> Option<&mut PlayerState> {
        match &mut self.kind {
            EntityKind::Player(state) => Some(state),
            _ => None,
        }
    }

    /// Advances the animation frame counter.
    pub fn advance_frame(&mut self) {
        self.frame = self.frame.wrapping_add(1);
    }
}
