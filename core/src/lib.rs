#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Delve engine.
//!
//! This crate defines the vocabulary that connects the search engine, the
//! authoritative world, the agent controllers and the adapters: grid
//! coordinates, movement directions, entity identifiers, search operations and
//! the narrow [`Presentation`] surface through which the simulation reaches
//! rendering and audio collaborators it does not implement.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Delve.";

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }

    /// Computes the Chebyshev (king-move) distance between two cells.
    #[must_use]
    pub fn chebyshev_distance(self, other: CellCoord) -> u32 {
        self.column()
            .abs_diff(other.column())
            .max(self.row().abs_diff(other.row()))
    }

    /// Cell reached by moving one step in `direction`, if it stays inside a
    /// `columns` x `rows` grid.
    #[must_use]
    pub fn step(self, direction: Direction, columns: u32, rows: u32) -> Option<CellCoord> {
        let (column, row) = match direction {
            Direction::North => (Some(self.column), self.row.checked_sub(1)),
            Direction::South => (Some(self.column), self.row.checked_add(1)),
            Direction::West => (self.column.checked_sub(1), Some(self.row)),
            Direction::East => (self.column.checked_add(1), Some(self.row)),
        };
        let (column, row) = (column?, row?);
        (column < columns && row < rows).then(|| CellCoord::new(column, row))
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.column, self.row)
    }
}

/// Cardinal movement directions available to every agent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing row indices ("up").
    North,
    /// Movement toward increasing column indices ("right").
    East,
    /// Movement toward increasing row indices ("down").
    South,
    /// Movement toward decreasing column indices ("left").
    West,
}

impl Direction {
    /// Expansion order used by every search: up, down, left, right.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::West,
        Direction::East,
    ];

    /// Direction of a single orthogonal step from `from` to `to`.
    ///
    /// Returns `None` when the cells are not orthogonal neighbours.
    #[must_use]
    pub fn between(from: CellCoord, to: CellCoord) -> Option<Direction> {
        let column_diff = from.column().abs_diff(to.column());
        let row_diff = from.row().abs_diff(to.row());

        if column_diff + row_diff != 1 {
            return None;
        }

        if column_diff == 1 {
            if to.column() > from.column() {
                Some(Direction::East)
            } else {
                Some(Direction::West)
            }
        } else if to.row() > from.row() {
            Some(Direction::South)
        } else {
            Some(Direction::North)
        }
    }

    /// Direction pointing the opposite way.
    #[must_use]
    pub const fn reversed(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
        }
    }
}

/// Horizontal orientation of a sprite-bearing entity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Facing {
    /// Sprite faces toward decreasing columns.
    Left,
    /// Sprite faces toward increasing columns.
    #[default]
    Right,
}

impl Facing {
    /// Facing flipped to the other side.
    #[must_use]
    pub const fn flipped(self) -> Facing {
        match self {
            Facing::Left => Facing::Right,
            Facing::Right => Facing::Left,
        }
    }

    /// Facing implied by a horizontal move; vertical moves keep `self`.
    #[must_use]
    pub const fn toward(self, direction: Direction) -> Facing {
        match direction {
            Direction::East => Facing::Right,
            Direction::West => Facing::Left,
            Direction::North | Direction::South => self,
        }
    }
}

/// Unique identifier assigned to an entity within one scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(u32);

impl EntityId {
    /// Creates a new entity identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Semantic kind of a goal an agent may pursue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GoalKind {
    /// Pick up an unused key lying on the floor.
    Key,
    /// Open a closed chest using a held key.
    Chest,
    /// Step through an active portal.
    Portal,
    /// Leave the scene through the open door.
    Exit,
    /// Reach the player's cell; used by enemy pursuit.
    Player,
}

/// Operation recorded on a search node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Marker carried by the node a search starts from.
    Start,
    /// Single orthogonal move that produced the node.
    Move(Direction),
    /// Marker carried by a destination node describing what is waiting there.
    Arrive(GoalKind),
}

impl Operation {
    /// Direction of the move, when the operation is a move.
    #[must_use]
    pub const fn direction(self) -> Option<Direction> {
        match self {
            Operation::Move(direction) => Some(direction),
            Operation::Start | Operation::Arrive(_) => None,
        }
    }
}

/// Distance estimate used by A* to rank frontier nodes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Heuristic {
    /// Sum of absolute axis differences.
    #[default]
    Manhattan,
    /// Octile distance that prices diagonal travel at `sqrt(2)`.
    Diagonal,
    /// Straight-line distance.
    Euclidean,
}

impl Heuristic {
    /// Estimated remaining cost between two cells.
    #[must_use]
    pub fn estimate(self, from: CellCoord, to: CellCoord) -> f64 {
        let dx = f64::from(from.column().abs_diff(to.column()));
        let dy = f64::from(from.row().abs_diff(to.row()));
        match self {
            Heuristic::Manhattan => dx + dy,
            Heuristic::Diagonal => (dx + dy) + (std::f64::consts::SQRT_2 - 2.0) * dx.min(dy),
            Heuristic::Euclidean => dx.hypot(dy),
        }
    }
}

/// Search strategy an agent controller plans with.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchAlgorithm {
    /// FIFO frontier; re-targets across every queued destination in one pass.
    #[default]
    BreadthFirst,
    /// LIFO frontier against a single destination.
    DepthFirst,
    /// Heuristic search with danger-weighted step costs.
    AStar,
}

/// Sounds the simulation asks the audio collaborator to play.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SoundKind {
    /// A key was picked up.
    KeyPickup,
    /// A chest started opening.
    ChestOpen,
    /// A gem reached the player.
    GemCollected,
    /// The player travelled through a portal.
    Teleport,
    /// An enemy struck the player.
    Attack,
    /// The player ran out of health.
    Death,
    /// The player left through the open door.
    Victory,
}

/// Narrow surface through which the simulation reaches rendering and audio.
///
/// Implementations are called from many entity and controller threads at
/// once and must therefore be `Send + Sync`.
pub trait Presentation: Send + Sync {
    /// Asks the renderer to repaint the scene at its next opportunity.
    fn request_redraw(&self);

    /// Asks the audio collaborator to play a sound effect.
    fn play_sound(&self, sound: SoundKind);
}

#[cfg(test)]
mod tests {
    use super::{CellCoord, Direction, EntityId, Facing, Heuristic};
    use serde::{de::DeserializeOwned, Serialize};

    #[test]
    fn manhattan_distance_matches_expectation() {
        let origin = CellCoord::new(1, 1);
        let destination = CellCoord::new(4, 3);
        assert_eq!(origin.manhattan_distance(destination), 5);
        assert_eq!(destination.manhattan_distance(origin), 5);
        assert_eq!(origin.chebyshev_distance(destination), 3);
    }

    #[test]
    fn step_stays_inside_grid() {
        let corner = CellCoord::new(0, 0);
        assert_eq!(corner.step(Direction::North, 3, 3), None);
        assert_eq!(corner.step(Direction::West, 3, 3), None);
        assert_eq!(
            corner.step(Direction::South, 3, 3),
            Some(CellCoord::new(0, 1))
        );
        assert_eq!(
            CellCoord::new(2, 2).step(Direction::East, 3, 3),
            None,
            "stepping past the last column must fail",
        );
    }

    #[test]
    fn between_recognises_orthogonal_neighbours_only() {
        let from = CellCoord::new(2, 2);
        assert_eq!(
            Direction::between(from, CellCoord::new(2, 1)),
            Some(Direction::North)
        );
        assert_eq!(
            Direction::between(from, CellCoord::new(1, 2)),
            Some(Direction::West)
        );
        assert_eq!(Direction::between(from, CellCoord::new(3, 3)), None);
        assert_eq!(Direction::between(from, from), None);
    }

    #[test]
    fn heuristics_agree_on_straight_lines() {
        let from = CellCoord::new(0, 0);
        let to = CellCoord::new(0, 4);
        for heuristic in [
            Heuristic::Manhattan,
            Heuristic::Diagonal,
            Heuristic::Euclidean,
        ] {
            assert!((heuristic.estimate(from, to) - 4.0).abs() < 1e-9);
        }
    }

    #[test]
    fn heuristics_never_exceed_manhattan() {
        let from = CellCoord::new(1, 2);
        let to = CellCoord::new(6, 5);
        let manhattan = Heuristic::Manhattan.estimate(from, to);
        assert!(Heuristic::Diagonal.estimate(from, to) <= manhattan);
        assert!(Heuristic::Euclidean.estimate(from, to) <= manhattan);
    }

    #[test]
    fn facing_follows_horizontal_moves() {
        assert_eq!(Facing::Right.toward(Direction::West), Facing::Left);
        assert_eq!(Facing::Left.toward(Direction::North), Facing::Left);
        assert_eq!(Facing::Left.flipped(), Facing::Right);
    }

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn scene_identifiers_round_trip_through_bincode() {
        assert_round_trip(&EntityId::new(42));
        assert_round_trip(&CellCoord::new(5, 7));
    }
}
