//! Tunable game rules.

use serde::Deserialize;

/// Numbers that decide how a scene plays out.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Rules {
    /// Gems needed to open the exit door; chests stay shut for a player who
    /// already holds this many.
    pub win_gems: u32,
    /// Health the player starts with.
    pub player_health: i32,
    /// Health an enemy strike removes.
    pub enemy_damage: i32,
    /// Health lost on every hunger tick of the player loop.
    pub hunger_damage: i32,
    /// Animation frames a chest lid needs before releasing its gems.
    pub chest_open_frames: u32,
    /// Animation frames a portal stays inactive after a teleport.
    pub portal_cooldown_frames: u32,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            win_gems: 2,
            player_health: 100,
            enemy_damage: 10,
            hunger_damage: 1,
            chest_open_frames: 4,
            portal_cooldown_frames: 12,
        }
    }
}
