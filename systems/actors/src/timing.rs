//! Loop intervals for every entity kind and controller.

use std::time::Duration;

use delve_world::EntityClass;
use serde::Deserialize;

/// Sleep between loop iterations, in milliseconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Timing {
    /// Hunger interval of the player.
    pub player_ms: u64,
    /// Interval at which enemies execute their intent.
    pub enemy_ms: u64,
    /// Sparkle interval of unused keys.
    pub key_ms: u64,
    /// Lid animation interval of chests.
    pub chest_ms: u64,
    /// Animation and cooldown interval of portals.
    pub portal_ms: u64,
    /// Travel interval of gems.
    pub gem_ms: u64,
    /// Planning interval of the player autopilot.
    pub autopilot_ms: u64,
    /// Planning interval of enemy pursuit.
    pub pursuit_ms: u64,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            player_ms: 1_500,
            enemy_ms: 400,
            key_ms: 250,
            chest_ms: 150,
            portal_ms: 100,
            gem_ms: 60,
            autopilot_ms: 200,
            pursuit_ms: 450,
        }
    }
}

impl Timing {
    /// Interval of the loop driving an entity of `class`.
    #[must_use]
    pub fn entity(&self, class: EntityClass) -> Duration {
        let millis = match class {
            EntityClass::Player => self.player_ms,
            EntityClass::Enemy => self.enemy_ms,
            EntityClass::Key => self.key_ms,
            EntityClass::Chest => self.chest_ms,
            EntityClass::Portal => self.portal_ms,
            EntityClass::Gem => self.gem_ms,
        };
        Duration::from_millis(millis)
    }

    /// Interval of the player autopilot.
    #[must_use]
    pub fn autopilot(&self) -> Duration {
        Duration::from_millis(self.autopilot_ms)
    }

    /// Interval of enemy pursuit controllers.
    #[must_use]
    pub fn pursuit(&self) -> Duration {
        Duration::from_millis(self.pursuit_ms)
    }

    /// Same intervals for every loop; handy for fast, deterministic runs.
    #[must_use]
    pub const fn uniform(millis: u64) -> Self {
        Self {
            player_ms: millis,
            enemy_ms: millis,
            key_ms: millis,
            chest_ms: millis,
            portal_ms: millis,
            gem_ms: millis,
            autopilot_ms: millis,
            pursuit_ms: millis,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enemies_move_faster_than_hunger_bites() {
        let timing = Timing::default();
        assert!(timing.entity(EntityClass::Enemy) < timing.entity(EntityClass::Player));
        assert!(timing.entity(EntityClass::Portal) < timing.entity(EntityClass::Enemy));
    }

    #[test]
    fn uniform_applies_everywhere() {
        let timing = Timing::uniform(3);
        assert_eq!(timing.entity(EntityClass::Gem), Duration::from_millis(3));
        assert_eq!(timing.autopilot(), Duration::from_millis(3));
        assert_eq!(timing.pursuit(), Duration::from_millis(3));
    }
}
