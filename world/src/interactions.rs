//! Collision and arrival rules, plus the life cycle of gems in transit.

use delve_core::{CellCoord, Direction, EntityId, GoalKind, SoundKind};
use tracing::{debug, info, trace};

use crate::{
    entity::{ChestState, EntityClass, EntityKind, GemData, KeyState, PortalState},
    grid::{Layer, Transfer},
    Outcome, StepOutcome, World,
};

/// Progress reported by a gem after one tick of travel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GemProgress {
    /// The gem moved or waited and is still on its way.
    Travelling,
    /// The gem reached its recipient and was credited.
    Delivered,
    /// The gem or its recipient left play.
    Gone,
}

impl World {
    /// Resolves `actor` walking into the cell held by `occupant`.
    ///
    /// A hostile actor bumping into the player attacks it; everything else is
    /// simply refused.
    pub(crate) fn on_collide(
        &self,
        actor: EntityId,
        occupant: EntityId,
        direction: Direction,
    ) -> StepOutcome {
        let hostile = self.class_of(actor).is_some_and(EntityClass::is_hostile);
        if !hostile || self.class_of(occupant) != Some(EntityClass::Player) {
            return StepOutcome::Blocked;
        }

        debug!(attacker = %actor, target = %occupant, ?direction, "enemy attacks");
        let _ = self.update(actor, |entity| entity.facing = entity.facing.flipped());
        self.play_sound(SoundKind::Attack);
        self.hurt(occupant, self.rules().enemy_damage);
        self.request_redraw();
        StepOutcome::Attacked(occupant)
    }

    /// Runs the completion action of `kind` for `actor` against `target`.
    ///
    /// Returns whether the action committed; a refused action leaves every
    /// entity untouched.
    pub fn on_arrive(&self, actor: EntityId, kind: GoalKind, target: Option<EntityId>) -> bool {
        let committed = match (kind, target) {
            (GoalKind::Key, Some(key)) => self.pick_up_key(actor, key),
            (GoalKind::Chest, Some(chest)) => self.open_chest(actor, chest),
            (GoalKind::Portal, Some(portal)) => self.enter_portal(actor, portal),
            (GoalKind::Exit, _) => self.leave_through_exit(actor),
            _ => false,
        };
        if committed {
            self.request_redraw();
        }
        committed
    }

    fn pick_up_key(&self, actor: EntityId, key: EntityId) -> bool {
        let Some(actor_cell) = self.position(actor) else {
            return false;
        };
        let taken = self
            .update_pair(actor, key, |holder, item| {
                let EntityKind::Key(state) = &mut item.kind else {
                    return false;
                };
                if *state != KeyState::Unused || item.cell != actor_cell {
                    return false;
                }
                let Some(player) = holder.as_player_mut() else {
                    return false;
                };
                *state = KeyState::Held;
                item.active = false;
                player.keys.push(key);
                true
            })
            .unwrap_or(false);

        if taken {
            let _ = self.grid().release(actor_cell, Layer::Bottom, key);
            info!(player = %actor, %key, cell = %actor_cell, "key picked up");
            self.play_sound(SoundKind::KeyPickup);
        }
        taken
    }

    fn open_chest(&self, actor: EntityId, chest: EntityId) -> bool {
        let win_gems = self.rules().win_gems;
        let opened = self
            .update_pair(actor, chest, |holder, target| {
                let adjacent = holder.cell.manhattan_distance(target.cell) == 1;
                let toward = Direction::between(holder.cell, target.cell);
                let EntityKind::Chest(data) = &mut target.kind else {
                    return None;
                };
                if data.state != ChestState::Closed || !adjacent {
                    return None;
                }
                let player = holder.as_player_mut()?;
                if player.gems >= win_gems || player.keys.is_empty() {
                    return None;
                }
                let key = player.keys.remove(0);
                data.state = ChestState::Opening;
                target.frame = 0;
                if let Some(direction) = toward {
                    holder.facing = holder.facing.toward(direction);
                }
                Some(key)
            })
            .flatten();

        let Some(key) = opened else {
            return false;
        };
        let _ = self.update(key, |entity| {
            if let EntityKind::Key(state) = &mut entity.kind {
                *state = KeyState::Used;
            }
        });
        info!(player = %actor, %chest, %key, "chest opening");
        self.play_sound(SoundKind::ChestOpen);
        true
    }

    fn enter_portal(&self, actor: EntityId, portal: EntityId) -> bool {
        let Some(actor_cell) = self.position(actor) else {
            return false;
        };
        let Some((portal_cell, partner)) = self
            .inspect(portal, |entity| match &entity.kind {
                EntityKind::Portal(data) if data.state == PortalState::Active => {
                    data.partner.map(|partner| (entity.cell, partner))
                }
                _ => None,
            })
            .flatten()
        else {
            return false;
        };
        if portal_cell != actor_cell {
            return false;
        }
        let Some(destination) = self
            .inspect(partner, |entity| match &entity.kind {
                EntityKind::Portal(data) if data.state == PortalState::Active => Some(entity.cell),
                _ => None,
            })
            .flatten()
        else {
            return false;
        };

        if self.relocate(actor, destination, None) != Transfer::Moved {
            trace!(player = %actor, %destination, "portal exit occupied");
            return false;
        }

        let cooldown = self.rules().portal_cooldown_frames;
        let _ = self.update_pair(portal, partner, |entry, exit| {
            for end in [entry, exit] {
                if let EntityKind::Portal(data) = &mut end.kind {
                    data.state = PortalState::Inactive;
                    data.cooldown = cooldown;
                }
            }
        });
        info!(player = %actor, from = %actor_cell, to = %destination, "teleported");
        self.play_sound(SoundKind::Teleport);
        true
    }

    fn leave_through_exit(&self, actor: EntityId) -> bool {
        let at_exit = self.exit().is_some() && self.position(actor) == self.exit();
        if actor != self.player() || !at_exit || !self.door_open() {
            return false;
        }
        self.play_sound(SoundKind::Victory);
        self.finish(Outcome::Won);
        true
    }

    /// Places a gem worth `value` above `origin`, addressed to the player.
    ///
    /// Returns the new gem, or `None` when the value was credited at once
    /// because the top slot of `origin` was taken.
    pub fn spawn_gem(&self, origin: CellCoord, value: u32) -> Option<EntityId> {
        let recipient = self.player();
        let gem = self.register(origin, EntityKind::Gem(GemData { recipient, value }));
        if self.grid().claim(origin, Layer::Top, gem) {
            debug!(%gem, cell = %origin, value, "gem released");
            return Some(gem);
        }
        let _ = self.update(gem, |entity| entity.active = false);
        self.credit(recipient, value);
        None
    }

    /// Moves a gem one cell toward its recipient and delivers it on arrival.
    pub fn advance_gem(&self, gem: EntityId) -> GemProgress {
        let Some((cell, data)) = self
            .inspect(gem, |entity| match &entity.kind {
                EntityKind::Gem(data) if entity.active => Some((entity.cell, *data)),
                _ => None,
            })
            .flatten()
        else {
            return GemProgress::Gone;
        };
        let Some(destination) = self.position(data.recipient) else {
            return GemProgress::Gone;
        };

        if cell != destination {
            let (columns, rows) = self.grid().dimensions();
            let moved = approach(cell, destination).into_iter().flatten().any(|direction| {
                cell.step(direction, columns, rows).is_some_and(|next| {
                    self.relocate(gem, next, Some(direction)) == Transfer::Moved
                })
            });
            if moved {
                self.request_redraw();
            }
        }

        if self.position(gem) == Some(destination) {
            self.deliver_gem(gem)
        } else {
            GemProgress::Travelling
        }
    }

    fn deliver_gem(&self, gem: EntityId) -> GemProgress {
        let delivered = self
            .update(gem, |entity| match entity.kind {
                EntityKind::Gem(data) if entity.active => {
                    entity.active = false;
                    Some((entity.cell, data))
                }
                _ => None,
            })
            .flatten();
        let Some((cell, data)) = delivered else {
            return GemProgress::Gone;
        };
        let _ = self.grid().release(cell, Layer::Top, gem);
        self.credit(data.recipient, data.value);
        self.request_redraw();
        GemProgress::Delivered
    }

    fn credit(&self, recipient: EntityId, value: u32) {
        let total = self
            .update(recipient, |entity| {
                entity.as_player_mut().map(|player| {
                    player.gems = player.gems.saturating_add(value);
                    player.gems
                })
            })
            .flatten();
        if let Some(total) = total {
            info!(player = %recipient, value, total, "gems collected");
            self.play_sound(SoundKind::GemCollected);
        }
    }
}

/// Directions that shorten the distance from `from` to `to`, the longer axis
/// first.
fn approach(from: CellCoord, to: CellCoord) -> [Option<Direction>; 2] {
    let horizontal = match to.column().cmp(&from.column()) {
        std::cmp::Ordering::Greater => Some(Direction::East),
        std::cmp::Ordering::Less => Some(Direction::West),
        std::cmp::Ordering::Equal => None,
    };
    let vertical = match to.row().cmp(&from.row()) {
        std::cmp::Ordering::Greater => Some(Direction::South),
        std::cmp::Ordering::Less => Some(Direction::North),
        std::cmp::Ordering::Equal => None,
    };
    if from.column().abs_diff(to.column()) >= from.row().abs_diff(to.row()) {
        [horizontal, vertical]
    } else {
        [vertical, horizontal]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn approach_prefers_longer_axis() {
        let from = CellCoord::new(0, 0);
        assert_eq!(
            approach(from, CellCoord::new(3, 1)),
            [Some(Direction::East), Some(Direction::South)]
        );
        assert_eq!(
            approach(from, CellCoord::new(0, 2)),
            [Some(Direction::South), None]
        );
        assert_eq!(
            approach(CellCoord::new(2, 4), CellCoord::new(1, 0)),
            [Some(Direction::North), Some(Direction::West)]
        );
    }
}
