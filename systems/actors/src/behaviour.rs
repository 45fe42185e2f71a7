//! One iteration of every entity kind's loop.

use delve_core::{CellCoord, EntityId};
use delve_world::{
    ChestState, EntityClass, EntityKind, GemProgress, KeyState, PortalState, StepOutcome, World,
};
use tracing::{debug, trace};

/// What an entity loop should do after one iteration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActorTick {
    /// Keep looping.
    Continue,
    /// Keep looping and start a loop for the newly created entity.
    Spawned(EntityId),
    /// The entity left play; its loop ends.
    Retired,
}

/// Runs one loop iteration for entity `id`.
pub fn tick(world: &World, id: EntityId) -> ActorTick {
    if !world.is_active(id) {
        return ActorTick::Retired;
    }
    let result = match world.class_of(id) {
        Some(EntityClass::Player) => starve(world, id),
        Some(EntityClass::Enemy) => pursue(world, id),
        Some(EntityClass::Key) => sparkle(world, id),
        Some(EntityClass::Chest) => open_lid(world, id),
        Some(EntityClass::Portal) => cool_down(world, id),
        Some(EntityClass::Gem) => travel(world, id),
        None => ActorTick::Retired,
    };
    world.request_redraw();
    result
}

fn starve(world: &World, player: EntityId) -> ActorTick {
    let _ = world.update(player, |entity| entity.advance_frame());
    world.hurt(player, world.rules().hunger_damage);
    if world.is_active(player) {
        ActorTick::Continue
    } else {
        ActorTick::Retired
    }
}

fn pursue(world: &World, enemy: EntityId) -> ActorTick {
    let _ = world.update(enemy, |entity| entity.advance_frame());
    if let Some(direction) = world.take_intent(enemy) {
        match world.step(enemy, direction) {
            StepOutcome::Inactive => return ActorTick::Retired,
            outcome => trace!(%enemy, ?direction, ?outcome, "enemy acted"),
        }
    }
    ActorTick::Continue
}

fn sparkle(world: &World, key: EntityId) -> ActorTick {
    let unused = world
        .update(key, |entity| {
            let unused = entity.kind == EntityKind::Key(KeyState::Unused);
            if unused {
                entity.advance_frame();
            }
            unused
        })
        .unwrap_or(false);
    if unused {
        ActorTick::Continue
    } else {
        ActorTick::Retired
    }
}

enum Lid {
    Waiting,
    Moving,
    Released { cell: CellCoord, gems: u32 },
    Done,
}

fn open_lid(world: &World, chest: EntityId) -> ActorTick {
    let frames = world.rules().chest_open_frames;
    let lid = world
        .update(chest, |entity| {
            let frame = entity.frame;
            let cell = entity.cell;
            let EntityKind::Chest(data) = &mut entity.kind else {
                return Lid::Done;
            };
            match data.state {
                ChestState::Closed => Lid::Waiting,
                ChestState::Opened => Lid::Done,
                ChestState::Opening if frame + 1 >= frames => {
                    data.state = ChestState::Opened;
                    Lid::Released {
                        cell,
                        gems: data.gems,
                    }
                }
                ChestState::Opening => Lid::Moving,
            }
        })
        .unwrap_or(Lid::Done);

    match lid {
        Lid::Waiting => ActorTick::Continue,
        Lid::Moving => {
            let _ = world.update(chest, |entity| entity.advance_frame());
            ActorTick::Continue
        }
        Lid::Released { cell, gems } => {
            debug!(%chest, gems, "chest opened");
            let _ = world.update(chest, |entity| entity.advance_frame());
            if gems == 0 {
                return ActorTick::Retired;
            }
            match world.spawn_gem(cell, gems) {
                Some(gem) => ActorTick::Spawned(gem),
                None => ActorTick::Retired,
            }
        }
        Lid::Done => ActorTick::Retired,
    }
}

fn cool_down(world: &World, portal: EntityId) -> ActorTick {
    let reactivated = world
        .update(portal, |entity| {
            entity.advance_frame();
            let EntityKind::Portal(data) = &mut entity.kind else {
                return false;
            };
            if data.state != PortalState::Inactive {
                return false;
            }
            data.cooldown = data.cooldown.saturating_sub(1);
            if data.cooldown == 0 {
                data.state = PortalState::Active;
                return true;
            }
            false
        })
        .unwrap_or(false);
    if reactivated {
        trace!(%portal, "portal active again");
    }
    ActorTick::Continue
}

fn travel(world: &World, gem: EntityId) -> ActorTick {
    let _ = world.update(gem, |entity| entity.advance_frame());
    match world.advance_gem(gem) {
        GemProgress::Travelling => ActorTick::Continue,
        GemProgress::Delivered | GemProgress::Gone => ActorTick::Retired,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use delve_core::{Direction, GoalKind};
    use delve_world::{query, Headless, Outcome, Rules, SceneLayout};

    use super::*;

    fn world_with(layout: SceneLayout, rules: Rules) -> World {
        World::from_layout(&layout, rules, Arc::new(Headless)).expect("valid layout")
    }

    fn first_of(world: &World, class: EntityClass) -> EntityId {
        query::entity_view(world)
            .of_class(class)
            .next()
            .map(|snapshot| snapshot.id)
            .expect("entity of requested class")
    }

    #[test]
    fn hunger_drains_health_until_death() {
        let rules = Rules {
            player_health: 2,
            hunger_damage: 1,
            ..Rules::default()
        };
        let world = world_with(SceneLayout::new(2, 2, CellCoord::new(0, 0)), rules);
        let player = world.player();

        assert_eq!(tick(&world, player), ActorTick::Continue);
        assert_eq!(tick(&world, player), ActorTick::Retired);
        assert_eq!(world.outcome(), Some(Outcome::Lost));
    }

    #[test]
    fn enemy_executes_its_intent_once() {
        let layout = SceneLayout::new(3, 1, CellCoord::new(0, 0)).with_enemy(CellCoord::new(2, 0));
        let world = world_with(layout, Rules::default());
        let enemy = first_of(&world, EntityClass::Enemy);

        world.set_intent(enemy, Some(Direction::West));
        assert_eq!(tick(&world, enemy), ActorTick::Continue);
        assert_eq!(world.position(enemy), Some(CellCoord::new(1, 0)));

        assert_eq!(tick(&world, enemy), ActorTick::Continue);
        assert_eq!(world.position(enemy), Some(CellCoord::new(1, 0)));
    }

    #[test]
    fn held_key_stops_sparkling() {
        let layout = SceneLayout::new(2, 1, CellCoord::new(0, 0)).with_key(CellCoord::new(0, 0));
        let world = world_with(layout, Rules::default());
        let key = first_of(&world, EntityClass::Key);

        assert_eq!(tick(&world, key), ActorTick::Continue);
        assert_eq!(world.inspect(key, |entity| entity.frame), Some(1));

        assert!(world.on_arrive(world.player(), GoalKind::Key, Some(key)));
        assert_eq!(tick(&world, key), ActorTick::Retired);
    }

    #[test]
    fn opening_chest_releases_a_gem_after_its_animation() {
        let rules = Rules {
            chest_open_frames: 3,
            ..Rules::default()
        };
        let layout = SceneLayout::new(3, 1, CellCoord::new(0, 0))
            .with_key(CellCoord::new(0, 0))
            .with_chest(CellCoord::new(1, 0), 2);
        let world = world_with(layout, rules);
        let player = world.player();
        let key = first_of(&world, EntityClass::Key);
        let chest = first_of(&world, EntityClass::Chest);

        assert_eq!(tick(&world, chest), ActorTick::Continue);
        assert!(world.on_arrive(player, GoalKind::Key, Some(key)));
        assert!(world.on_arrive(player, GoalKind::Chest, Some(chest)));

        assert_eq!(tick(&world, chest), ActorTick::Continue);
        assert_eq!(tick(&world, chest), ActorTick::Continue);
        let ActorTick::Spawned(gem) = tick(&world, chest) else {
            panic!("chest should release its gem on the third frame");
        };
        assert_eq!(world.class_of(gem), Some(EntityClass::Gem));
        assert_eq!(tick(&world, chest), ActorTick::Retired);

        assert_eq!(tick(&world, gem), ActorTick::Retired);
        assert_eq!(query::player_status(&world).map(|status| status.gems), Some(2));
    }

    #[test]
    fn portal_reactivates_after_cooldown() {
        let rules = Rules {
            portal_cooldown_frames: 2,
            ..Rules::default()
        };
        let layout = SceneLayout::new(4, 1, CellCoord::new(0, 0))
            .with_portal_pair(CellCoord::new(0, 0), CellCoord::new(3, 0));
        let world = world_with(layout, rules);
        let player = world.player();
        let entry = first_of(&world, EntityClass::Portal);
        assert!(world.on_arrive(player, GoalKind::Portal, Some(entry)));

        let state = |world: &World| {
            world
                .inspect(entry, |entity| match &entity.kind {
                    EntityKind::Portal(data) => Some(data.state),
                    _ => None,
                })
                .flatten()
        };
        assert_eq!(tick(&world, entry), ActorTick::Continue);
        assert_eq!(state(&world), Some(PortalState::Inactive));
        assert_eq!(tick(&world, entry), ActorTick::Continue);
        assert_eq!(state(&world), Some(PortalState::Active));
    }

    #[test]
    fn halted_scene_retires_every_loop() {
        let layout = SceneLayout::new(2, 1, CellCoord::new(0, 0)).with_key(CellCoord::new(1, 0));
        let world = world_with(layout, Rules::default());
        let key = first_of(&world, EntityClass::Key);
        world.halt();
        assert_eq!(tick(&world, key), ActorTick::Retired);
        assert_eq!(tick(&world, world.player()), ActorTick::Retired);
    }
}
