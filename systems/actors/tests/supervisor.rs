use std::{sync::Arc, time::Duration};

use delve_core::{CellCoord, SoundKind};
use delve_system_actors::{Supervisor, Timing};
use delve_system_autopilot::SearchSettings;
use delve_world::{query, Outcome, RecordingPresentation, Rules, SceneLayout, World};

fn launch(layout: SceneLayout, rules: Rules) -> (Supervisor, Arc<RecordingPresentation>) {
    let presentation = Arc::new(RecordingPresentation::default());
    let world = Arc::new(
        World::from_layout(&layout, rules, presentation.clone()).expect("valid layout"),
    );
    let supervisor = Supervisor::launch(world, Timing::uniform(2), SearchSettings::default(), 5)
        .expect("threads start");
    (supervisor, presentation)
}

#[test]
fn autopilot_wins_a_scene_on_its_own() {
    let rules = Rules {
        hunger_damage: 0,
        chest_open_frames: 2,
        ..Rules::default()
    };
    let layout = SceneLayout::new(6, 3, CellCoord::new(0, 0))
        .with_key(CellCoord::new(2, 0))
        .with_key(CellCoord::new(0, 2))
        .with_chest(CellCoord::new(4, 1), 1)
        .with_chest(CellCoord::new(2, 2), 1)
        .with_exit(CellCoord::new(5, 2));
    let (supervisor, presentation) = launch(layout, rules);

    let outcome = supervisor.wait(Duration::from_secs(20));
    let world = Arc::clone(supervisor.world());
    assert_eq!(supervisor.shutdown(), Some(Outcome::Won));
    assert_eq!(outcome, Some(Outcome::Won));

    let status = query::player_status(&world).expect("player");
    assert_eq!(status.gems, 2);
    assert_eq!(status.cell, CellCoord::new(5, 2));

    let sounds = presentation.sounds();
    assert_eq!(
        sounds.iter().filter(|sound| **sound == SoundKind::KeyPickup).count(),
        2
    );
    assert_eq!(sounds.last(), Some(&SoundKind::Victory));
    assert!(presentation.redraws() > 0);
}

#[test]
fn hunger_eventually_kills_a_stranded_player() {
    let rules = Rules {
        player_health: 3,
        hunger_damage: 1,
        ..Rules::default()
    };
    let layout = SceneLayout::new(3, 1, CellCoord::new(0, 0))
        .with_wall(CellCoord::new(1, 0))
        .with_key(CellCoord::new(2, 0));
    let (supervisor, presentation) = launch(layout, rules);

    assert_eq!(supervisor.wait(Duration::from_secs(20)), Some(Outcome::Lost));
    assert_eq!(supervisor.shutdown(), Some(Outcome::Lost));
    assert!(presentation.sounds().contains(&SoundKind::Death));
}

#[test]
fn enemy_hunts_down_an_idle_player() {
    let rules = Rules {
        player_health: 20,
        enemy_damage: 10,
        hunger_damage: 0,
        ..Rules::default()
    };
    let layout = SceneLayout::new(5, 2, CellCoord::new(0, 0))
        .with_wall(CellCoord::new(2, 0))
        .with_enemy(CellCoord::new(4, 0));
    let (supervisor, presentation) = launch(layout, rules);

    assert_eq!(supervisor.wait(Duration::from_secs(20)), Some(Outcome::Lost));
    let world = Arc::clone(supervisor.world());
    let _ = supervisor.shutdown();

    let status = query::player_status(&world).expect("player");
    assert!(!status.alive);
    assert_eq!(status.cell, CellCoord::new(0, 0));
    let sounds = presentation.sounds();
    assert_eq!(
        sounds.iter().filter(|sound| **sound == SoundKind::Attack).count(),
        2
    );
    assert!(sounds.contains(&SoundKind::Death));
}

#[test]
fn shutdown_without_outcome_joins_every_thread() {
    let layout = SceneLayout::new(4, 4, CellCoord::new(0, 0))
        .with_key(CellCoord::new(3, 3))
        .with_portal_pair(CellCoord::new(1, 1), CellCoord::new(2, 2));
    let (supervisor, _) = launch(layout, Rules::default());
    let world = Arc::clone(supervisor.world());

    assert_eq!(supervisor.shutdown(), None);
    assert!(!world.is_running());
}
