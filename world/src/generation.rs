//! Seeded random scene generation with rejection of unplayable layouts.

use delve_core::CellCoord;
use rand::{seq::SliceRandom, Rng};
use serde::Deserialize;
use tracing::{debug, info};

use crate::scene::{SceneError, SceneLayout};

/// Knobs controlling the shape and population of generated scenes.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct SceneTuning {
    /// Scene width in cells.
    pub columns: u32,
    /// Scene height in cells.
    pub rows: u32,
    /// Probability that any given cell becomes a wall.
    pub wall_density: f64,
    /// Enemies hunting the player.
    pub enemies: usize,
    /// Keys lying on the floor.
    pub keys: usize,
    /// Closed chests.
    pub chests: usize,
    /// Gems stored in every chest.
    pub gems_per_chest: u32,
    /// Linked portal pairs.
    pub portal_pairs: usize,
    /// Layouts tried before generation gives up.
    pub max_attempts: u32,
}

impl Default for SceneTuning {
    fn default() -> Self {
        Self {
            columns: 16,
            rows: 12,
            wall_density: 0.18,
            enemies: 1,
            keys: 2,
            chests: 2,
            gems_per_chest: 1,
            portal_pairs: 1,
            max_attempts: 200,
        }
    }
}

impl SceneTuning {
    fn placements(&self) -> usize {
        1 + self.enemies + self.keys + self.chests + 2 * self.portal_pairs
    }
}

/// Generates a layout that passes the feasibility oracle.
///
/// Every attempt scatters walls, puts the exit on a border floor cell and
/// spreads the remaining objects over distinct floor cells; attempts the
/// oracle rejects are discarded.
pub fn generate<R>(tuning: &SceneTuning, rng: &mut R) -> Result<SceneLayout, SceneError>
where
    R: Rng + ?Sized,
{
    if tuning.columns == 0 || tuning.rows == 0 {
        return Err(SceneError::Empty {
            columns: tuning.columns,
            rows: tuning.rows,
        });
    }

    for attempt in 1..=tuning.max_attempts {
        let Some(layout) = propose(tuning, rng) else {
            debug!(attempt, "too few floor cells for the requested population");
            continue;
        };
        if layout.is_playable() {
            info!(
                attempt,
                columns = tuning.columns,
                rows = tuning.rows,
                walls = layout.walls().len(),
                "scene generated"
            );
            return Ok(layout);
        }
        debug!(attempt, "layout rejected by feasibility oracle");
    }

    Err(SceneError::Exhausted {
        attempts: tuning.max_attempts,
    })
}

fn propose<R>(tuning: &SceneTuning, rng: &mut R) -> Option<SceneLayout>
where
    R: Rng + ?Sized,
{
    let density = tuning.wall_density.clamp(0.0, 1.0);
    let (walls, mut floor): (Vec<CellCoord>, Vec<CellCoord>) = (0..tuning.rows)
        .flat_map(|row| (0..tuning.columns).map(move |column| CellCoord::new(column, row)))
        .partition(|_| rng.gen_bool(density));

    let border: Vec<CellCoord> = floor
        .iter()
        .copied()
        .filter(|cell| on_border(*cell, tuning.columns, tuning.rows))
        .collect();
    let exit = *border.choose(rng)?;
    floor.retain(|cell| *cell != exit);
    if floor.len() < tuning.placements() {
        return None;
    }
    floor.shuffle(rng);

    let mut cells = floor.into_iter();
    let mut layout = SceneLayout::new(tuning.columns, tuning.rows, cells.next()?)
        .with_walls(walls)
        .with_exit(exit);
    for _ in 0..tuning.enemies {
        layout = layout.with_enemy(cells.next()?);
    }
    for _ in 0..tuning.keys {
        layout = layout.with_key(cells.next()?);
    }
    for _ in 0..tuning.chests {
        layout = layout.with_chest(cells.next()?, tuning.gems_per_chest);
    }
    for _ in 0..tuning.portal_pairs {
        layout = layout.with_portal_pair(cells.next()?, cells.next()?);
    }
    Some(layout)
}

fn on_border(cell: CellCoord, columns: u32, rows: u32) -> bool {
    cell.column() == 0 || cell.row() == 0 || cell.column() + 1 == columns || cell.row() + 1 == rows
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    #[test]
    fn generated_layouts_are_playable() {
        let tuning = SceneTuning::default();
        for seed in 0..8 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let layout = generate(&tuning, &mut rng).expect("default tuning is satisfiable");
            assert!(layout.is_playable());
            assert_eq!(layout.keys().len(), tuning.keys);
            assert_eq!(layout.chests().len(), tuning.chests);
            assert_eq!(layout.portals().len(), tuning.portal_pairs);
            let exit = layout.exit().expect("exit placed");
            assert!(on_border(exit, tuning.columns, tuning.rows));
        }
    }

    #[test]
    fn same_seed_yields_same_layout() {
        let tuning = SceneTuning::default();
        let first = generate(&tuning, &mut ChaCha8Rng::seed_from_u64(11));
        let second = generate(&tuning, &mut ChaCha8Rng::seed_from_u64(11));
        assert_eq!(first, second);
    }

    #[test]
    fn overcrowded_tuning_exhausts_attempts() {
        let tuning = SceneTuning {
            columns: 3,
            rows: 3,
            wall_density: 0.0,
            enemies: 4,
            keys: 4,
            chests: 4,
            max_attempts: 5,
            ..SceneTuning::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        assert_eq!(
            generate(&tuning, &mut rng),
            Err(SceneError::Exhausted { attempts: 5 })
        );
    }

    #[test]
    fn zero_sized_scene_is_rejected() {
        let tuning = SceneTuning {
            columns: 0,
            ..SceneTuning::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert!(matches!(
            generate(&tuning, &mut rng),
            Err(SceneError::Empty { .. })
        ));
    }
}
