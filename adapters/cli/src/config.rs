//! TOML configuration aggregated from every crate's tunables.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use delve_system_actors::Timing;
use delve_system_autopilot::SearchSettings;
use delve_world::{Rules, SceneTuning};
use serde::Deserialize;

/// Everything a headless run can be tuned with.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub(crate) struct GameConfig {
    /// Seed for scene generation and controller wandering.
    pub(crate) seed: u64,
    /// Wall-clock limit of a run in seconds.
    pub(crate) max_seconds: u64,
    /// Win, damage and animation rules.
    pub(crate) rules: Rules,
    /// Scene generator knobs.
    pub(crate) scene: SceneTuning,
    /// Loop intervals.
    pub(crate) timing: Timing,
    /// Controller search strategies.
    pub(crate) search: SearchSettings,
}

impl GameConfig {
    /// Reads and parses the TOML file at `path`.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("invalid delve config toml")
    }

    /// Run time limit, falling back to one minute when unset.
    pub(crate) fn time_limit(&self) -> std::time::Duration {
        let seconds = if self.max_seconds == 0 {
            60
        } else {
            self.max_seconds
        };
        std::time::Duration::from_secs(seconds)
    }
}

#[cfg(test)]
mod tests {
    use delve_core::{Heuristic, SearchAlgorithm};

    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = GameConfig::parse("").expect("empty toml is valid");
        assert_eq!(config, GameConfig::default());
        assert_eq!(config.time_limit(), std::time::Duration::from_secs(60));
    }

    #[test]
    fn nested_sections_override_selected_fields() {
        let config = GameConfig::parse(
            r#"
            seed = 42
            max_seconds = 5

            [rules]
            win_gems = 3

            [scene]
            columns = 20
            enemies = 0

            [timing]
            enemy_ms = 90

            [search]
            autopilot = "a_star"
            heuristic = "diagonal"
            "#,
        )
        .expect("config parses");

        assert_eq!(config.seed, 42);
        assert_eq!(config.rules.win_gems, 3);
        assert_eq!(config.rules.player_health, Rules::default().player_health);
        assert_eq!(config.scene.columns, 20);
        assert_eq!(config.scene.enemies, 0);
        assert_eq!(config.timing.enemy_ms, 90);
        assert_eq!(config.timing.player_ms, Timing::default().player_ms);
        assert_eq!(config.search.autopilot, SearchAlgorithm::AStar);
        assert_eq!(config.search.heuristic, Heuristic::Diagonal);
        assert_eq!(config.time_limit(), std::time::Duration::from_secs(5));
    }

    #[test]
    fn unknown_algorithm_is_rejected() {
        let error = GameConfig::parse("[search]\nautopilot = \"dijkstra\"\n")
            .expect_err("unknown variant");
        assert!(format!("{error:#}").contains("dijkstra"));
    }
}
