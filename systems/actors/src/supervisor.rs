//! Thread-per-entity scheduling of a scene.

use std::{
    io,
    sync::Arc,
    thread::{self, JoinHandle},
    time::Duration,
};

use delve_core::EntityId;
use delve_system_autopilot::{player_controller, pursuit_controller, SearchSettings};
use delve_world::{EntityClass, Outcome, World};
use parking_lot::Mutex;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{behaviour, ActorTick, Timing};

/// Errors raised while starting scene threads.
#[derive(Debug, Error)]
pub enum SupervisorError {
    /// The operating system refused to start a thread.
    #[error("failed to spawn thread `{name}`")]
    Spawn {
        /// Name of the thread that failed to start.
        name: String,
        /// Underlying failure.
        #[source]
        source: io::Error,
    },
}

/// Shared handle that starts named loops and remembers them for joining.
#[derive(Clone, Debug)]
struct Spawner {
    world: Arc<World>,
    timing: Timing,
    handles: Arc<Mutex<Vec<JoinHandle<()>>>>,
}

impl Spawner {
    fn spawn<F>(&self, name: String, body: F) -> Result<(), SupervisorError>
    where
        F: FnOnce() + Send + 'static,
    {
        let handle = thread::Builder::new()
            .name(name.clone())
            .spawn(body)
            .map_err(|source| SupervisorError::Spawn { name, source })?;
        self.handles.lock().push(handle);
        Ok(())
    }

    fn spawn_entity(&self, id: EntityId) -> Result<(), SupervisorError> {
        let Some(class) = self.world.class_of(id) else {
            return Ok(());
        };
        let interval = self.timing.entity(class);
        let spawner = self.clone();
        self.spawn(format!("{class:?}-{}", id.get()).to_lowercase(), move || {
            spawner.entity_loop(id, interval);
        })
    }

    fn entity_loop(&self, id: EntityId, interval: Duration) {
        let liveness = self.world.liveness();
        while liveness.sleep(interval) {
            match behaviour::tick(&self.world, id) {
                ActorTick::Continue => {}
                ActorTick::Spawned(child) => {
                    if let Err(error) = self.spawn_entity(child) {
                        warn!(%id, %child, %error, "could not start entity loop");
                    }
                }
                ActorTick::Retired => break,
            }
        }
        debug!(%id, "entity loop finished");
    }
}

/// Owns every thread of a running scene.
#[derive(Debug)]
pub struct Supervisor {
    spawner: Spawner,
}

impl Supervisor {
    /// Starts one loop per entity, the player autopilot and one pursuit
    /// controller per enemy. `seed` feeds the controllers' wander fallback.
    pub fn launch(
        world: Arc<World>,
        timing: Timing,
        settings: SearchSettings,
        seed: u64,
    ) -> Result<Self, SupervisorError> {
        let supervisor = Self {
            spawner: Spawner {
                world: Arc::clone(&world),
                timing,
                handles: Arc::new(Mutex::new(Vec::new())),
            },
        };
        if let Err(error) = supervisor.start(&settings, seed) {
            supervisor.stop();
            return Err(error);
        }
        info!(
            threads = supervisor.spawner.handles.lock().len(),
            "scene threads started"
        );
        Ok(supervisor)
    }

    fn start(&self, settings: &SearchSettings, seed: u64) -> Result<(), SupervisorError> {
        let world = &self.spawner.world;
        let timing = self.spawner.timing;
        let entities = world.entity_ids();

        for &id in &entities {
            self.spawner.spawn_entity(id)?;
        }

        let mut autopilot = player_controller(Arc::clone(world), settings, seed);
        let liveness_owner = Arc::clone(world);
        self.spawner.spawn("autopilot".to_owned(), move || {
            autopilot.run(timing.autopilot(), liveness_owner.liveness());
        })?;

        let enemies = entities
            .into_iter()
            .filter(|id| world.class_of(*id) == Some(EntityClass::Enemy));
        for (offset, enemy) in (1u64..).zip(enemies) {
            let mut pursuit =
                pursuit_controller(Arc::clone(world), enemy, settings, seed.wrapping_add(offset));
            let liveness_owner = Arc::clone(world);
            self.spawner
                .spawn(format!("pursuit-{}", enemy.get()), move || {
                    pursuit.run(timing.pursuit(), liveness_owner.liveness());
                })?;
        }
        Ok(())
    }

    /// World the threads operate on.
    #[must_use]
    pub fn world(&self) -> &Arc<World> {
        &self.spawner.world
    }

    /// Blocks until the scene ends or `timeout` passes; returns the outcome
    /// if there is one.
    pub fn wait(&self, timeout: Duration) -> Option<Outcome> {
        let _ = self.spawner.world.liveness().sleep(timeout);
        self.spawner.world.outcome()
    }

    /// Halts every loop, joins the threads and returns the outcome, if any.
    pub fn shutdown(self) -> Option<Outcome> {
        self.stop();
        self.spawner.world.outcome()
    }

    fn stop(&self) {
        self.spawner.world.halt();
        loop {
            let Some(handle) = self.spawner.handles.lock().pop() else {
                break;
            };
            let name = handle.thread().name().unwrap_or("unnamed").to_owned();
            if handle.join().is_err() {
                warn!(thread = %name, "scene thread panicked");
            }
        }
        debug!("scene threads joined");
    }
}
