//! Agent-agnostic control loop: pick a destination, search, act.

use std::time::Duration;

use delve_core::{CellCoord, Direction, GoalKind, Heuristic, SearchAlgorithm};
use delve_system_search::{breadth_first_multi, plan, Passage, Route, SearchGrid, Target};
use delve_world::Liveness;
use rand::{seq::SliceRandom, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, trace};

use crate::{Availability, Destination, DestinationQueue, Pilot};

/// What one controller tick did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// The first step of a found route was issued.
    Moved(Direction),
    /// A completion action committed and its destination was consumed.
    Arrived(GoalKind),
    /// No destination was reachable; a random step was issued instead.
    Wandered(Direction),
    /// Nothing could be done this tick.
    Idle,
    /// The queue ran dry; the controller stopped for good.
    Finished,
    /// The controlled entity is no longer in play.
    Inactive,
}

impl TickOutcome {
    /// Reports whether the controller loop should stop.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, TickOutcome::Finished | TickOutcome::Inactive)
    }
}

/// Per-agent planner that turns destinations into one action per tick.
#[derive(Debug)]
pub struct Controller<P> {
    pilot: P,
    queue: DestinationQueue,
    algorithm: SearchAlgorithm,
    heuristic: Heuristic,
    rng: ChaCha8Rng,
    active: bool,
    last_route: Option<Route>,
}

impl<P: Pilot> Controller<P> {
    /// Creates an active controller; `seed` drives the wander fallback.
    #[must_use]
    pub fn new(
        pilot: P,
        queue: DestinationQueue,
        algorithm: SearchAlgorithm,
        heuristic: Heuristic,
        seed: u64,
    ) -> Self {
        Self {
            pilot,
            queue,
            algorithm,
            heuristic,
            rng: ChaCha8Rng::seed_from_u64(seed),
            active: true,
            last_route: None,
        }
    }

    /// Agent adapter the controller drives.
    #[must_use]
    pub fn pilot(&self) -> &P {
        &self.pilot
    }

    /// Destinations still queued.
    #[must_use]
    pub fn queue(&self) -> &DestinationQueue {
        &self.queue
    }

    /// Reports whether the controller still ticks.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Route found by the most recent successful search.
    #[must_use]
    pub fn last_route(&self) -> Option<&Route> {
        self.last_route.as_ref()
    }

    /// Ticks every `interval` until the controller stops or the scene halts.
    pub fn run(&mut self, interval: Duration, liveness: &Liveness) {
        debug!(agent = %self.pilot.agent(), "controller started");
        while liveness.sleep(interval) {
            if self.tick().is_terminal() {
                break;
            }
        }
        debug!(agent = %self.pilot.agent(), "controller stopped");
    }

    /// Performs one plan-and-act cycle.
    pub fn tick(&mut self) -> TickOutcome {
        if !self.active {
            return TickOutcome::Finished;
        }
        if !self.pilot.is_active() {
            return self.stop(TickOutcome::Inactive);
        }
        let Some(start) = self.pilot.position() else {
            return self.stop(TickOutcome::Inactive);
        };

        self.pilot.refresh(&mut self.queue);
        let pilot = &self.pilot;
        self.queue
            .retain(|destination| pilot.availability(destination) != Availability::Gone);
        if self.queue.is_empty() {
            return self.stop(TickOutcome::Finished);
        }

        let obtainable: Vec<Destination> = self
            .queue
            .ranked_from(start)
            .into_iter()
            .filter(|destination| {
                self.pilot.availability(destination) == Availability::Obtainable
            })
            .cloned()
            .collect();

        for destination in &obtainable {
            if !self.pilot.has_arrived(start, destination) {
                continue;
            }
            if self.pilot.complete(destination) {
                let _ = self.queue.remove(destination);
                debug!(
                    agent = %self.pilot.agent(),
                    kind = ?destination.kind(),
                    cell = %destination.cell(),
                    "destination consumed"
                );
                return TickOutcome::Arrived(destination.kind());
            }
        }

        let terminals: Vec<CellCoord> = obtainable.iter().map(Destination::cell).collect();
        let grid = self.pilot.snapshot(&terminals);

        match self.search(&grid, start, &obtainable) {
            Some(route) => {
                let step = route.first_move();
                self.last_route = Some(route);
                match step {
                    Some(direction) if self.pilot.act(direction) => TickOutcome::Moved(direction),
                    _ => TickOutcome::Idle,
                }
            }
            None => self.wander(&grid, start),
        }
    }

    fn search(
        &self,
        grid: &SearchGrid,
        start: CellCoord,
        obtainable: &[Destination],
    ) -> Option<Route> {
        if obtainable.is_empty() {
            return None;
        }
        if self.algorithm == SearchAlgorithm::BreadthFirst {
            let targets: Vec<Target> = obtainable.iter().map(Destination::as_target).collect();
            let outcome = breadth_first_multi(grid, start, &targets);
            trace!(
                agent = %self.pilot.agent(),
                expanded = outcome.expanded.len(),
                goal = ?outcome.goal,
                "multi-goal search finished"
            );
            return outcome.route;
        }

        obtainable.iter().find_map(|destination| {
            let outcome = plan(
                self.algorithm,
                grid,
                start,
                destination.cell(),
                self.heuristic,
            );
            trace!(
                agent = %self.pilot.agent(),
                algorithm = ?self.algorithm,
                goal = %destination.cell(),
                expanded = outcome.expanded.len(),
                found = outcome.is_success(),
                "search finished"
            );
            outcome.route
        })
    }

    fn wander(&mut self, grid: &SearchGrid, start: CellCoord) -> TickOutcome {
        let (columns, rows) = grid.dimensions();
        let open: Vec<Direction> = Direction::ALL
            .into_iter()
            .filter(|direction| {
                start
                    .step(*direction, columns, rows)
                    .is_some_and(|next| grid.passage(next) == Passage::Open)
            })
            .collect();

        match open.choose(&mut self.rng) {
            Some(&direction) if self.pilot.act(direction) => {
                trace!(agent = %self.pilot.agent(), ?direction, "wandering");
                TickOutcome::Wandered(direction)
            }
            _ => TickOutcome::Idle,
        }
    }

    fn stop(&mut self, outcome: TickOutcome) -> TickOutcome {
        if self.active {
            debug!(agent = %self.pilot.agent(), ?outcome, "controller deactivated");
        }
        self.active = false;
        outcome
    }
}
