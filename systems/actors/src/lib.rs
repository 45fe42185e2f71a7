#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Independently scheduled entity loops for Delve scenes.
//!
//! Every entity runs on its own named thread that sleeps for its kind's
//! interval, performs one [`tick`] under the world's lock discipline and asks
//! for a redraw. The [`Supervisor`] additionally runs the player autopilot
//! and one pursuit controller per enemy, and joins everything on shutdown.

mod behaviour;
mod supervisor;
mod timing;

pub use behaviour::{tick, ActorTick};
pub use supervisor::{Supervisor, SupervisorError};
pub use timing::Timing;
