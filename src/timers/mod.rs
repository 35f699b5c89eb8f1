//! Timers for profiling the phases of an eigensolve.

#[allow(clippy::module_inception)]
mod timers;
pub use timers::Timers;
pub(crate) use timers::{notimeit, timeit};
