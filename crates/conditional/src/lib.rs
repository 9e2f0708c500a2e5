//! Frame-ticked, chain-based conditional task scheduler.
//!
//! This library is a substitute for stackful coroutines in frame-driven
//! programs: the host calls [`Scheduler::tick`] once per frame, and every
//! active task is polled exactly once. A task never blocks the tick; it
//! reports "not yet done" and is polled again next frame, so a logical
//! operation can span arbitrarily many frames without occupying a thread.
//!
//! Calling code expresses "wait until X, then do Y, then wait N seconds,
//! then do Z" as a fluent chain of predicate/action pairs:
//!
//! ```rust,ignore
//! let mut sched = Scheduler::default();
//! sched
//!     .when(|| door_open())
//!     .run(|| play_creak())
//!     .then_wait(2.0)
//!     .run(|| slam_shut());
//! ```
//!
//! When a link completes, its successor is promoted into the active set and
//! polled starting the next tick. Only the relative order within a single
//! chain is guaranteed; independent chains have no fairness or priority
//! ordering.
//!
//! # Architecture
//!
//! - [`Scheduler`]: owns every task in an arena and drives the per-frame
//!   tick/removal loop
//! - [`Chain`]: borrowing fluent builder that constructs and links tasks
//! - [`TaskHandle`]: clonable cancellation token for a single link
//! - [`TickDelta`] / [`GameTime`]: the two host time bases and the shared
//!   elapsed-time cell
//!
//! # Threading
//!
//! The scheduler is single-threaded and cooperative by contract: all task
//! updates for a tick run sequentially on the thread that calls `tick`, and
//! handles use non-atomic shared cells. The types are deliberately `!Send`.
//!
//! # Failure isolation
//!
//! A panic inside a user predicate or action is caught per task: the failing
//! task is dropped together with its unpromoted continuation, a message is
//! logged through `tracing`, and every other task keeps running.

pub mod chain;
pub mod clock;
pub mod config;
pub mod error;
pub mod scheduler;

mod task;

// Re-export core types for ergonomic API
pub use chain::{Chain, TaskHandle};
pub use clock::{ClockKind, GameTime, TickDelta};
pub use config::{RunMode, SchedulerConfig};
pub use error::TaskFailure;
pub use scheduler::{Scheduler, TaskId};
