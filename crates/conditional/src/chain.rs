//! Fluent chain builder and the detached cancellation handle.
//!
//! Builder calls only construct and link tasks; none of them run any logic.
//! Each `then_*` call creates the successor, wires the continuation edge,
//! and returns a builder positioned on the new link, so a whole chain reads
//! as one expression:
//!
//! ```rust,ignore
//! sched
//!     .when(|| loading_finished())
//!     .run(|| hide_spinner())
//!     .then_wait(0.5)
//!     .run(|| fade_in());
//! ```

use std::cell::Cell;
use std::rc::Rc;

use crate::clock::ClockKind;
use crate::scheduler::{Scheduler, TaskId};
use crate::task::Task;

/// Borrowing builder positioned on one link of a chain.
///
/// Holds `&mut Scheduler`, so building happens strictly between ticks; the
/// scheduler remains the sole owner of every task the builder touches. Drop
/// the builder (or let the chain expression end) to release the borrow.
pub struct Chain<'s> {
    sched: &'s mut Scheduler,
    id: TaskId,
}

impl<'s> Chain<'s> {
    pub(crate) fn new(sched: &'s mut Scheduler, id: TaskId) -> Self {
        Self { sched, id }
    }

    /// Id of the link this builder is positioned on.
    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Sets (or replaces) the action on the current link.
    pub fn run(self, action: impl FnMut() + 'static) -> Self {
        if let Some(task) = self.sched.task_mut(self.id) {
            task.set_action(action);
        }
        self
    }

    /// Sets the cancel predicate on the current link: checked before the
    /// condition each tick, and when it holds the link completes immediately
    /// without running its action. Timed waits ignore it.
    pub fn cancel_if(self, predicate: impl FnMut() -> bool + 'static) -> Self {
        if let Some(task) = self.sched.task_mut(self.id) {
            task.set_cancel_condition(predicate);
        }
        self
    }

    /// Demotes this link's failure log severity to informational, even in
    /// interactive runs.
    pub fn suppress_panics(self, value: bool) -> Self {
        if let Some(task) = self.sched.task_mut(self.id) {
            task.set_suppress(value);
        }
        self
    }

    /// Makes a timed-wait link accumulate real time instead of scaled game
    /// time. No effect on other variants.
    pub fn unscaled_time(self, enabled: bool) -> Self {
        if let Some(task) = self.sched.task_mut(self.id) {
            task.set_clock(if enabled {
                ClockKind::Unscaled
            } else {
                ClockKind::Scaled
            });
        }
        self
    }

    /// Chains a continuous successor: after this link completes, run the
    /// next action on every tick the predicate holds.
    pub fn then_whenever(self, predicate: impl FnMut() -> bool + 'static) -> Self {
        self.link(Task::continuous(predicate))
    }

    /// Chains a one-shot successor: after this link completes, poll until
    /// the predicate holds, run the next action once, complete.
    pub fn then_when(self, predicate: impl FnMut() -> bool + 'static) -> Self {
        self.link(Task::once(predicate))
    }

    /// Chains a timed-wait successor. Its accumulator starts at zero when
    /// the predecessor completes, not when the chain is built.
    pub fn then_wait(self, seconds: f32) -> Self {
        self.link(Task::wait_time(seconds))
    }

    /// Chains a successor that runs the given action on its first tick.
    pub fn then_run(self, action: impl FnMut() + 'static) -> Self {
        self.link(Task::once(|| true)).run(action)
    }

    /// Detaches a clonable cancellation handle for the current link.
    pub fn handle(&self) -> TaskHandle {
        let flag = self
            .sched
            .task(self.id)
            .map(Task::cancel_flag)
            .unwrap_or_default();
        TaskHandle { flag }
    }

    /// Creates the successor, wires the continuation edge (replacing and
    /// releasing any previously linked chain), and repositions the builder.
    fn link(self, successor: Task) -> Self {
        let next = self.sched.insert_pending(successor);
        let orphan = self
            .sched
            .task_mut(self.id)
            .and_then(|task| task.replace_successor(next));
        if let Some(orphan) = orphan {
            // Single-successor only: the overwritten chain is unreachable.
            self.sched.release_chain(orphan);
        }
        Chain::new(self.sched, next)
    }
}

/// Non-owning cancellation handle for a single link.
///
/// Cancellation is cooperative: [`cancel`] marks the link done, and the
/// scheduler completes it the next time the link would have been polled (at
/// most one tick of latency). Because this is the same transition as natural
/// completion, a cancelled link still promotes its successor; cancellation
/// finishes a link, it does not abort the chain.
///
/// Clonable and callable from anywhere on the scheduler's thread, including
/// from inside the link's own action.
///
/// [`cancel`]: TaskHandle::cancel
#[derive(Debug, Clone, Default)]
pub struct TaskHandle {
    flag: Rc<Cell<bool>>,
}

impl TaskHandle {
    /// Marks the link done. Idempotent; a no-op once the link is gone.
    pub fn cancel(&self) {
        self.flag.set(true);
    }

    /// Whether cancellation has been requested through this handle.
    pub fn is_cancelled(&self) -> bool {
        self.flag.get()
    }
}
