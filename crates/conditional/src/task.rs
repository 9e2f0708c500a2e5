//! Task variants and the per-tick completion state machine.
//!
//! A task is the atomic schedulable unit: a completion predicate, an
//! optional action, and an optional successor edge. The variant set is
//! closed and dispatched through a single [`Task::step`] operation so every
//! combination of cancel predicate, condition, and timer is handled
//! exhaustively in one place.

use std::cell::Cell;
use std::rc::Rc;

use crate::clock::{ClockKind, TickDelta};
use crate::scheduler::TaskId;

pub(crate) type Predicate = Box<dyn FnMut() -> bool>;
pub(crate) type Action = Box<dyn FnMut()>;

/// Outcome of one [`Task::step`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Step {
    /// Not done yet; poll again next tick.
    Active,
    /// Finished this tick. The scheduler removes the task and promotes its
    /// successor.
    Done,
}

/// Variant-specific state. The predicate lives inside the variant because
/// timed waits have none: they complete on their clock alone and ignore
/// cancel predicates (only an explicit [`TaskHandle::cancel`] ends them
/// early).
///
/// [`TaskHandle::cancel`]: crate::TaskHandle::cancel
pub(crate) enum TaskKind {
    /// Runs its action once, on the first tick the condition holds.
    Once { condition: Predicate },
    /// Runs its action on every tick the condition holds; never
    /// self-completes.
    Continuous { condition: Predicate },
    /// Accumulates the selected delta; fires once when it reaches the
    /// duration.
    WaitTime {
        duration: f32,
        elapsed: f32,
        clock: ClockKind,
    },
    /// Counts ticks down; fires once when the counter is exhausted.
    WaitFrames { remaining: u32 },
}

impl TaskKind {
    pub(crate) fn name(&self) -> &'static str {
        match self {
            TaskKind::Once { .. } => "once",
            TaskKind::Continuous { .. } => "continuous",
            TaskKind::WaitTime { .. } => "wait_time",
            TaskKind::WaitFrames { .. } => "wait_frames",
        }
    }
}

pub(crate) struct Task {
    kind: TaskKind,
    action: Option<Action>,
    cancel_condition: Option<Predicate>,
    successor: Option<TaskId>,
    /// Shared with every `TaskHandle` cloned off this task.
    cancel_requested: Rc<Cell<bool>>,
    suppress: bool,
}

impl Task {
    fn new(kind: TaskKind) -> Self {
        Self {
            kind,
            action: None,
            cancel_condition: None,
            successor: None,
            cancel_requested: Rc::new(Cell::new(false)),
            suppress: false,
        }
    }

    pub(crate) fn once(condition: impl FnMut() -> bool + 'static) -> Self {
        Self::new(TaskKind::Once {
            condition: Box::new(condition),
        })
    }

    pub(crate) fn continuous(condition: impl FnMut() -> bool + 'static) -> Self {
        Self::new(TaskKind::Continuous {
            condition: Box::new(condition),
        })
    }

    pub(crate) fn wait_time(duration: f32) -> Self {
        Self::new(TaskKind::WaitTime {
            duration,
            elapsed: 0.0,
            clock: ClockKind::Scaled,
        })
    }

    pub(crate) fn wait_frames(frames: u32) -> Self {
        Self::new(TaskKind::WaitFrames { remaining: frames })
    }

    /// Pending→Active hook. Runs exactly once, at registration for roots or
    /// at promotion for successors. Timed waits reset their accumulator here
    /// so time spent pending (behind an unfinished predecessor) never
    /// counts.
    pub(crate) fn start(&mut self) {
        if let TaskKind::WaitTime { elapsed, .. } = &mut self.kind {
            *elapsed = 0.0;
        }
    }

    /// Advances the task by one tick.
    pub(crate) fn step(&mut self, delta: TickDelta) -> Step {
        match &mut self.kind {
            TaskKind::Once { condition } => {
                if check(&mut self.cancel_condition) {
                    return Step::Done;
                }
                if condition() {
                    run(&mut self.action);
                    return Step::Done;
                }
                Step::Active
            }
            TaskKind::Continuous { condition } => {
                if check(&mut self.cancel_condition) {
                    return Step::Done;
                }
                if condition() {
                    run(&mut self.action);
                }
                Step::Active
            }
            TaskKind::WaitTime {
                duration,
                elapsed,
                clock,
            } => {
                *elapsed += delta.select(*clock);
                if *elapsed >= *duration {
                    run(&mut self.action);
                    return Step::Done;
                }
                Step::Active
            }
            TaskKind::WaitFrames { remaining } => {
                *remaining = remaining.saturating_sub(1);
                if *remaining == 0 {
                    run(&mut self.action);
                    return Step::Done;
                }
                Step::Active
            }
        }
    }

    pub(crate) fn kind_name(&self) -> &'static str {
        self.kind.name()
    }

    pub(crate) fn set_action(&mut self, action: impl FnMut() + 'static) {
        self.action = Some(Box::new(action));
    }

    pub(crate) fn set_cancel_condition(&mut self, predicate: impl FnMut() -> bool + 'static) {
        self.cancel_condition = Some(Box::new(predicate));
    }

    pub(crate) fn set_suppress(&mut self, value: bool) {
        self.suppress = value;
    }

    pub(crate) fn suppress(&self) -> bool {
        self.suppress
    }

    /// Switches a timed wait's clock; no effect on other variants.
    pub(crate) fn set_clock(&mut self, value: ClockKind) {
        if let TaskKind::WaitTime { clock, .. } = &mut self.kind {
            *clock = value;
        }
    }

    /// Links a successor, returning the previously linked one (if any) so
    /// the scheduler can release its orphaned chain. Single-successor only:
    /// a task cannot branch.
    pub(crate) fn replace_successor(&mut self, next: TaskId) -> Option<TaskId> {
        self.successor.replace(next)
    }

    pub(crate) fn successor(&self) -> Option<TaskId> {
        self.successor
    }

    pub(crate) fn cancel_flag(&self) -> Rc<Cell<bool>> {
        Rc::clone(&self.cancel_requested)
    }

    pub(crate) fn cancel_requested(&self) -> bool {
        self.cancel_requested.get()
    }
}

fn check(predicate: &mut Option<Predicate>) -> bool {
    predicate.as_mut().is_some_and(|p| p())
}

fn run(action: &mut Option<Action>) {
    if let Some(action) = action.as_mut() {
        action();
    }
}
