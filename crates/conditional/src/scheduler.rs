//! Scheduler registry: task arena, active set, and the per-frame tick loop.

use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use crate::chain::Chain;
use crate::clock::{GameTime, TickDelta};
use crate::config::{RunMode, SchedulerConfig};
use crate::error::TaskFailure;
use crate::task::{Step, Task};

/// Generational handle into the scheduler's task arena.
///
/// Ids are never reused while live: freeing a slot bumps its generation, so
/// a stale id held after its task completed simply resolves to nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId {
    index: u32,
    generation: u32,
}

struct Slot {
    generation: u32,
    task: Option<Task>,
}

/// Owner and driver of all conditional tasks.
///
/// The scheduler is the sole owner of every task: roots enter the active set
/// through a factory call ([`when`], [`whenever`], [`wait`], ...), successors
/// enter it when their predecessor completes. The host owns the scheduler,
/// calls [`tick`] once per frame, and [`clear`] on teardown. There is no
/// global instance; anything that schedules or cancels tasks is handed a
/// `&mut Scheduler` (or a [`TaskHandle`] for cancellation alone).
///
/// # Completion vs. cancellation vs. failure
///
/// Natural completion and explicit cancellation use the same transition and
/// both promote the successor: cancelling a link means "finish this link
/// now", not "abort the chain". A panicking callback is the one asymmetry:
/// the failing task is removed *without* promoting its successor, truncating
/// the chain, because follow-up actions would run against a premise the
/// panic already invalidated.
///
/// [`when`]: Scheduler::when
/// [`whenever`]: Scheduler::whenever
/// [`wait`]: Scheduler::wait
/// [`tick`]: Scheduler::tick
/// [`clear`]: Scheduler::clear
/// [`TaskHandle`]: crate::TaskHandle
pub struct Scheduler {
    slots: Vec<Slot>,
    free: Vec<u32>,
    /// Active roots in insertion order. Only `tick` iterates this.
    active: Vec<TaskId>,
    time: GameTime,
    run_mode: RunMode,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new(SchedulerConfig::default())
    }
}

impl Scheduler {
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            slots: Vec::with_capacity(config.initial_capacity),
            free: Vec::new(),
            active: Vec::with_capacity(config.initial_capacity),
            time: GameTime::default(),
            run_mode: config.run_mode,
        }
    }

    /// A clonable view of accumulated scaled time, for deadline predicates.
    pub fn time(&self) -> GameTime {
        self.time.clone()
    }

    /// Number of currently active tasks. Successors still pending behind an
    /// unfinished predecessor are not counted.
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    // ------------------------------------------------------------------
    // Factories
    // ------------------------------------------------------------------

    /// Polls until the predicate holds, then runs the attached action once
    /// and completes.
    pub fn when(&mut self, predicate: impl FnMut() -> bool + 'static) -> Chain<'_> {
        let id = self.register(Task::once(predicate));
        Chain::new(self, id)
    }

    /// Runs the attached action on every tick the predicate holds. Never
    /// self-completes; it ends only through explicit cancellation.
    pub fn whenever(&mut self, predicate: impl FnMut() -> bool + 'static) -> Chain<'_> {
        let id = self.register(Task::continuous(predicate));
        Chain::new(self, id)
    }

    /// Waits for `seconds` of scaled time, then runs the attached action
    /// once. Switch the time base with [`Chain::unscaled_time`].
    pub fn wait(&mut self, seconds: f32) -> Chain<'_> {
        let id = self.register(Task::wait_time(seconds));
        Chain::new(self, id)
    }

    /// Waits `frames` ticks, then runs the attached action once.
    pub fn wait_frames(&mut self, frames: u32) -> Chain<'_> {
        let id = self.register(Task::wait_frames(frames));
        Chain::new(self, id)
    }

    /// Runs the attached action every tick for `seconds` of scaled time.
    ///
    /// Sugar for [`whenever`] with a deadline captured from [`time`].
    ///
    /// [`whenever`]: Scheduler::whenever
    /// [`time`]: Scheduler::time
    pub fn for_seconds(&mut self, seconds: f32) -> Chain<'_> {
        let time = self.time();
        let end = time.now() + f64::from(seconds);
        self.whenever(move || time.now() <= end)
    }

    /// Runs `action` `repetitions` times, `interval` seconds of scaled time
    /// apart. The first invocation is delayed by `interval`; see
    /// [`repeat_now`] for an immediate first invocation.
    ///
    /// With `repetitions == 0` nothing is invoked: the returned link
    /// completes on its first tick, so any chained continuation still runs.
    ///
    /// [`repeat_now`]: Scheduler::repeat_now
    pub fn repeat(
        &mut self,
        interval: f32,
        repetitions: u32,
        action: impl FnMut() + 'static,
    ) -> Chain<'_> {
        if repetitions == 0 {
            return self.when(|| true);
        }

        // One closure per link, all driving the same underlying action.
        let shared = Rc::new(std::cell::RefCell::new(action));
        let invoke = {
            let shared = Rc::clone(&shared);
            move || (shared.borrow_mut())()
        };

        let mut chain = self.wait(interval).run(invoke);
        for _ in 1..repetitions {
            let invoke = {
                let shared = Rc::clone(&shared);
                move || (shared.borrow_mut())()
            };
            chain = chain.then_wait(interval).run(invoke);
        }
        chain
    }

    /// Same as [`repeat`], but the first invocation happens immediately, on
    /// the calling frame. Total invocations: `repetitions + 1` when
    /// `repetitions >= 1`, exactly 1 when `repetitions == 0`.
    ///
    /// [`repeat`]: Scheduler::repeat
    pub fn repeat_now(
        &mut self,
        interval: f32,
        repetitions: u32,
        mut action: impl FnMut() + 'static,
    ) -> Chain<'_> {
        action();
        self.repeat(interval, repetitions, action)
    }

    // ------------------------------------------------------------------
    // Tick loop
    // ------------------------------------------------------------------

    /// Advances every active task exactly once.
    ///
    /// Iterates the active set from the end backward so removing entry `i`
    /// never skips entry `i + 1`, and successors appended during this tick
    /// are first polled on the next one. A panic inside a task's predicate
    /// or action is caught here: the task and its unpromoted continuation
    /// are dropped, the failure is logged, and the loop continues with the
    /// remaining tasks.
    pub fn tick(&mut self, delta: TickDelta) {
        self.time.advance(delta.scaled);

        for i in (0..self.active.len()).rev() {
            let id = self.active[i];

            // Pending cancellation completes the link without running its
            // update; same transition as natural completion, so the
            // successor is still promoted.
            if self.task(id).is_some_and(Task::cancel_requested) {
                self.active.remove(i);
                self.finish(id);
                continue;
            }

            let outcome = match self.task_mut(id) {
                // The task is torn down on unwind and never observed again,
                // so broken invariants inside it cannot leak.
                Some(task) => panic::catch_unwind(AssertUnwindSafe(|| task.step(delta))),
                None => {
                    debug_assert!(false, "active id {id:?} missing from arena");
                    self.active.remove(i);
                    continue;
                }
            };

            match outcome {
                Ok(Step::Active) => {}
                Ok(Step::Done) => {
                    self.active.remove(i);
                    self.finish(id);
                }
                Err(payload) => {
                    self.active.remove(i);
                    self.report_failure(id, payload.as_ref());
                    self.release_chain(id);
                }
            }
        }
    }

    /// Drops every task, active and pending, without running any callbacks
    /// or promoting any successors. Used on host teardown.
    pub fn clear(&mut self) {
        let dropped = self.active.len();
        let roots = std::mem::take(&mut self.active);
        for id in roots {
            self.release_chain(id);
        }
        if dropped > 0 {
            tracing::debug!(dropped, "scheduler cleared");
        }
    }

    // ------------------------------------------------------------------
    // Arena + lifecycle internals
    // ------------------------------------------------------------------

    /// Inserts a task without activating it. Used for successors, which stay
    /// pending until their predecessor completes.
    pub(crate) fn insert_pending(&mut self, task: Task) -> TaskId {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.task = Some(task);
            TaskId {
                index,
                generation: slot.generation,
            }
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 0,
                task: Some(task),
            });
            TaskId {
                index,
                generation: 0,
            }
        }
    }

    /// Inserts a root task and activates it immediately.
    fn register(&mut self, task: Task) -> TaskId {
        let id = self.insert_pending(task);
        self.activate(id);
        id
    }

    /// Pending→Active transition: run the start hook, join the active set.
    fn activate(&mut self, id: TaskId) {
        let Some(task) = self.task_mut(id) else {
            debug_assert!(false, "activated id {id:?} missing from arena");
            return;
        };
        task.start();
        self.active.push(id);
    }

    /// Normal completion: remove the task and promote its successor, if any.
    /// The ownership transfer the chain relies on happens here and nowhere
    /// else.
    fn finish(&mut self, id: TaskId) {
        if let Some(next) = self.complete(id) {
            self.activate(next);
        }
    }

    /// Removes a finished task from the arena and returns the successor to
    /// promote.
    fn complete(&mut self, id: TaskId) -> Option<TaskId> {
        self.remove(id).and_then(|task| task.successor())
    }

    /// Frees a task and its entire unpromoted successor chain. Failure and
    /// teardown path: no start hooks, no promotions.
    pub(crate) fn release_chain(&mut self, id: TaskId) {
        let mut next = Some(id);
        while let Some(current) = next {
            next = self.remove(current).and_then(|task| task.successor());
        }
    }

    fn remove(&mut self, id: TaskId) -> Option<Task> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        let task = slot.task.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        Some(task)
    }

    pub(crate) fn task(&self, id: TaskId) -> Option<&Task> {
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.task.as_ref()
    }

    pub(crate) fn task_mut(&mut self, id: TaskId) -> Option<&mut Task> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.task.as_mut()
    }

    fn report_failure(&self, id: TaskId, payload: &(dyn std::any::Any + Send)) {
        let (kind, suppress) = match self.task(id) {
            Some(task) => (task.kind_name(), task.suppress()),
            None => ("unknown", false),
        };
        let failure = TaskFailure::from_panic(payload);

        // Severity depends on (run mode, suppress): loud only when a
        // developer is interactively watching an unsuppressed task.
        if self.run_mode == RunMode::Batch || suppress {
            tracing::info!(task = kind, error = %failure, "task failed, dropping chain");
        } else {
            tracing::error!(task = kind, error = %failure, "task failed, dropping chain");
        }
    }
}
