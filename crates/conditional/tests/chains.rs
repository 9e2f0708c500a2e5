//! End-to-end chain scenarios driven through the public API.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use conditional::{RunMode, Scheduler, SchedulerConfig, TickDelta};

fn counter() -> (Rc<Cell<u32>>, impl FnMut() + 'static) {
    let count = Rc::new(Cell::new(0));
    let inner = Rc::clone(&count);
    (count, move || inner.set(inner.get() + 1))
}

/// Ticks the scheduler `n` times at a uniform delta.
fn run_ticks(sched: &mut Scheduler, n: u32, dt: f32) {
    for _ in 0..n {
        sched.tick(TickDelta::uniform(dt));
    }
}

#[test]
fn wait_one_second_fires_on_tick_ten() {
    let mut sched = Scheduler::default();
    let (count, bump) = counter();
    sched.wait(1.0).run(bump);

    for tick in 1..=9 {
        sched.tick(TickDelta::uniform(0.1));
        assert_eq!(count.get(), 0, "must not fire on tick {tick}");
    }

    sched.tick(TickDelta::uniform(0.1));
    assert_eq!(count.get(), 1);
    assert_eq!(sched.active_count(), 0, "absent from the active set after firing");

    run_ticks(&mut sched, 5, 0.1);
    assert_eq!(count.get(), 1, "fires exactly once");
}

#[test]
fn wait_frames_fires_on_the_third_tick() {
    let mut sched = Scheduler::default();
    let (count, bump) = counter();
    sched.wait_frames(3).run(bump);

    run_ticks(&mut sched, 2, 0.1);
    assert_eq!(count.get(), 0, "never earlier than the 3rd tick");

    sched.tick(TickDelta::uniform(0.1));
    assert_eq!(count.get(), 1);
    assert_eq!(sched.active_count(), 0);
}

#[test]
fn gate_then_wait_accumulates_no_time_while_gated() {
    let mut sched = Scheduler::default();
    let gate = Rc::new(Cell::new(false));
    let read = Rc::clone(&gate);
    let (a, bump_a) = counter();
    let (b, bump_b) = counter();

    sched
        .when(move || read.get())
        .run(bump_a)
        .then_wait(2.0)
        .run(bump_b);

    // 50 ticks of 0.1s while the gate is closed: neither action fires and
    // none of that time counts toward the wait stage.
    run_ticks(&mut sched, 50, 0.1);
    assert_eq!(a.get(), 0);
    assert_eq!(b.get(), 0);

    gate.set(true);
    sched.tick(TickDelta::uniform(0.1));
    assert_eq!(a.get(), 1, "gate action fires the tick the predicate turns true");
    assert_eq!(b.get(), 0);

    // The wait stage started from zero at promotion; 2.0s of ticks later, b
    // fires.
    run_ticks(&mut sched, 19, 0.1);
    assert_eq!(b.get(), 0);
    sched.tick(TickDelta::uniform(0.1));
    assert_eq!(b.get(), 1);
    assert_eq!(sched.active_count(), 0);
}

#[test]
fn chain_links_run_strictly_in_order() {
    let mut sched = Scheduler::default();
    let order = Rc::new(RefCell::new(Vec::new()));

    let (o1, o2, o3) = (Rc::clone(&order), Rc::clone(&order), Rc::clone(&order));
    sched
        .when(|| true)
        .run(move || o1.borrow_mut().push(1))
        .then_wait(0.2)
        .run(move || o2.borrow_mut().push(2))
        .then_run(move || o3.borrow_mut().push(3));

    run_ticks(&mut sched, 10, 0.1);
    assert_eq!(*order.borrow(), vec![1, 2, 3]);
    assert_eq!(sched.active_count(), 0);
}

#[test]
fn continuous_link_never_self_terminates() {
    let mut sched = Scheduler::default();
    let (count, bump) = counter();
    let flip = Rc::new(Cell::new(true));
    let read = Rc::clone(&flip);

    let chain = sched.whenever(move || read.get()).run(bump);
    let handle = chain.handle();

    run_ticks(&mut sched, 3, 0.1);
    flip.set(false);
    run_ticks(&mut sched, 3, 0.1);
    flip.set(true);
    run_ticks(&mut sched, 3, 0.1);

    assert_eq!(count.get(), 6, "runs on every qualifying tick");
    assert_eq!(sched.active_count(), 1, "survives any predicate history");

    handle.cancel();
    run_ticks(&mut sched, 2, 0.1);
    assert_eq!(sched.active_count(), 0);
}

#[test]
fn cancelling_promotes_the_successor() {
    let mut sched = Scheduler::default();
    let (count, bump) = counter();

    let chain = sched.whenever(|| false);
    let handle = chain.handle();
    chain.then_run(bump);

    run_ticks(&mut sched, 3, 0.1);
    assert_eq!(count.get(), 0);

    handle.cancel();
    run_ticks(&mut sched, 2, 0.1);
    assert_eq!(count.get(), 1, "cancel finishes the link, the chain goes on");
}

#[test]
fn repeat_spaces_invocations_by_interval() {
    let mut sched = Scheduler::default();
    let (count, bump) = counter();
    sched.repeat(0.5, 3, bump);

    let mut fired_at = Vec::new();
    for tick in 1..=20 {
        let before = count.get();
        sched.tick(TickDelta::uniform(0.1));
        if count.get() > before {
            fired_at.push(tick);
        }
    }

    assert_eq!(count.get(), 3);
    // First invocation delayed by the interval; each repetition costs its
    // own 0.5s plus the one-tick promotion latency.
    assert_eq!(fired_at[0], 5);
    for pair in fired_at.windows(2) {
        assert!(pair[1] - pair[0] >= 5, "gap of at least 0.5s between firings");
    }
    assert_eq!(sched.active_count(), 0);
}

#[test]
fn repeat_now_adds_an_immediate_invocation() {
    let mut sched = Scheduler::default();
    let (count, bump) = counter();
    sched.repeat_now(0.5, 3, bump);

    assert_eq!(count.get(), 1, "first invocation on the calling frame");

    run_ticks(&mut sched, 30, 0.1);
    assert_eq!(count.get(), 4);
}

#[test]
fn repeat_now_with_zero_repetitions_fires_exactly_once() {
    let mut sched = Scheduler::default();
    let (count, bump) = counter();
    sched.repeat_now(0.5, 0, bump);

    assert_eq!(count.get(), 1);
    run_ticks(&mut sched, 20, 0.1);
    assert_eq!(count.get(), 1);
    assert_eq!(sched.active_count(), 0);
}

#[test]
fn repeat_with_zero_repetitions_still_reaches_the_continuation() {
    let mut sched = Scheduler::default();
    let (skipped, bump_skipped) = counter();
    let (after, bump_after) = counter();

    sched.repeat(0.5, 0, bump_skipped).then_run(bump_after);

    run_ticks(&mut sched, 5, 0.1);
    assert_eq!(skipped.get(), 0, "zero repetitions means zero invocations");
    assert_eq!(after.get(), 1);
}

#[test]
fn failure_truncates_only_its_own_chain() {
    let mut sched = Scheduler::new(SchedulerConfig {
        run_mode: RunMode::Batch,
        ..SchedulerConfig::default()
    });
    let (orphan, bump_orphan) = counter();
    let (bystander, bump_bystander) = counter();

    sched
        .wait(0.1)
        .run(|| panic!("exploding action"))
        .then_run(bump_orphan);
    sched.whenever(|| true).run(bump_bystander);

    run_ticks(&mut sched, 5, 0.1);

    assert_eq!(orphan.get(), 0, "successor of a failed link never runs");
    assert_eq!(bystander.get(), 5, "independent chain unaffected, including the failing tick");
    assert_eq!(sched.active_count(), 1);
}

#[test]
fn suppressed_failure_still_removes_the_task() {
    let mut sched = Scheduler::default();
    sched
        .when(|| true)
        .run(|| panic!("quiet"))
        .suppress_panics(true);

    sched.tick(TickDelta::uniform(0.1));
    assert_eq!(sched.active_count(), 0);
}

#[test]
fn unscaled_wait_runs_while_game_time_is_frozen() {
    let mut sched = Scheduler::default();
    let (scaled, bump_scaled) = counter();
    let (unscaled, bump_unscaled) = counter();

    sched.wait(0.3).run(bump_scaled);
    sched.wait(0.3).unscaled_time(true).run(bump_unscaled);

    // Paused game: scaled delta zero, real time flowing.
    for _ in 0..4 {
        sched.tick(TickDelta::new(0.0, 0.1));
    }
    assert_eq!(scaled.get(), 0);
    assert_eq!(unscaled.get(), 1);

    // Unpause; the scaled wait picks up from zero accumulated.
    for _ in 0..4 {
        sched.tick(TickDelta::new(0.1, 0.1));
    }
    assert_eq!(scaled.get(), 1);
    assert_eq!(sched.active_count(), 0);
}

#[test]
fn cancel_if_completes_without_running_the_action() {
    let mut sched = Scheduler::default();
    let (count, bump) = counter();
    let (after, bump_after) = counter();
    let abort = Rc::new(Cell::new(false));
    let read = Rc::clone(&abort);

    sched
        .when(|| false)
        .run(bump)
        .cancel_if(move || read.get())
        .then_run(bump_after);

    run_ticks(&mut sched, 3, 0.1);
    assert_eq!(sched.active_count(), 1);

    abort.set(true);
    run_ticks(&mut sched, 2, 0.1);
    assert_eq!(count.get(), 0, "cancel predicate skips the action");
    assert_eq!(after.get(), 1, "but the chain still continues");
}

#[test]
fn for_seconds_is_bounded_by_game_time() {
    let mut sched = Scheduler::default();
    let (count, bump) = counter();

    // Advance game time before building, so the captured deadline is
    // relative to "now", not to scheduler creation.
    run_ticks(&mut sched, 5, 0.1);
    let handle = sched.for_seconds(0.3).run(bump).handle();

    run_ticks(&mut sched, 10, 0.1);
    assert_eq!(count.get(), 3);

    handle.cancel();
    run_ticks(&mut sched, 1, 0.1);
    assert_eq!(sched.active_count(), 0);
}
