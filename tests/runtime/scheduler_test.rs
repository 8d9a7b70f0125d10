/*!
 * Scheduler Tests
 * Tick budget, deadline handling and trigger re-arming
 */

use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;
use tasktree::{ManualClock, ManualTrigger, Scheduler};

fn scheduler() -> (Scheduler, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new());
    let scheduler = Scheduler::with_clock(Duration::from_millis(6), clock.clone()).unwrap();
    (scheduler, clock)
}

#[test]
fn test_tick_stops_when_queue_empties() {
    let (scheduler, clock) = scheduler();
    let ran = Arc::new(Mutex::new(0));
    for _ in 0..3 {
        let ran = ran.clone();
        scheduler.enqueue(move || *ran.lock() += 1);
    }

    let report = scheduler.tick();
    assert_eq!(report.executed, 3);
    assert_eq!(report.remaining, 0);
    assert!(!report.deadline_reached);
    // Time left over is simply unused
    assert_eq!(clock.elapsed(), Duration::ZERO);
}

#[test]
fn test_work_after_deadline_waits_for_next_tick() {
    let (scheduler, clock) = scheduler();
    let ran = Arc::new(Mutex::new(Vec::new()));

    let (s, c, r) = (scheduler.clone(), clock.clone(), ran.clone());
    scheduler.enqueue(move || {
        r.lock().push("first");
        c.advance(Duration::from_millis(6));
        let r = r.clone();
        s.enqueue(move || r.lock().push("late"));
    });

    let report = scheduler.tick();
    assert_eq!(report.executed, 1);
    assert_eq!(report.remaining, 1);
    assert_eq!(*ran.lock(), vec!["first"]);

    scheduler.tick();
    assert_eq!(*ran.lock(), vec!["first", "late"]);
}

#[test]
fn test_budget_spreads_long_queue_over_ticks() {
    let (scheduler, clock) = scheduler();
    for _ in 0..10 {
        let clock = clock.clone();
        scheduler.enqueue(move || clock.advance(Duration::from_millis(2)));
    }

    // 2ms per item against a 6ms budget: three items per tick
    let executed: Vec<usize> = (0..4).map(|_| scheduler.tick().executed).collect();
    assert_eq!(executed, vec![3, 3, 3, 1]);
    assert!(scheduler.is_empty());
}

#[test]
fn test_trigger_rearmed_after_every_tick() {
    let (scheduler, _clock) = scheduler();
    let trigger = Arc::new(ManualTrigger::new());
    scheduler.set_trigger(trigger.clone());
    assert_eq!(trigger.arm_count(), 1);

    scheduler.tick();
    scheduler.enqueue(|| panic!("malformed work item"));
    scheduler.tick();
    scheduler.tick();

    assert_eq!(trigger.arm_count(), 4);
    assert!(trigger.is_armed());
    assert_eq!(scheduler.stats().panicked, 1);
}

#[test]
fn test_stats_snapshot_serializes() {
    let (scheduler, _clock) = scheduler();
    scheduler.enqueue(|| {});
    scheduler.tick();

    let json = serde_json::to_value(scheduler.stats()).unwrap();
    assert_eq!(json["enqueued"], 1);
    assert_eq!(json["executed"], 1);
    assert_eq!(json["budget_micros"], 6_000);
}
