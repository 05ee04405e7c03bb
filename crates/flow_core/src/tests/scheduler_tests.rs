use super::*;

fn drain(scheduler: &mut TimerScheduler<&'static str>, until_ms: u64) -> Vec<(u64, &'static str)> {
    let mut fired = Vec::new();
    while let Some(timer) = scheduler.pop_due(until_ms) {
        fired.push((timer.deadline_ms, timer.event));
    }
    scheduler.settle(until_ms);
    fired
}

#[test]
fn fires_in_deadline_order() {
    let mut scheduler = TimerScheduler::new();
    scheduler.schedule(300, "late");
    scheduler.schedule(100, "early");
    scheduler.schedule(200, "middle");

    assert_eq!(
        drain(&mut scheduler, 1_000),
        vec![(100, "early"), (200, "middle"), (300, "late")]
    );
    assert_eq!(scheduler.pending_count(), 0);
}

#[test]
fn same_deadline_fires_in_scheduling_order() {
    let mut scheduler = TimerScheduler::new();
    scheduler.schedule(500, "first");
    scheduler.schedule(500, "second");
    scheduler.schedule(500, "third");

    let events: Vec<_> = drain(&mut scheduler, 500)
        .into_iter()
        .map(|(_, event)| event)
        .collect();
    assert_eq!(events, vec!["first", "second", "third"]);
}

#[test]
fn nothing_fires_before_deadline() {
    let mut scheduler = TimerScheduler::new();
    scheduler.schedule(1_000, "tick");

    assert!(drain(&mut scheduler, 999).is_empty());
    assert_eq!(scheduler.now_ms(), 999);
    assert_eq!(drain(&mut scheduler, 1_000), vec![(1_000, "tick")]);
}

#[test]
fn delay_is_measured_from_current_clock() {
    let mut scheduler = TimerScheduler::new();
    scheduler.settle(2_500);
    let handle = scheduler.schedule(1_000, "tick");

    assert_eq!(handle.deadline_ms(), 3_500);
    assert_eq!(scheduler.next_deadline(), Some(3_500));
}

#[test]
fn canceled_timer_never_fires() {
    let mut scheduler = TimerScheduler::new();
    let doomed = scheduler.schedule(100, "doomed");
    scheduler.schedule(200, "kept");

    assert!(scheduler.cancel(&doomed));
    assert!(!scheduler.is_pending(&doomed));
    assert_eq!(scheduler.next_deadline(), Some(200));
    assert_eq!(drain(&mut scheduler, 1_000), vec![(200, "kept")]);
}

#[test]
fn cancel_is_idempotent() {
    let mut scheduler = TimerScheduler::new();
    let handle = scheduler.schedule(100, "tick");

    assert!(scheduler.cancel(&handle));
    assert!(!scheduler.cancel(&handle));
    assert_eq!(scheduler.pending_count(), 0);
}

#[test]
fn cancel_after_fire_is_noop() {
    let mut scheduler = TimerScheduler::new();
    let handle = scheduler.schedule(100, "tick");
    assert_eq!(drain(&mut scheduler, 100).len(), 1);

    assert!(!scheduler.cancel(&handle));
}

#[test]
fn clock_reads_deadline_while_delivering() {
    let mut scheduler = TimerScheduler::new();
    scheduler.schedule(1_000, "tick");

    let fired = scheduler.pop_due(3_700).expect("due timer");
    assert_eq!(fired.deadline_ms, 1_000);
    assert_eq!(scheduler.now_ms(), 1_000);

    let rearmed = scheduler.schedule(1_000, "tick");
    assert_eq!(rearmed.deadline_ms(), 2_000);
}

#[test]
fn cancel_between_due_timers_takes_effect_immediately() {
    let mut scheduler = TimerScheduler::new();
    scheduler.schedule(100, "first");
    let second = scheduler.schedule(100, "second");

    let first = scheduler.pop_due(100).expect("first timer");
    assert_eq!(first.event, "first");
    scheduler.cancel(&second);

    assert!(scheduler.pop_due(100).is_none());
}
