use super::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Beat {
    A,
    B,
}

#[test]
fn inactive_core_does_not_arm_timers() {
    let mut core = ControllerCore::new("test");
    core.arm(100, Beat::A);

    assert_eq!(core.armed_count(), 0);
    assert_eq!(core.next_deadline(), None);
}

#[test]
fn activation_happens_once() {
    let mut core: ControllerCore<Beat> = ControllerCore::new("test");

    assert!(core.activate());
    assert!(!core.activate());
    assert_eq!(core.status(), ControllerStatus::Active);
}

#[test]
fn fired_timer_is_no_longer_armed() {
    let mut core = ControllerCore::new("test");
    core.activate();
    core.arm(100, Beat::A);
    core.arm(200, Beat::B);

    assert_eq!(core.next_due(150), Some(Beat::A));
    assert_eq!(core.next_due(150), None);
    assert_eq!(core.armed_count(), 1);
}

#[test]
fn commit_cancels_everything_and_latches() {
    let mut core = ControllerCore::new("test");
    core.activate();
    core.arm(100, Beat::A);
    core.arm(200, Beat::B);

    assert_eq!(core.commit(|| "won"), Some("won"));
    assert_eq!(core.commit(|| "lost"), None);

    assert_eq!(core.status(), ControllerStatus::Finished);
    assert_eq!(core.armed_count(), 0);
    assert_eq!(core.next_due(10_000), None);
}

#[test]
fn deactivated_core_refuses_commit() {
    let mut core = ControllerCore::new("test");
    core.activate();
    core.arm(100, Beat::A);

    assert_eq!(core.deactivate(), 1);
    assert_eq!(core.status(), ControllerStatus::Deactivated);
    assert_eq!(core.next_due(10_000), None);
    assert_eq!(core.commit(|| ()), None);
}

#[test]
fn deactivate_after_finish_keeps_finished_status() {
    let mut core: ControllerCore<Beat> = ControllerCore::new("test");
    core.activate();
    core.commit(|| ());

    assert_eq!(core.deactivate(), 0);
    assert_eq!(core.status(), ControllerStatus::Finished);
}

#[test]
fn clock_stays_at_zero_until_mount() {
    let mut core = ControllerCore::new("test");
    core.settle(500);
    assert_eq!(core.now_ms(), 0);

    core.activate();
    core.arm(100, Beat::A);

    assert_eq!(core.next_deadline(), Some(100));
}
