use posecam_base::{Clock, ManualClock, SystemClock};

#[test]
fn test_manual_clock_shared_between_clones() {
    let clock = ManualClock::new(1_000);
    let view = clock.clone();

    assert_eq!(clock.advance(33), 1_033);
    assert_eq!(view.now_millis(), 1_033);

    view.set(5);
    assert_eq!(clock.now_millis(), 5);
}

#[test]
fn test_system_clock_is_after_2020() {
    // 2020-01-01T00:00:00Z
    assert!(SystemClock.now_millis() > 1_577_836_800_000);
}
