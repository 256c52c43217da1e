use teller_core::StepTracker;

#[test]
fn increment_clamps_at_last_step() {
    let mut steps = StepTracker::new(3);
    steps.increment();
    steps.increment();
    assert!(steps.is_last());
    steps.increment();
    assert_eq!(steps.current(), 3);
}

#[test]
fn decrement_clamps_at_first_step() {
    let mut steps = StepTracker::new(3);
    steps.decrement();
    assert_eq!(steps.current(), 1);
    assert!(steps.is_first());
}

#[test]
fn reset_returns_to_first_step() {
    let mut steps = StepTracker::new(3);
    steps.increment();
    steps.reset();
    assert_eq!(steps.current(), 1);
    assert!(steps.has_next());
}
