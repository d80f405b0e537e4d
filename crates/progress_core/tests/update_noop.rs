use progress_core::{update, Msg, TrackerState};

#[test]
fn update_is_noop() {
    let state = TrackerState::new();
    let (next, effects) = update(state.clone(), Msg::NoOp);

    assert_eq!(state, next);
    assert!(effects.is_empty());
}

#[test]
fn ticks_without_active_job_do_nothing() {
    let state = TrackerState::new();
    let (next, effects) = update(state.clone(), Msg::AnimationTick);
    assert_eq!(state, next);
    assert!(effects.is_empty());

    let (next, effects) = update(next, Msg::PollTick);
    assert_eq!(state, next);
    assert!(effects.is_empty());
}
