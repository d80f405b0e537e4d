mod common;

use common::{completed, entity, init_logging, job, poll, running, started, tick};
use pretty_assertions::assert_eq;
use progress_core::{
    update, AnalysisRequest, Effect, EntryStatus, JobStatus, Msg, Phase, ProgressReport,
    RawPercent, TrackerConfig, TrackerState,
};

fn respond(
    state: TrackerState,
    seq: u64,
    report: ProgressReport,
) -> (TrackerState, Vec<Effect>) {
    update(
        state,
        Msg::PollResponse {
            job_id: job("j1"),
            seq,
            report,
        },
    )
}

#[test]
fn start_seeds_entry_and_begins_polling() {
    init_logging();
    let (mut state, effects) = update(
        TrackerState::new(),
        Msg::Start {
            job_id: job("j1"),
            entity_id: entity("acme"),
        },
    );

    assert_eq!(
        effects,
        vec![
            Effect::StartPolling { job_id: job("j1") },
            Effect::StartAnimation,
        ]
    );
    assert_eq!(state.phase(), Phase::Polling);
    assert!(state.is_analyzing());

    let entry = state.entry(&entity("acme")).expect("entry").clone();
    assert_eq!(entry.target, 10);
    assert_eq!(entry.display, 10);
    assert_eq!(entry.message, "Starting analysis...");
    assert_eq!(entry.status, EntryStatus::Running);
    assert!(state.consume_dirty());
    assert!(!state.consume_dirty());
}

#[test]
fn analyze_submits_before_tracking() {
    init_logging();
    let request = AnalysisRequest {
        job_id: job("j9"),
        entity_id: entity("globex"),
        company_name: "Globex".to_string(),
        website: Some("https://globex.example".to_string()),
        industry: None,
    };
    let (state, effects) = update(TrackerState::new(), Msg::Analyze(request.clone()));

    assert_eq!(
        effects,
        vec![
            Effect::SubmitAnalysis(request),
            Effect::StartPolling { job_id: job("j9") },
            Effect::StartAnimation,
        ]
    );
    assert_eq!(state.active().map(|j| j.job_id.clone()), Some(job("j9")));
}

#[test]
fn seed_percent_is_configurable() {
    let config = TrackerConfig {
        seed_percent: 5,
        start_message: "Queued".to_string(),
    };
    let (state, _) = update(
        TrackerState::with_config(config),
        Msg::Start {
            job_id: job("j1"),
            entity_id: entity("acme"),
        },
    );
    let entry = state.entry(&entity("acme")).unwrap();
    assert_eq!((entry.target, entry.display), (5, 5));
    assert_eq!(entry.message, "Queued");
}

#[test]
fn poll_ticks_issue_increasing_sequence_numbers() {
    let state = started("j1", "acme");
    let (state, first) = update(state, Msg::PollTick);
    let (state, _) = respond(state, 1, running(20.0, "Twenty"));
    let (_state, second) = update(state, Msg::PollTick);

    assert_eq!(
        first,
        vec![Effect::FetchProgress {
            job_id: job("j1"),
            seq: 1
        }]
    );
    assert_eq!(
        second,
        vec![Effect::FetchProgress {
            job_id: job("j1"),
            seq: 2
        }]
    );
}

#[test]
fn display_climbs_in_tens_then_caps_at_target() {
    init_logging();
    let (mut state, effects) = poll(started("j1", "acme"), running(45.0, "Crawling website"));
    assert!(effects.is_empty());
    assert_eq!(state.active().unwrap().target, 45);
    assert_eq!(state.entry(&entity("acme")).unwrap().message, "Crawling website");

    let mut seen = vec![state.active().unwrap().display];
    for _ in 0..6 {
        let (next, _) = tick(state);
        state = next;
        seen.push(state.active().unwrap().display);
    }
    assert_eq!(seen, vec![10, 20, 30, 40, 45, 45, 45]);

    let entry = state.entry(&entity("acme")).unwrap();
    assert_eq!(entry.display, 45);
    assert_eq!(entry.target, 45);
}

#[test]
fn target_never_regresses_on_smaller_reading() {
    let (state, _) = poll(started("j1", "acme"), running(60.0, "Sixty"));
    let (state, _) = poll(state, running(40.0, "Forty"));

    assert_eq!(state.active().unwrap().target, 60);
    let entry = state.entry(&entity("acme")).unwrap();
    assert_eq!(entry.target, 60);
    assert_eq!(entry.message, "Forty");
}

#[test]
fn empty_message_keeps_previous_line() {
    let (state, _) = poll(started("j1", "acme"), running(20.0, "Fetching filings"));
    let (state, _) = poll(state, running(30.0, "  "));
    assert_eq!(state.entry(&entity("acme")).unwrap().message, "Fetching filings");
}

#[test]
fn only_one_poll_is_in_flight_at_a_time() {
    init_logging();
    let state = started("j1", "acme");
    let (state, first) = update(state, Msg::PollTick);
    assert_eq!(
        first,
        vec![Effect::FetchProgress {
            job_id: job("j1"),
            seq: 1,
        }]
    );

    // The endpoint is slower than the poll interval: further ticks wait.
    let (state, second) = update(state, Msg::PollTick);
    let (state, third) = update(state, Msg::PollTick);
    assert!(second.is_empty());
    assert!(third.is_empty());
    assert!(state.active().unwrap().awaiting_response);

    let (state, _) = respond(state, 1, running(40.0, "slow but fresh"));
    assert_eq!(state.active().unwrap().target, 40);
    assert!(!state.active().unwrap().awaiting_response);

    let (state, next) = update(state, Msg::PollTick);
    assert_eq!(
        next,
        vec![Effect::FetchProgress {
            job_id: job("j1"),
            seq: 2,
        }]
    );
    let (state, effects) = respond(state, 2, completed());
    assert_eq!(effects, vec![Effect::StopPolling]);
    assert_eq!(state.phase(), Phase::Completing);
}

#[test]
fn stale_sequence_response_is_discarded() {
    init_logging();
    let (state, _) = poll(started("j1", "acme"), running(35.0, "fresh"));
    let (state, _) = update(state, Msg::PollTick);

    // A duplicate of #1 arrives while #2 is outstanding.
    let before = state.view();
    let (state, effects) = respond(state, 1, running(80.0, "late"));
    assert!(effects.is_empty());
    assert_eq!(state.active().unwrap().target, 35);
    assert!(state.active().unwrap().awaiting_response);
    assert_eq!(state.view().entries, before.entries);

    let (state, _) = respond(state, 2, running(50.0, "newer"));
    assert_eq!(state.active().unwrap().target, 50);
}

#[test]
fn string_percent_of_100_counts_as_completion() {
    let report = ProgressReport {
        percent: RawPercent::Text("100".to_string()),
        message: "Wrapping up".to_string(),
        status: JobStatus::Running,
    };
    let (state, effects) = poll(started("j1", "acme"), report);

    assert_eq!(state.phase(), Phase::Completing);
    assert_eq!(effects, vec![Effect::StopPolling]);
    let entry = state.entry(&entity("acme")).unwrap();
    assert_eq!(entry.status, EntryStatus::Completed);
    assert_eq!((entry.target, entry.display), (100, 100));
}

#[test]
fn entities_are_tracked_independently() {
    let (state, _) = poll(started("ja", "alpha"), running(70.0, "Alpha halfway"));
    let alpha_before = state.entry(&entity("alpha")).unwrap().clone();

    let (state, _) = update(
        state,
        Msg::Start {
            job_id: job("jb"),
            entity_id: entity("beta"),
        },
    );
    let (state, _) = poll(state, running(30.0, "Beta started"));
    let (state, _) = tick(state);

    assert_eq!(state.entry(&entity("alpha")).unwrap(), &alpha_before);
    let beta = state.entry(&entity("beta")).unwrap();
    assert_eq!((beta.target, beta.display), (30, 20));
    assert_eq!(state.view().entries.len(), 2);
}

#[test]
fn response_for_superseded_job_is_dropped() {
    let state = started("ja", "alpha");
    let (state, _) = update(state, Msg::PollTick);
    let (state, _) = update(
        state,
        Msg::Start {
            job_id: job("jb"),
            entity_id: entity("beta"),
        },
    );
    let (state, effects) = update(
        state,
        Msg::PollResponse {
            job_id: job("ja"),
            seq: 1,
            report: running(90.0, "old job"),
        },
    );
    assert!(effects.is_empty());
    assert_eq!(state.entry(&entity("alpha")).unwrap().target, 10);
    assert_eq!(state.active().unwrap().job_id, job("jb"));
}

#[test]
fn transient_poll_failure_keeps_polling() {
    init_logging();
    let state = started("j1", "acme");
    let (state, _) = update(state, Msg::PollTick);
    let before = state.clone();
    let (state, effects) = update(
        state,
        Msg::PollFailed {
            job_id: job("j1"),
            seq: 1,
            error: "connection refused".to_string(),
        },
    );
    assert!(effects.is_empty());
    assert_eq!(state.view(), before.view());
    assert!(!state.active().unwrap().awaiting_response);

    let (_state, effects) = update(state, Msg::PollTick);
    assert_eq!(
        effects,
        vec![Effect::FetchProgress {
            job_id: job("j1"),
            seq: 2
        }]
    );
}
