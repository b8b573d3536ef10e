mod common;

use common::{mount, run_for, session, RecordingHost};
use timely_lib::{
    error::SessionConfigError,
    models::SessionState,
    timer::{
        shortcuts::{self, Key, KeyPress, ShortcutAction},
        view::ActivityPhaseView,
        ActivityEngine, CompletionReason,
    },
    utils::time::format_time,
};

#[test]
fn ticks_do_not_double_count() {
    let mut host = RecordingHost::new(session(60, &[("a", 30), ("b", 30)]));
    let (mut engine, clock, _ticker) = mount(&mut host);

    engine.start(&mut host);
    run_for(&mut engine, &mut host, &clock, 5);

    assert_eq!(host.time_spent("a"), 5_000);
    assert_eq!(engine.session_elapsed_ms(&host.state), 5_000);
    assert_eq!(engine.time_elapsed(), 5);
}

#[test]
fn late_ticks_still_count_wall_time() {
    let mut host = RecordingHost::new(session(60, &[("a", 30)]));
    let (mut engine, clock, _ticker) = mount(&mut host);

    engine.start(&mut host);
    clock.advance_secs(7);
    engine.tick(&mut host);

    assert_eq!(host.time_spent("a"), 7_000);
}

#[test]
fn switching_keeps_time_from_earlier_runs() {
    let mut host = RecordingHost::new(session(60, &[("a", 30), ("b", 30)]));
    let (mut engine, clock, ticker) = mount(&mut host);

    engine.start(&mut host);
    run_for(&mut engine, &mut host, &clock, 10);
    engine.switch_to(&mut host, "b");
    run_for(&mut engine, &mut host, &clock, 5);
    engine.switch_to(&mut host, "a");
    run_for(&mut engine, &mut host, &clock, 3);

    assert_eq!(host.time_spent("a"), 13_000);
    assert_eq!(host.time_spent("b"), 5_000);
    assert!(engine.is_ticker_live());
    assert_eq!(engine.session_elapsed_ms(&host.state), 18_000);
    assert_eq!(host.state.active_activity_id.as_deref(), Some("a"));
    assert_eq!(host.state.selected_activity_id.as_deref(), Some("a"));
    assert_eq!(ticker.live(), 1);
}

#[test]
fn switching_flushes_time_not_yet_ticked() {
    let mut host = RecordingHost::new(session(60, &[("a", 30), ("b", 30)]));
    let (mut engine, clock, _ticker) = mount(&mut host);

    engine.start(&mut host);
    clock.advance_ms(4_500);
    engine.switch_to(&mut host, "b");

    assert_eq!(host.time_spent("a"), 4_500);
    assert_eq!(engine.current_activity_id(), Some("b"));
}

#[test]
fn switch_ignores_current_and_completed_targets() {
    let mut host = RecordingHost::new(session(60, &[("a", 30), ("b", 30), ("c", 30)]));
    let (mut engine, clock, _ticker) = mount(&mut host);

    engine.select(&mut host, "b");
    engine.start(&mut host);
    run_for(&mut engine, &mut host, &clock, 2);
    engine.complete(&mut host);

    engine.start(&mut host);
    assert_eq!(engine.current_activity_id(), Some("a"));
    let changes = host.changes.len();

    engine.switch_to(&mut host, "a");
    engine.switch_to(&mut host, "b");
    engine.switch_to(&mut host, "missing");

    assert_eq!(host.changes.len(), changes);
    assert_eq!(engine.current_activity_id(), Some("a"));
}

#[test]
fn start_is_idempotent_while_running() {
    let mut host = RecordingHost::new(session(60, &[("a", 30)]));
    let (mut engine, clock, ticker) = mount(&mut host);

    engine.start(&mut host);
    clock.advance_secs(1);
    engine.start(&mut host);
    clock.advance_secs(1);
    engine.tick(&mut host);

    assert_eq!(ticker.live(), 1);
    assert_eq!(ticker.total_acquired(), 1);
    assert!(engine.is_ticker_live());
    assert_eq!(host.time_spent("a"), 2_000);
}

#[test]
fn start_on_another_selection_flushes_the_running_activity() {
    let mut host = RecordingHost::new(session(60, &[("a", 30), ("b", 30)]));
    let (mut engine, clock, ticker) = mount(&mut host);

    engine.start(&mut host);
    clock.advance_secs(4);
    engine.select(&mut host, "b");
    engine.start(&mut host);

    assert_eq!(host.time_spent("a"), 4_000);
    assert_eq!(engine.current_activity_id(), Some("b"));
    assert_eq!(ticker.live(), 1);
}

#[test]
fn start_without_selection_takes_first_open_activity() {
    let mut host = RecordingHost::new(session(60, &[("a", 30), ("b", 30)]));
    let (mut engine, _clock, _ticker) = mount(&mut host);

    assert_eq!(engine.effective_selection(&host.state).as_deref(), Some("a"));
    engine.start(&mut host);
    assert_eq!(engine.current_activity_id(), Some("a"));
}

#[test]
fn select_unknown_activity_is_ignored() {
    let mut host = RecordingHost::new(session(60, &[("a", 30)]));
    let (mut engine, _clock, _ticker) = mount(&mut host);

    engine.select(&mut host, "nope");
    assert!(host.changes.is_empty());
}

#[test]
fn pause_and_resume_carry_elapsed_time() {
    let mut host = RecordingHost::new(session(60, &[("a", 30)]));
    let (mut engine, clock, ticker) = mount(&mut host);

    engine.start(&mut host);
    run_for(&mut engine, &mut host, &clock, 3);
    engine.pause(&mut host);
    assert_eq!(ticker.live(), 0);
    assert!(!engine.is_ticker_live());
    assert_eq!(host.state.active_activity_id, None);
    assert_eq!(host.time_spent("a"), 3_000);

    // Time while paused does not count.
    clock.advance_secs(30);
    engine.tick(&mut host);
    assert_eq!(host.time_spent("a"), 3_000);

    engine.resume(&mut host);
    assert_eq!(ticker.live(), 1);
    assert!(engine.is_ticker_live());
    assert_eq!(host.state.active_activity_id.as_deref(), Some("a"));
    run_for(&mut engine, &mut host, &clock, 2);

    assert_eq!(host.time_spent("a"), 5_000);
    assert_eq!(engine.time_elapsed(), 5);
}

#[test]
fn pause_cycles_keep_sub_second_time() {
    let mut host = RecordingHost::new(session(60, &[("a", 30)]));
    let (mut engine, clock, _ticker) = mount(&mut host);

    engine.start(&mut host);
    for _ in 0..4 {
        clock.advance_ms(1_500);
        engine.pause(&mut host);
        clock.advance_secs(3);
        engine.resume(&mut host);
    }
    engine.pause(&mut host);

    assert_eq!(host.time_spent("a"), 6_000);
    assert_eq!(engine.session_elapsed_ms(&host.state), 6_000);
    assert_eq!(engine.time_elapsed(), 6);
}

#[test]
fn pause_and_resume_are_no_ops_in_the_wrong_state() {
    let mut host = RecordingHost::new(session(60, &[("a", 30)]));
    let (mut engine, _clock, _ticker) = mount(&mut host);

    engine.pause(&mut host);
    engine.resume(&mut host);
    engine.complete(&mut host);
    assert!(host.changes.is_empty());
}

#[test]
fn completing_every_activity_finishes_once() {
    let mut host = RecordingHost::new(session(60, &[("a", 5), ("b", 5), ("c", 5)]));
    let (mut engine, clock, ticker) = mount(&mut host);

    for expected in ["a", "b", "c"] {
        assert!(host.completions.is_empty());
        engine.start(&mut host);
        assert_eq!(engine.current_activity_id(), Some(expected));
        run_for(&mut engine, &mut host, &clock, 2);
        engine.complete(&mut host);
    }

    assert_eq!(host.completions.len(), 1);
    assert_eq!(
        engine.completion(),
        Some(CompletionReason::AllActivitiesCompleted)
    );
    let final_state = &host.completions[0];
    assert!(final_state.all_completed());
    assert_eq!(final_state.active_activity_id, None);
    assert_eq!(final_state.total_time_spent_ms(), 6_000);
    assert_eq!(ticker.live(), 0);

    // Everything after completion is inert.
    let changes = host.changes.len();
    engine.start(&mut host);
    engine.tick(&mut host);
    engine.complete(&mut host);
    assert_eq!(host.changes.len(), changes);
    assert_eq!(host.completions.len(), 1);
}

#[test]
fn complete_records_end_time_and_clears_selection() {
    let mut host = RecordingHost::new(session(60, &[("a", 5), ("b", 5)]));
    let (mut engine, clock, _ticker) = mount(&mut host);

    engine.start(&mut host);
    run_for(&mut engine, &mut host, &clock, 4);
    engine.complete(&mut host);

    let progress = host.state.progress("a").expect("progress for a");
    assert!(progress.completed);
    assert_eq!(progress.time_spent, 4_000);
    assert!(progress.start_time.is_some());
    assert!(progress.end_time.is_some());
    assert_eq!(host.state.selected_activity_id, None);
    assert_eq!(engine.current_activity_id(), None);
    assert_eq!(engine.effective_selection(&host.state).as_deref(), Some("b"));
}

#[test]
fn completing_a_paused_activity_keeps_its_time() {
    let mut host = RecordingHost::new(session(60, &[("a", 5), ("b", 5)]));
    let (mut engine, clock, _ticker) = mount(&mut host);

    engine.start(&mut host);
    run_for(&mut engine, &mut host, &clock, 3);
    engine.pause(&mut host);
    clock.advance_secs(20);
    engine.complete(&mut host);

    assert!(host.state.is_completed("a"));
    assert_eq!(host.time_spent("a"), 3_000);
}

#[test]
fn budget_expiry_finishes_with_open_activities() {
    let mut host = RecordingHost::new(session(1, &[("a", 30), ("b", 30)]));
    let (mut engine, clock, ticker) = mount(&mut host);

    engine.start(&mut host);
    run_for(&mut engine, &mut host, &clock, 59);
    assert!(host.completions.is_empty());

    run_for(&mut engine, &mut host, &clock, 1);
    assert_eq!(host.completions.len(), 1);
    assert_eq!(engine.completion(), Some(CompletionReason::DurationElapsed));

    let final_state = &host.completions[0];
    assert_eq!(final_state.time_spent_ms("a"), 60_000);
    assert!(!final_state.is_completed("a"));
    assert!(!final_state.is_completed("b"));
    assert_eq!(final_state.active_activity_id, None);
    assert_eq!(ticker.live(), 0);
    assert!(!engine.is_ticker_live());

    run_for(&mut engine, &mut host, &clock, 5);
    assert_eq!(host.completions.len(), 1);
}

#[test]
fn mounting_an_overrun_session_completes_immediately() {
    let mut state = session(1, &[("a", 30)]);
    state.progress_entry("a").time_spent = 90_000;
    let mut host = RecordingHost::new(state);
    let (engine, _clock, ticker) = mount(&mut host);

    assert_eq!(engine.completion(), Some(CompletionReason::DurationElapsed));
    assert_eq!(host.completions.len(), 1);
    assert_eq!(ticker.live(), 0);
}

#[test]
fn quarter_hour_on_an_hour_budget() {
    let mut host = RecordingHost::new(session(60, &[("focus", 15)]));
    let (mut engine, clock, _ticker) = mount(&mut host);

    engine.start(&mut host);
    run_for(&mut engine, &mut host, &clock, 900);

    assert_eq!(host.time_spent("focus"), 900_000);
    assert_eq!(engine.activity_progress(&host.state, "focus"), 100.0);
    assert_eq!(engine.session_progress(&host.state), 25.0);
    assert_eq!(engine.remaining_secs(&host.state), Some(2_700));

    engine.complete(&mut host);
    assert_eq!(host.completions.len(), 1);
    assert_eq!(host.completions[0].time_spent_ms("focus"), 900_000);
}

#[test]
fn deadline_sessions_have_no_budget() {
    let mut state = session(60, &[("a", 30)]);
    state.time_config = Some(timely_lib::models::TimeConfig::deadline(
        chrono::Utc::now() + chrono::Duration::hours(1),
    ));
    let mut host = RecordingHost::new(state);
    let (mut engine, clock, _ticker) = mount(&mut host);

    engine.start(&mut host);
    run_for(&mut engine, &mut host, &clock, 120);

    assert_eq!(engine.remaining_secs(&host.state), None);
    assert_eq!(engine.session_progress(&host.state), 0.0);
    assert!(host.completions.is_empty());
}

#[test]
fn overrun_remaining_time_renders_as_zero() {
    assert_eq!(format_time(-5), "0:00");
    assert_eq!(format_time(3_725), "1:02:05");
}

#[test]
fn validation_reports_the_first_missing_piece() {
    let clock = common::clock();
    let mount_err = |state: SessionState| {
        let mut host = RecordingHost::new(state);
        ActivityEngine::mount(
            &mut host,
            Box::new(clock.clone()),
            Box::new(timely_lib::timer::ManualTicker::new()),
        )
        .err()
    };

    assert_eq!(
        mount_err(SessionState::new()),
        Some(SessionConfigError::MissingTimeConfig)
    );

    let mut no_activities = session(60, &[]);
    no_activities.session_start_time = None;
    assert_eq!(mount_err(no_activities), Some(SessionConfigError::NoActivities));

    let mut no_start = session(60, &[("a", 5)]);
    no_start.session_start_time = None;
    assert_eq!(mount_err(no_start), Some(SessionConfigError::MissingStartTime));

    assert_eq!(mount_err(session(60, &[("a", 5)])), None);
}

#[test]
fn mount_adopts_an_active_activity() {
    let mut state = session(60, &[("a", 30), ("b", 30)]);
    state.progress_entry("b").time_spent = 10_000;
    state.active_activity_id = Some("b".to_string());
    let mut host = RecordingHost::new(state);
    let (mut engine, clock, ticker) = mount(&mut host);

    assert!(engine.is_active());
    assert_eq!(engine.current_activity_id(), Some("b"));
    assert_eq!(ticker.live(), 1);

    run_for(&mut engine, &mut host, &clock, 2);
    assert_eq!(host.time_spent("b"), 12_000);
}

#[test]
fn rehydrate_follows_an_external_switch() {
    let mut host = RecordingHost::new(session(60, &[("a", 30), ("b", 30)]));
    let (mut engine, clock, ticker) = mount(&mut host);

    engine.start(&mut host);
    run_for(&mut engine, &mut host, &clock, 3);

    host.state.active_activity_id = Some("b".to_string());
    engine.rehydrate(&mut host);

    assert_eq!(engine.current_activity_id(), Some("b"));
    assert_eq!(host.time_spent("a"), 3_000);
    assert_eq!(ticker.live(), 1);

    // A second call with nothing new changes nothing.
    let changes = host.changes.len();
    engine.rehydrate(&mut host);
    assert_eq!(host.changes.len(), changes);
}

#[test]
fn rehydrate_resumes_the_paused_activity() {
    let mut host = RecordingHost::new(session(60, &[("a", 30)]));
    let (mut engine, clock, ticker) = mount(&mut host);

    engine.start(&mut host);
    run_for(&mut engine, &mut host, &clock, 2);
    engine.pause(&mut host);

    host.state.active_activity_id = Some("a".to_string());
    engine.rehydrate(&mut host);

    assert!(engine.is_active());
    assert_eq!(ticker.live(), 1);
    run_for(&mut engine, &mut host, &clock, 1);
    assert_eq!(host.time_spent("a"), 3_000);
}

#[test]
fn teardown_releases_the_ticker() {
    let mut host = RecordingHost::new(session(60, &[("a", 30)]));
    let (mut engine, _clock, ticker) = mount(&mut host);

    engine.start(&mut host);
    assert_eq!(ticker.live(), 1);
    engine.teardown();
    engine.teardown();
    assert_eq!(ticker.live(), 0);
    assert!(!engine.is_ticker_live());

    engine.resume(&mut host);
    drop(engine);
    assert_eq!(ticker.live(), 0);
}

#[test]
fn dropping_a_running_engine_releases_the_ticker() {
    let mut host = RecordingHost::new(session(60, &[("a", 30)]));
    let (mut engine, _clock, ticker) = mount(&mut host);

    engine.start(&mut host);
    drop(engine);
    assert_eq!(ticker.live(), 0);
}

#[test]
fn shortcuts_drive_the_timer() {
    let mut host = RecordingHost::new(session(60, &[("a", 30), ("b", 30)]));
    let (mut engine, clock, _ticker) = mount(&mut host);
    let space = KeyPress::ctrl(Key::Space);
    let enter = KeyPress::meta(Key::Enter);

    let bare_space = KeyPress {
        key: Key::Space,
        ctrl: false,
        meta: false,
    };
    assert_eq!(shortcuts::resolve(&engine, &host, bare_space), None);

    assert_eq!(
        shortcuts::dispatch(&mut engine, &mut host, space),
        Some(ShortcutAction::Start)
    );
    run_for(&mut engine, &mut host, &clock, 2);
    assert_eq!(
        shortcuts::dispatch(&mut engine, &mut host, space),
        Some(ShortcutAction::Pause)
    );
    assert_eq!(
        shortcuts::dispatch(&mut engine, &mut host, space),
        Some(ShortcutAction::Resume)
    );
    assert_eq!(
        shortcuts::dispatch(&mut engine, &mut host, enter),
        Some(ShortcutAction::Complete)
    );

    assert!(host.state.is_completed("a"));
    assert_eq!(
        shortcuts::resolve(&engine, &host, enter),
        Some(ShortcutAction::Start)
    );
}

#[test]
fn view_controls_follow_timer_state() {
    let mut host = RecordingHost::new(session(60, &[("a", 30), ("b", 30)]));
    let (mut engine, clock, _ticker) = mount(&mut host);

    let idle = ActivityPhaseView::build(&engine, &host.state);
    assert!(idle.controls.start);
    assert!(!idle.controls.pause && !idle.controls.resume && !idle.controls.complete);
    assert_eq!(idle.session.remaining.as_deref(), Some("1:00:00"));

    engine.start(&mut host);
    run_for(&mut engine, &mut host, &clock, 65);
    let running = ActivityPhaseView::build(&engine, &host.state);
    assert!(!running.controls.start);
    assert!(running.controls.pause && running.controls.complete);
    assert_eq!(running.current.as_ref().map(|c| c.elapsed.as_str()), Some("1:05"));
    assert_eq!(running.switch_targets.len(), 1);
    assert_eq!(running.switch_targets[0].id, "b");

    engine.pause(&mut host);
    let paused = ActivityPhaseView::build(&engine, &host.state);
    assert!(paused.controls.resume && paused.controls.complete);
    assert!(!paused.controls.pause);
    assert!(paused.to_string().contains("(paused)"));
}
