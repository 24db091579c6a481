use std::time::Duration;

use cue_editor::{
    ActiveCue, CueData, CueId, EditError, EditorSession, ManualClock, SessionEvent, TimingField,
    config::{Config, EditorCfg},
    replay::{Script, replay_script},
};

fn session_with(cues: &[(f64, f64, &str)]) -> EditorSession<ManualClock> {
    let mut s = EditorSession::new(&EditorCfg::default(), ManualClock::new());
    s.load(
        cues.iter()
            .map(|(start, end, text)| CueData::new(*start, *end, *text))
            .collect(),
    );
    s
}

fn abc() -> EditorSession<ManualClock> {
    session_with(&[(0.0, 2.0, "a"), (3.0, 5.0, "b"), (6.0, 8.0, "c")])
}

fn id_at(s: &EditorSession<ManualClock>, index: usize) -> CueId {
    s.store().list()[index].id
}

fn commits(events: &[SessionEvent]) -> Vec<(CueId, String)> {
    events
        .iter()
        .filter_map(|e| match e {
            SessionEvent::TextCommitted { cue, text } => Some((*cue, text.clone())),
            _ => None,
        })
        .collect()
}

fn scroll_count(events: &[SessionEvent]) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, SessionEvent::Scroll(_)))
        .count()
}

#[test]
fn duration_edit_overlaps_without_reordering() {
    let mut s = abc();
    let b = id_at(&s, 1);

    let edited = s.edit_timing(b, TimingField::Duration, "4").unwrap();
    assert_eq!(edited.data(), CueData::new(3.0, 7.0, "b"));

    let texts: Vec<String> = s.export().into_iter().map(|c| c.text).collect();
    assert_eq!(texts, ["a", "b", "c"]);
    assert_eq!(s.export()[1], CueData::new(3.0, 7.0, "b"));
}

#[test]
fn start_edit_preserves_duration_end_edit_preserves_start() {
    let mut s = abc();
    let c = id_at(&s, 2);

    let moved = s.edit_timing(c, TimingField::Start, "1.5").unwrap();
    assert_eq!((moved.start_ms, moved.end_ms), (1_500, 3_500));
    assert_eq!(s.store().position(c), Some(1), "re-sorted under its id");

    let stretched = s.edit_timing(c, TimingField::End, "00:00:09").unwrap();
    assert_eq!((stretched.start_ms, stretched.end_ms), (1_500, 9_000));
}

#[test]
fn keystroke_burst_produces_one_store_update() {
    let mut s = abc();
    let a = id_at(&s, 0);
    let rev = s.store().revision();

    for text in ["H", "He", "Hel", "Hell", "Hello"] {
        s.type_text(a, text).unwrap();
        s.clock().advance(Duration::from_millis(100));
        s.poll();
    }
    assert_eq!(s.store().revision(), rev, "nothing committed while typing");

    s.clock().advance(Duration::from_millis(400));
    s.poll();
    s.clock().advance(Duration::from_secs(5));
    s.poll();

    assert_eq!(s.store().revision(), rev + 1);
    assert_eq!(commits(&s.drain_events()), [(a, "Hello".to_string())]);
    assert_eq!(s.store().get(a).unwrap().text, "Hello");
}

#[test]
fn swap_commits_pending_text_first() {
    let mut s = abc();
    let a = id_at(&s, 0);
    let b = id_at(&s, 1);

    s.type_text(a, "alpha").unwrap();
    s.swap_to(b);

    assert_eq!(s.store().get(a).unwrap().text, "alpha");
    assert_eq!(commits(&s.drain_events()), [(a, "alpha".to_string())]);

    s.clock().advance(Duration::from_secs(1));
    s.poll();
    assert!(s.drain_events().is_empty(), "timer was cancelled by the flush");
}

#[test]
fn typing_into_another_cue_commits_the_first() {
    let mut s = abc();
    let a = id_at(&s, 0);
    let c = id_at(&s, 2);

    s.type_text(a, "one").unwrap();
    s.type_text(c, "three").unwrap();
    assert_eq!(s.store().get(a).unwrap().text, "one");
    assert_eq!(s.store().get(c).unwrap().text, "c");

    s.blur();
    assert_eq!(s.store().get(c).unwrap().text, "three");
}

#[test]
fn deleting_a_cue_mid_edit_reports_a_stale_commit() {
    let mut s = abc();
    let b = id_at(&s, 1);

    s.type_text(b, "never lands").unwrap();
    assert!(s.delete_cue(b).unwrap());

    let events = s.drain_events();
    assert!(matches!(
        events.as_slice(),
        [SessionEvent::CommitRejected { cue, .. }] if *cue == b
    ));
    assert_eq!(s.store().len(), 2);

    assert_eq!(
        s.edit_timing(b, TimingField::Start, "1").unwrap_err(),
        EditError::StaleCue(b)
    );
    assert!(!s.delete_cue(b).unwrap());

    let a = id_at(&s, 0);
    s.type_text(a, "still editing").unwrap();
    s.blur();
    assert_eq!(s.store().get(a).unwrap().text, "still editing");
}

#[test]
fn active_cue_follows_playback() {
    let mut s = session_with(&[(0.0, 1.0, "x"), (5.0, 6.0, "y"), (12.0, 13.0, "z")]);

    s.on_playback_time(-1.0);
    assert_eq!(s.active(), ActiveCue::NoActiveCue);

    s.on_playback_time(7.0);
    assert_eq!(s.active().id(), Some(id_at(&s, 1)));

    s.on_playback_time(12.0);
    assert_eq!(s.active().index(), Some(2));

    let rows = s.rows();
    assert!(rows[2].is_active && !rows[1].is_active);
}

#[test]
fn repeated_position_scrolls_at_most_once() {
    let mut s = abc();
    s.on_playback_time(4.0);
    s.on_playback_time(4.0);
    s.on_playback_time(4.2);
    assert_eq!(scroll_count(&s.drain_events()), 1);
}

#[test]
fn manual_scroll_holds_auto_scroll_for_the_cooldown() {
    let mut s = abc();
    s.on_playback_time(0.5);
    s.drain_events();

    s.on_user_scroll();
    s.on_playback_time(3.5);
    s.on_playback_time(6.5);
    assert_eq!(scroll_count(&s.drain_events()), 0);

    s.clock().advance(Duration::from_millis(1_499));
    s.poll();
    assert_eq!(scroll_count(&s.drain_events()), 0);

    s.clock().advance(Duration::from_millis(1));
    s.poll();
    let events = s.drain_events();
    assert!(matches!(
        events.as_slice(),
        [SessionEvent::Scroll(cmd)] if cmd.index == 2
    ));
}

#[test]
fn reload_flushes_pending_edit_into_outgoing_track() {
    let mut s = abc();
    let a = id_at(&s, 0);
    s.type_text(a, "kept").unwrap();

    s.load(vec![CueData::new(1.0, 2.0, "fresh")]);
    assert_eq!(commits(&s.drain_events()), [(a, "kept".to_string())]);
    assert_eq!(s.export(), [CueData::new(1.0, 2.0, "fresh")]);
}

#[test]
fn demo_script_replays_deterministically() {
    let script: Script =
        serde_json::from_str(include_str!("../demos/retime_and_type.json")).unwrap();
    let report = replay_script(script, &Config::default()).unwrap();

    assert_eq!(report.loaded, 3);
    assert_eq!(
        report.cues,
        [
            CueData::new(0.0, 2.0, "a"),
            CueData::new(3.0, 7.0, "b"),
            CueData::new(6.0, 8.0, "see"),
        ]
    );

    let steps: Vec<usize> = report.events.iter().map(|e| e.step).collect();
    assert_eq!(steps, [0, 1, 8, 11]);
    assert!(matches!(
        &report.events[3].event,
        SessionEvent::Scroll(cmd) if cmd.index == 2
    ));

    assert_eq!(report.rejected_steps.len(), 1);
    assert_eq!(report.rejected_steps[0].step, 4);
    assert_eq!(report.rejected_steps[0].op, "edit_timing");

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["schema"], "cuedit.replay");
    assert_eq!(json["events"][2]["event"], "text_committed");
}
