use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use super::fake::{Call, FakeBackend};
use super::*;

const A: &str = "/music/song-a.mp3";
const B: &str = "/music/song-b.mp3";
const BAD: &str = "/music/broken.mp3";

fn controller(backend: &FakeBackend) -> PlaybackController<FakeBackend> {
    PlaybackController::new(backend.clone())
}

/// Recorded calls without the position reads snapshots make.
fn transport(backend: &FakeBackend) -> Vec<Call> {
    backend
        .script
        .borrow()
        .calls
        .iter()
        .filter(|c| !matches!(c, Call::Read(_)))
        .cloned()
        .collect()
}

fn created(backend: &FakeBackend) -> usize {
    backend
        .script
        .borrow()
        .count(|c| matches!(c, Call::Created(_)))
}

#[test]
fn first_tap_creates_and_starts_a_resource() {
    let backend = FakeBackend::new();
    let mut c = controller(&backend);

    let snap = c.select_or_toggle(Path::new(A)).unwrap();

    assert!(snap.playing);
    assert_eq!(snap.current_path, Some(PathBuf::from(A)));
    assert_eq!(
        transport(&backend),
        vec![
            Call::Created(0),
            Call::SetSource(0, PathBuf::from(A)),
            Call::Prepared(0),
            Call::Started(0),
        ]
    );
}

#[test]
fn same_track_toggles_without_new_resource() {
    let backend = FakeBackend::new();
    let mut c = controller(&backend);

    let mut expected = true;
    for _ in 0..5 {
        let snap = c.select_or_toggle(Path::new(A)).unwrap();
        assert_eq!(snap.playing, expected);
        assert_eq!(c.is_playing(), expected);
        expected = !expected;
    }

    assert_eq!(created(&backend), 1);
    let s = backend.script.borrow();
    assert_eq!(s.count(|c| matches!(c, Call::Paused(0))), 2);
    assert_eq!(s.count(|c| matches!(c, Call::Resumed(0))), 2);
}

#[test]
fn switching_while_playing_releases_old_before_creating_new() {
    let backend = FakeBackend::new();
    let mut c = controller(&backend);

    c.select_or_toggle(Path::new(A)).unwrap();
    let snap = c.select_or_toggle(Path::new(B)).unwrap();

    assert!(snap.playing);
    assert_eq!(c.current_path(), Some(Path::new(B)));
    assert_eq!(
        transport(&backend)[4..],
        [
            Call::Released(0),
            Call::Created(1),
            Call::SetSource(1, PathBuf::from(B)),
            Call::Prepared(1),
            Call::Started(1),
        ]
    );
    assert_eq!(backend.script.borrow().count(|c| *c == Call::Released(0)), 1);
}

#[test]
fn switching_while_paused_starts_the_new_track() {
    let backend = FakeBackend::new();
    let mut c = controller(&backend);

    c.select_or_toggle(Path::new(A)).unwrap();
    c.select_or_toggle(Path::new(A)).unwrap();
    assert!(!c.is_playing());

    let snap = c.select_or_toggle(Path::new(B)).unwrap();
    assert!(snap.playing);
    assert_eq!(snap.current_path, Some(PathBuf::from(B)));
    assert_eq!(backend.script.borrow().alive(), 1);
}

#[test]
fn failed_first_load_leaves_controller_idle() {
    let backend = FakeBackend::new();
    backend.mark_unplayable(BAD);
    let mut c = controller(&backend);

    let err = c.select_or_toggle(Path::new(BAD)).unwrap_err();

    assert!(matches!(err, PlaybackError::Unavailable { ref path, .. } if path == Path::new(BAD)));
    assert!(!c.is_playing());
    assert!(!c.has_resource());
    assert_eq!(c.snapshot(), PlaybackSnapshot::default());
    let s = backend.script.borrow();
    assert_eq!(s.alive(), 0);
    assert!(s.calls.contains(&Call::Released(0)));
}

#[test]
fn failed_switch_releases_both_resources() {
    let backend = FakeBackend::new();
    backend.mark_unplayable(BAD);
    let mut c = controller(&backend);

    c.select_or_toggle(Path::new(A)).unwrap();
    assert!(c.select_or_toggle(Path::new(BAD)).is_err());

    assert!(!c.has_resource());
    assert!(!c.is_playing());
    assert_eq!(c.current_path(), None);
    let s = backend.script.borrow();
    assert_eq!(s.alive(), 0);
    assert!(s.calls.contains(&Call::Released(0)));
    assert!(s.calls.contains(&Call::Released(1)));
    assert!(!s.calls.contains(&Call::Started(1)));
}

#[test]
fn release_failure_does_not_block_switching() {
    let backend = FakeBackend::new();
    let mut c = controller(&backend);

    c.select_or_toggle(Path::new(A)).unwrap();
    backend.script.borrow_mut().fail_release = true;

    let snap = c.select_or_toggle(Path::new(B)).unwrap();
    assert!(snap.playing);
    assert_eq!(backend.script.borrow().alive(), 1);
}

#[test]
fn failed_start_releases_the_partial_resource() {
    let backend = FakeBackend::new();
    let mut c = controller(&backend);
    backend.break_next();

    let err = c.select_or_toggle(Path::new(A)).unwrap_err();

    assert!(matches!(err, PlaybackError::Unavailable { ref path, .. } if path == Path::new(A)));
    assert!(!c.has_resource());
    assert!(!c.is_playing());
    assert_eq!(
        transport(&backend),
        vec![
            Call::Created(0),
            Call::SetSource(0, PathBuf::from(A)),
            Call::Prepared(0),
            Call::Started(0),
            Call::Released(0),
        ]
    );
    assert_eq!(backend.script.borrow().alive(), 0);
}

#[test]
fn failed_pause_releases_and_goes_idle() {
    let backend = FakeBackend::new();
    let mut c = controller(&backend);
    c.select_or_toggle(Path::new(A)).unwrap();
    let rx = c.subscribe();
    backend.break_last();

    let err = c.select_or_toggle(Path::new(A)).unwrap_err();

    assert!(matches!(err, PlaybackError::Unavailable { ref path, .. } if path == Path::new(A)));
    assert!(!c.has_resource());
    assert!(!c.is_playing());
    let s = backend.script.borrow();
    assert_eq!(s.alive(), 0);
    assert_eq!(s.count(|c| matches!(c, Call::Released(_))), 1);
    assert!(s.calls.contains(&Call::Paused(0)));
    assert_eq!(rx.try_iter().last(), Some(PlaybackSnapshot::default()));
}

#[test]
fn failed_resume_releases_and_goes_idle() {
    let backend = FakeBackend::new();
    let mut c = controller(&backend);
    c.select_or_toggle(Path::new(A)).unwrap();
    c.select_or_toggle(Path::new(A)).unwrap();
    let rx = c.subscribe();
    backend.break_last();

    let err = c.select_or_toggle(Path::new(A)).unwrap_err();

    assert!(matches!(err, PlaybackError::Unavailable { .. }));
    assert!(!c.has_resource());
    assert!(!c.is_playing());
    let s = backend.script.borrow();
    assert_eq!(s.alive(), 0);
    assert_eq!(s.count(|c| matches!(c, Call::Released(_))), 1);
    assert!(s.calls.contains(&Call::Resumed(0)));
    assert_eq!(rx.try_iter().last(), Some(PlaybackSnapshot::default()));
}

#[test]
fn failed_seek_keeps_the_session() {
    let backend = FakeBackend::with_duration(Duration::from_secs(60));
    let mut c = controller(&backend);
    c.select_or_toggle(Path::new(A)).unwrap();
    let before = c.snapshot();
    let rx = c.subscribe();
    backend.script.borrow_mut().fail_seek = true;

    let err = c.seek_to(Duration::from_secs(30)).unwrap_err();

    assert!(matches!(err, PlaybackError::Seek(_)));
    assert!(c.has_resource());
    assert!(c.is_playing());
    assert_eq!(c.current_path(), Some(Path::new(A)));
    assert_eq!(c.snapshot(), before);
    // Only the snapshot handed out by subscribe; nothing published for the failure.
    assert_eq!(rx.try_iter().count(), 1);
    let s = backend.script.borrow();
    assert_eq!(s.alive(), 1);
    assert_eq!(s.count(|c| matches!(c, Call::Released(_))), 0);
}

#[derive(Clone, Copy, Debug)]
enum Action {
    Tap(&'static str),
    Button,
}

/// Reference model of the transition table: `(path, playing)` when loaded.
fn model_step(model: &mut Option<(&'static str, bool)>, action: Action) -> bool {
    match action {
        Action::Tap(p) if p == BAD => {
            *model = None;
            false
        }
        Action::Tap(p) => {
            *model = match *model {
                Some((q, playing)) if q == p => Some((p, !playing)),
                _ => Some((p, true)),
            };
            true
        }
        Action::Button => {
            if let Some((_, playing)) = model.as_mut() {
                *playing = !*playing;
            }
            true
        }
    }
}

fn sequences(len: usize) -> Vec<Vec<Action>> {
    let alphabet = [Action::Tap(A), Action::Tap(B), Action::Tap(BAD), Action::Button];
    let mut out = vec![Vec::new()];
    for _ in 0..len {
        out = out
            .into_iter()
            .flat_map(|seq| {
                alphabet.iter().map(move |a| {
                    let mut next = seq.clone();
                    next.push(*a);
                    next
                })
            })
            .collect();
    }
    out
}

#[test]
fn every_short_sequence_matches_the_transition_table() {
    for len in 1..=5 {
        for seq in sequences(len) {
            let backend = FakeBackend::new();
            backend.mark_unplayable(BAD);
            let mut c = controller(&backend);
            let mut model = None;

            for &action in &seq {
                let expect_ok = model_step(&mut model, action);
                let result = match action {
                    Action::Tap(p) => c.select_or_toggle(Path::new(p)),
                    Action::Button => c.toggle_current(),
                };

                assert_eq!(result.is_ok(), expect_ok, "{seq:?}");
                assert_eq!(
                    c.current_path().map(Path::to_path_buf),
                    model.map(|(p, _)| PathBuf::from(p)),
                    "{seq:?}"
                );
                assert_eq!(c.is_playing(), model.is_some_and(|(_, pl)| pl), "{seq:?}");

                let s = backend.script.borrow();
                assert!(s.alive() <= 1, "{seq:?}");
                assert_eq!(s.alive(), usize::from(c.has_resource()), "{seq:?}");
            }

            let s = backend.script.borrow();
            assert!(s.max_alive <= 1, "{seq:?}");
            assert!(s.reads_after_release().is_empty(), "{seq:?}");
        }
    }
}

#[test]
fn toggle_current_without_a_track_is_a_no_op() {
    let backend = FakeBackend::new();
    let mut c = controller(&backend);

    let snap = c.toggle_current().unwrap();
    assert_eq!(snap, PlaybackSnapshot::default());
    assert!(backend.script.borrow().calls.is_empty());
}

#[test]
fn seek_is_clamped_to_known_duration_and_ignored_when_idle() {
    let backend = FakeBackend::with_duration(Duration::from_secs(60));
    let mut c = controller(&backend);

    c.seek_to(Duration::from_secs(5)).unwrap();
    assert!(backend.script.borrow().calls.is_empty());

    c.select_or_toggle(Path::new(A)).unwrap();
    let snap = c.seek_to(Duration::from_secs(90)).unwrap();
    assert_eq!(snap.position, Duration::from_secs(60));
    assert!(
        backend
            .script
            .borrow()
            .calls
            .contains(&Call::Seek(0, Duration::from_secs(60)))
    );
}

#[test]
fn release_is_unconditional_and_idempotent() {
    let backend = FakeBackend::new();
    let mut c = controller(&backend);

    c.select_or_toggle(Path::new(A)).unwrap();
    c.select_or_toggle(Path::new(A)).unwrap();
    c.release();
    c.release();

    assert!(!c.has_resource());
    let s = backend.script.borrow();
    assert_eq!(s.alive(), 0);
    assert_eq!(s.count(|c| matches!(c, Call::Released(_))), 1);
}

#[test]
fn dropping_the_controller_releases_the_resource() {
    let backend = FakeBackend::new();
    {
        let mut c = controller(&backend);
        c.select_or_toggle(Path::new(A)).unwrap();
    }
    assert_eq!(backend.script.borrow().alive(), 0);
}

#[test]
fn subscribers_see_every_transition() {
    let backend = FakeBackend::new();
    let mut c = controller(&backend);
    let rx = c.subscribe();
    let dropped = c.subscribe();
    drop(dropped);

    c.select_or_toggle(Path::new(A)).unwrap();
    c.select_or_toggle(Path::new(A)).unwrap();
    c.release();

    let seen: Vec<PlaybackSnapshot> = rx.try_iter().collect();
    let flags: Vec<(bool, bool)> = seen
        .iter()
        .map(|s| (s.current_path.is_some(), s.playing))
        .collect();
    assert_eq!(
        flags,
        vec![(false, false), (true, true), (true, false), (false, false)]
    );
}

#[test]
fn failures_are_published_as_idle() {
    let backend = FakeBackend::new();
    backend.mark_unplayable(BAD);
    let mut c = controller(&backend);
    c.select_or_toggle(Path::new(A)).unwrap();
    let rx = c.subscribe();

    let _ = c.select_or_toggle(Path::new(BAD));

    let last = rx.try_iter().last().unwrap();
    assert_eq!(last, PlaybackSnapshot::default());
}

#[test]
fn poller_reads_only_while_playing_and_on_interval() {
    let backend = FakeBackend::with_duration(Duration::from_secs(180));
    let mut c = controller(&backend);
    let mut poller = ProgressPoller::new(Duration::from_millis(500));
    let t0 = Instant::now();

    assert!(poller.tick(t0, &mut c).is_none());
    assert!(!poller.is_armed());

    c.select_or_toggle(Path::new(A)).unwrap();
    poller.sync(c.is_playing(), t0);
    assert_eq!(poller.time_until_due(t0), Some(Duration::ZERO));

    let p = poller.tick(t0, &mut c).unwrap();
    assert_eq!(p.duration, Some(Duration::from_secs(180)));
    assert!(poller.tick(t0 + Duration::from_millis(100), &mut c).is_none());
    assert!(poller.tick(t0 + Duration::from_millis(500), &mut c).is_some());

    c.select_or_toggle(Path::new(A)).unwrap();
    let reads_before = backend.script.borrow().count(|c| matches!(c, Call::Read(_)));
    assert!(poller.tick(t0 + Duration::from_secs(2), &mut c).is_none());
    assert!(!poller.is_armed());
    let reads_after = backend.script.borrow().count(|c| matches!(c, Call::Read(_)));
    assert_eq!(reads_before, reads_after);
}

#[test]
fn poller_never_reads_a_released_resource_across_switches() {
    let backend = FakeBackend::new();
    let mut c = controller(&backend);
    let mut poller = ProgressPoller::new(Duration::from_millis(500));
    let mut now = Instant::now();

    for path in [A, B, A, B] {
        c.select_or_toggle(Path::new(path)).unwrap();
        poller.sync(c.is_playing(), now);
        for _ in 0..3 {
            now += Duration::from_millis(500);
            poller.tick(now, &mut c);
        }
    }
    c.select_or_toggle(Path::new(B)).unwrap();
    poller.sync(c.is_playing(), now);
    c.release();
    now += Duration::from_secs(1);
    assert!(poller.tick(now, &mut c).is_none());

    assert!(backend.script.borrow().reads_after_release().is_empty());
}

#[test]
fn finished_track_stops_polling_and_restarts_on_next_tap() {
    let backend = FakeBackend::new();
    let mut c = controller(&backend);
    let mut poller = ProgressPoller::new(Duration::from_millis(500));
    let t0 = Instant::now();

    c.select_or_toggle(Path::new(A)).unwrap();
    poller.sync(true, t0);
    backend.finish_last();

    assert!(poller.tick(t0, &mut c).is_some());
    assert!(!c.is_playing());
    assert!(!poller.is_armed());

    let snap = c.select_or_toggle(Path::new(A)).unwrap();
    assert!(snap.playing);
    assert_eq!(created(&backend), 2);
    assert!(backend.script.borrow().calls.contains(&Call::Released(0)));
}

#[test]
fn tap_pause_switch_toggle_then_scrub_issues_one_seek() {
    let backend = FakeBackend::with_duration(Duration::from_secs(180));
    let mut c = controller(&backend);

    let snap = c.select_or_toggle(Path::new(A)).unwrap();
    assert!(snap.playing);
    assert_eq!(snap.current_path, Some(PathBuf::from(A)));

    let snap = c.select_or_toggle(Path::new(A)).unwrap();
    assert!(!snap.playing);
    assert_eq!(created(&backend), 1);

    let snap = c.select_or_toggle(Path::new(B)).unwrap();
    assert!(snap.playing);
    assert!(backend.script.borrow().calls.contains(&Call::Released(0)));
    assert_eq!(created(&backend), 2);

    let snap = c.toggle_current().unwrap();
    assert!(!snap.playing);

    let mut scrub = ScrubGesture::default();
    scrub.begin(Duration::from_millis(10_000));
    scrub.drag_to(Duration::from_millis(20_000));
    scrub.drag_to(Duration::from_millis(30_000));
    assert_eq!(
        backend.script.borrow().count(|c| matches!(c, Call::Seek(..))),
        0
    );

    if let Some(target) = scrub.release() {
        c.seek_to(target).unwrap();
    }

    let s = backend.script.borrow();
    let seeks: Vec<&Call> = s.calls.iter().filter(|c| matches!(c, Call::Seek(..))).collect();
    assert_eq!(seeks, vec![&Call::Seek(1, Duration::from_millis(30_000))]);
}
