//! Integration test: load song fixture → render frames → verify output and
//! transport.

use dt_engine::tempo_to_interval;
use dt_master::{Controller, Frame};
use std::path::PathBuf;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
}

fn load_beat() -> Controller {
    let mut ctl = Controller::new();
    ctl.load_song(fixture("beat.dt42")).unwrap();
    ctl
}

fn has_nonsilent_frames(frames: &[Frame]) -> bool {
    frames.iter().any(|f| f.left != 0 || f.right != 0)
}

/// Frames after which the `steps`-th tick (counting from 0) has just fired.
fn after_ticks(steps: usize, interval: u32) -> usize {
    steps * interval as usize + 1
}

#[test]
fn beat_loads_tags_and_tracks() {
    let ctl = load_beat();
    assert_eq!(ctl.tag("TITLE"), Some("Fixture Beat"));
    assert_eq!(ctl.tag("AUTHOR"), Some("Test"));
    assert_eq!(ctl.song_length(), 16);
    assert_eq!(ctl.track_steps(1).as_deref(), Some("....9.......9..."));
}

#[test]
fn beat_renders_nonsilent() {
    let mut ctl = load_beat();
    let frames = ctl.render_frames(44100);
    assert!(has_nonsilent_frames(&frames), "Expected non-silent output from beat.dt42");
}

#[test]
fn tempo_command_sets_step_length() {
    let mut ctl = load_beat();
    ctl.render_frames(1);
    assert!((ctl.tempo() - 100.0).abs() < 0.1, "tempo {}", ctl.tempo());
    assert_eq!(ctl.engine().with(|e| e.interval()), tempo_to_interval(100.0));
}

#[test]
fn position_follows_rendered_time() {
    let mut ctl = load_beat();
    let interval = tempo_to_interval(100.0);
    ctl.render_frames(after_ticks(5, interval));
    assert_eq!(ctl.position(), 5);
    ctl.render_frames(interval as usize * 3);
    assert_eq!(ctl.position(), 8);
}

#[test]
fn song_wraps_to_start() {
    let mut ctl = load_beat();
    ctl.set_loop(0, 16);
    let interval = tempo_to_interval(100.0);
    ctl.render_frames(after_ticks(15, interval));
    assert_eq!(ctl.position(), 15);
    ctl.render_frames(interval as usize);
    assert_eq!(ctl.position(), 0);
    // Passing step 0 restores the default tempo before T100 applies again
    assert!((ctl.tempo() - 100.0).abs() < 0.1);
}

#[test]
fn jump_command_loops_a_phrase() {
    let mut ctl = Controller::new();
    ctl.load_synth(0, "fm2 36 0 4").unwrap();
    ctl.add(0, "9..J001");
    let interval = tempo_to_interval(120.0);
    let mut seen = Vec::new();
    for _ in 0..12 {
        ctl.render_frames(interval as usize);
        seen.push(ctl.position());
    }
    // The jump target plays in the same tick as the jump
    assert_eq!(&seen[..8], &[0, 1, 2, 3, 2, 3, 2, 3]);
    assert!(seen.iter().all(|&p| p <= 3));
}

#[test]
fn loop_window_confines_playback() {
    let mut ctl = load_beat();
    ctl.set_loop(4, 8);
    let interval = tempo_to_interval(100.0);
    ctl.render_frames(after_ticks(7, interval));
    assert_eq!(ctl.position(), 7);
    for expected in [4, 5, 6, 7, 4] {
        ctl.render_frames(interval as usize);
        assert_eq!(ctl.position(), expected);
    }
}

#[test]
fn muted_tracks_are_silent_but_keep_commands() {
    let mut ctl = load_beat();
    for track in 0..4 {
        ctl.mute(track, true);
    }
    let frames = ctl.render_frames(44100);
    assert!(!has_nonsilent_frames(&frames));
    assert!((ctl.tempo() - 100.0).abs() < 0.1);
}

#[test]
fn paused_song_holds_position() {
    let mut ctl = load_beat();
    let interval = tempo_to_interval(100.0);
    let next = |ctl: &Controller| ctl.engine().with(|e| e.next_position());
    ctl.render_frames(after_ticks(3, interval));
    assert_eq!(next(&ctl), 4);
    ctl.pause(true);
    ctl.render_frames(interval as usize * 4);
    assert_eq!(next(&ctl), 4);
    ctl.pause(false);
    ctl.render_frames(interval as usize);
    assert_eq!(ctl.position(), 4);
    assert_eq!(next(&ctl), 5);
}

#[test]
fn saved_song_renders_identically() {
    let dir = std::env::temp_dir().join(format!("drumtoy-playback-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("copy.dt42");

    let mut original = load_beat();
    original.save_song(&path).unwrap();

    let mut copy = Controller::new();
    copy.load_song(&path).unwrap();
    assert_eq!(copy.tags(), original.tags());

    let a = original.render_frames(30000);
    let b = copy.render_frames(30000);
    assert!(a == b, "reloaded song renders differently");
}
