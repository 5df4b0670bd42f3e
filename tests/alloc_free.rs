//! Allocation-free render path tests.
//!
//! These tests verify that `Engine::render()` does not allocate once a song
//! is loaded. They run busy patterns for several seconds to catch
//! allocations triggered by tempo changes, jumps, loops or voice tails.
//!
//! Just run `cargo test`; no feature flags needed.

use assert_no_alloc::{assert_no_alloc, AllocDisabler};

#[cfg(debug_assertions)]
#[global_allocator]
static A: AllocDisabler = AllocDisabler;

use dt_engine::{Engine, Frame};
use dt_ir::{Pcm, LoopWindow, SAMPLE_RATE};

fn drum_kit() -> Engine {
    let mut engine = Engine::new();
    let hit: Vec<i16> = (0..2000).map(|i| ((i * 37) % 20000 - 10000) as i16).collect();
    let pcm = Pcm::mono16(&hit, SAMPLE_RATE);
    for slot in 0..4 {
        engine.load_sample(slot, "hit", &pcm).unwrap();
    }
    for slot in 4..8 {
        engine
            .load_synth(slot, &format!("fm2 {} 0.5 {}", 36 + slot * 3, slot))
            .unwrap();
    }
    engine
}

/// Render `engine` for `frames` frames in device-sized blocks, aborting on
/// any heap allocation.
fn assert_render_alloc_free(mut engine: Engine, frames: usize) {
    let mut block = vec![Frame::silence(); 512];
    assert_no_alloc(|| {
        for _ in 0..frames / block.len() {
            engine.render(&mut block);
        }
    });
}

#[test]
fn plain_pattern_alloc_free() {
    let mut engine = drum_kit();
    for track in 0..8 {
        engine.add(track, b"9...5...7.3.9..1");
    }
    assert_render_alloc_free(engine, SAMPLE_RATE as usize * 5);
}

#[test]
fn commands_alloc_free() {
    let mut engine = drum_kit();
    engine.add(0, b"T1409.V55.9.D3C9.J000");
    engine.add(1, b"..9.Q.5.V09M.9..");
    engine.add(4, b"9.......Z.9...R.");
    engine.add(5, b"T0809...T2009...");
    assert_render_alloc_free(engine, SAMPLE_RATE as usize * 5);
}

#[test]
fn looped_and_paused_alloc_free() {
    let mut engine = drum_kit();
    for track in 0..8 {
        engine.add(track, b"9.9.9.9.5.5.5.5.");
    }
    engine.set_loop(LoopWindow::new(4, 12));
    assert_render_alloc_free(engine, SAMPLE_RATE as usize * 3);

    let mut engine = drum_kit();
    engine.add(0, b"9999");
    engine.pause(true);
    assert_render_alloc_free(engine, SAMPLE_RATE as usize);
}
