//! Engine context: everything the audio callback and the editor share.

use alloc::boxed::Box;
use alloc::vec;
use alloc::vec::Vec;

use dt_ir::{LoopWindow, Pcm, Sound, SynthDef, Track};

use crate::clock::{AudioClock, AudioHook};
use crate::frame::Frame;
use crate::mixer::Mixer;
use crate::sequencer::Sequencer;
use crate::sound_bank::{LoadError, SoundBank};

/// Sound bank, voices, sequencer and clock in one place.
///
/// The sequencer is installed as the clock's control source from the start.
pub struct Engine {
    bank: SoundBank,
    mixer: Mixer,
    sequencer: Sequencer,
    clock: AudioClock,
    hook: Option<Box<dyn AudioHook>>,
}

impl Engine {
    pub fn new() -> Self {
        let mut clock = AudioClock::new();
        clock.install_control();
        Self {
            bank: SoundBank::new(),
            mixer: Mixer::new(),
            sequencer: Sequencer::new(),
            clock,
            hook: None,
        }
    }

    /// Fill `out` with audio, ticking the sequencer as needed.
    pub fn render(&mut self, out: &mut [Frame]) {
        let hook = self.hook.as_mut().map(|h| &mut **h as &mut dyn AudioHook);
        self.clock
            .render(out, &mut self.mixer, &self.bank, &mut self.sequencer, hook);
    }

    /// Render `frames` frames into a new buffer.
    pub fn render_frames(&mut self, frames: usize) -> Vec<Frame> {
        let mut out = vec![Frame::silence(); frames];
        self.render(&mut out);
        out
    }

    // === Sound bank ===

    pub fn load_sample(&mut self, slot: usize, name: &str, pcm: &Pcm) -> Result<(), LoadError> {
        self.bank.load_sample(slot, name, pcm)
    }

    pub fn load_synth(&mut self, slot: usize, def: &str) -> Result<(), LoadError> {
        self.bank.load_synth(slot, def)
    }

    pub fn load_synth_def(&mut self, slot: usize, synth: SynthDef) -> Result<(), LoadError> {
        self.bank.load_synth_def(slot, synth)
    }

    pub fn unload(&mut self, slot: usize) {
        self.bank.unload(slot);
    }

    pub fn sound(&self, slot: usize) -> Option<&Sound> {
        self.bank.get(slot)
    }

    pub fn bank(&self) -> &SoundBank {
        &self.bank
    }

    // === Output ===

    /// Install an observer for every mixed block, replacing any previous one.
    pub fn set_audio_hook(&mut self, hook: Option<Box<dyn AudioHook>>) {
        self.hook = hook;
    }

    /// Attach or detach the sequencer from the clock.
    pub fn set_sequencer_enabled(&mut self, enabled: bool) {
        if enabled {
            self.clock.install_control();
        } else {
            self.clock.remove_control();
        }
    }

    pub fn sequencer_enabled(&self) -> bool {
        self.clock.has_control()
    }

    /// Frames between the most recent two ticks.
    pub fn interval(&self) -> u32 {
        self.clock.interval()
    }

    /// Frames until the next tick.
    pub fn next_tick(&self) -> u32 {
        self.clock.next_tick()
    }

    pub fn active_voices(&self) -> usize {
        self.mixer.voices().active_count()
    }

    // === Transport ===

    /// Set the tempo in BPM. A pending step is brought forward if the new
    /// interval is shorter.
    pub fn set_tempo(&mut self, bpm: f32) {
        self.sequencer.set_tempo(bpm);
        self.clock.force_interval(self.sequencer.interval());
    }

    pub fn tempo(&self) -> f32 {
        self.sequencer.tempo()
    }

    pub fn pause(&mut self, paused: bool) {
        self.sequencer.pause(paused);
    }

    pub fn is_paused(&self) -> bool {
        self.sequencer.is_paused()
    }

    pub fn position(&self) -> usize {
        self.sequencer.position()
    }

    pub fn next_position(&self) -> usize {
        self.sequencer.next_position()
    }

    pub fn set_position(&mut self, pos: usize) {
        self.sequencer.set_position(pos);
    }

    pub fn set_loop(&mut self, window: LoopWindow) {
        self.sequencer.set_loop(window);
    }

    pub fn loop_window(&self) -> LoopWindow {
        self.sequencer.loop_window()
    }

    // === Editing ===

    pub fn add(&mut self, track: usize, fragment: &[u8]) {
        self.sequencer.add(track, fragment);
    }

    pub fn note(&self, pos: usize, track: usize) -> Option<u8> {
        self.sequencer.note(pos, track)
    }

    pub fn set_note(&mut self, pos: usize, track: usize, symbol: u8) -> bool {
        self.sequencer.set_note(pos, track, symbol)
    }

    pub fn mute(&mut self, track: usize, mute: bool) {
        self.sequencer.mute(track, mute);
    }

    pub fn is_muted(&self, track: usize) -> bool {
        self.sequencer.is_muted(track)
    }

    pub fn track(&self, track: usize) -> Option<&Track> {
        self.sequencer.track(track)
    }

    pub fn tracks(&self) -> &[Track] {
        self.sequencer.tracks()
    }

    /// Preview a note on `track` outside the sequence.
    pub fn play_note(&mut self, track: usize, symbol: u8) {
        self.sequencer
            .play_note(track, symbol, self.mixer.voices_mut(), &self.bank);
    }

    /// Drop all tracks and sounds and silence every voice.
    pub fn clear(&mut self) {
        self.sequencer.clear();
        self.bank.unload_all();
        self.mixer.voices_mut().stop_all();
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dt_ir::SAMPLE_RATE;
    use std::sync::{Arc, Mutex};

    use crate::sequencer::POLL_INTERVAL;

    struct PeakMeter(Arc<Mutex<i32>>);

    impl AudioHook for PeakMeter {
        fn process(&mut self, buf: &[i32], _frames: usize) {
            let peak = buf.iter().map(|s| s.abs()).max().unwrap_or(0);
            let mut p = self.0.lock().unwrap();
            *p = (*p).max(peak);
        }
    }

    fn engine_with_click() -> Engine {
        let mut engine = Engine::new();
        engine
            .load_sample(0, "click", &Pcm::mono16(&[8000; 100], SAMPLE_RATE))
            .unwrap();
        engine
    }

    #[test]
    fn first_step_sounds_immediately() {
        let mut engine = engine_with_click();
        engine.add(0, b"9");
        let frames = engine.render_frames(4);
        assert_eq!(frames[0].left, 8000);
        assert_eq!(engine.interval(), 5512);
        assert_eq!(engine.next_tick(), 5508);
    }

    #[test]
    fn steps_land_on_interval_boundaries() {
        let mut engine = engine_with_click();
        engine.add(0, b".9");
        let frames = engine.render_frames(5512 + 2);
        assert_eq!(frames[5511].left, 0);
        assert_eq!(frames[5512].left, 8000);
        assert_eq!(engine.position(), 1);
    }

    #[test]
    fn sample_voice_ends_at_length() {
        let mut engine = engine_with_click();
        engine.add(0, b"9");
        let frames = engine.render_frames(200);
        assert_eq!(frames[99].left, 8000);
        assert_eq!(frames[100].left, 0);
        assert_eq!(engine.active_voices(), 0);
    }

    #[test]
    fn tempo_change_pulls_next_step_forward() {
        let mut engine = engine_with_click();
        engine.add(0, b"....");
        engine.render_frames(10);
        engine.set_tempo(240.0);
        assert_eq!(engine.next_tick(), 2756);
        engine.set_tempo(60.0);
        assert_eq!(engine.next_tick(), 2756);
    }

    #[test]
    fn disabled_sequencer_stops_stepping() {
        let mut engine = engine_with_click();
        engine.add(0, b"9999");
        engine.set_sequencer_enabled(false);
        engine.render_frames(20_000);
        assert_eq!(engine.next_position(), 0);
        engine.set_sequencer_enabled(true);
        engine.render_frames(1);
        assert_eq!(engine.next_position(), 1);
    }

    #[test]
    fn paused_engine_polls() {
        let mut engine = engine_with_click();
        engine.pause(true);
        engine.render_frames(1);
        assert_eq!(engine.interval(), POLL_INTERVAL);
    }

    #[test]
    fn hook_sees_wide_mix() {
        let mut engine = engine_with_click();
        let peak = Arc::new(Mutex::new(0));
        engine.set_audio_hook(Some(Box::new(PeakMeter(peak.clone()))));
        engine.add(0, b"9");
        engine.render_frames(64);
        assert_eq!(*peak.lock().unwrap(), 8000 << 8);
    }

    #[test]
    fn preview_plays_outside_sequence() {
        let mut engine = engine_with_click();
        engine.pause(true);
        engine.play_note(0, b'9');
        let frames = engine.render_frames(1);
        assert_eq!(frames[0].left, 8000);
    }

    #[test]
    fn clear_silences_and_empties() {
        let mut engine = engine_with_click();
        engine.add(0, b"9");
        engine.render_frames(1);
        engine.clear();
        assert_eq!(engine.active_voices(), 0);
        assert!(engine.sound(0).unwrap().is_empty());
        assert!(engine.track(0).unwrap().is_empty());
    }

    #[test]
    fn hook_can_be_swapped_between_renders() {
        let mut engine = engine_with_click();
        engine.add(0, b"9");
        let first = Arc::new(Mutex::new(0));
        engine.set_audio_hook(Some(Box::new(PeakMeter(first.clone()))));
        engine.render_frames(16);
        let second = Arc::new(Mutex::new(0));
        engine.set_audio_hook(Some(Box::new(PeakMeter(second.clone()))));
        engine.render_frames(16);
        assert_eq!(*first.lock().unwrap(), 8000 << 8);
        assert_eq!(*second.lock().unwrap(), 8000 << 8);
    }

    #[test]
    fn cursor_at_usize_max_renders_without_panic() {
        let mut engine = engine_with_click();
        engine.add(0, b"9");
        engine.set_position(usize::MAX);
        let frames = engine.render_frames(4);
        assert!(frames.iter().all(|f| *f == Frame::silence()));
        assert_eq!(engine.next_position(), usize::MAX);
    }
}
