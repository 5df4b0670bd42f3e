//! Step sequencer.
//!
//! Runs as the audio clock's control source. Every tick decodes the step
//! under the cursor on all tracks, triggers voices and moves the cursor.
//! Zero-time steps and jumps make the same tick decode again, so one tick
//! may cover several positions.

use dt_ir::{LoopWindow, Step, Track, DEFAULT_TEMPO, TRACKS_MAX};

use crate::clock::ControlSource;
use crate::frequency::{interval_to_tempo, tempo_to_interval};
use crate::sound_bank::SoundBank;
use crate::voice_pool::VoicePool;

/// Frames to wait before checking again while paused or stopped.
pub const POLL_INTERVAL: u32 = 16;

/// Decay bias applied by a cut step.
const CUT_DECAY: f32 = 0.9;

/// Upper bound on decode passes per tick. Keeps `J` loops onto
/// themselves from hanging the audio thread.
const MAX_PASSES: usize = 256;

/// What the cursor does after a decode pass.
///
/// Ordered by precedence: when tracks disagree the greatest wins.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum StepFlow {
    /// Move on and wait for the next tick
    Advance,
    /// Zero-time step: decode the next position in this same tick
    Repeat,
    /// Jump: decode the target in this same tick, clearing argument skips
    HardJump,
}

/// Tracks plus transport state.
#[derive(Clone, Debug)]
pub struct Sequencer {
    tracks: [Track; TRACKS_MAX],
    /// Next position to decode
    position: usize,
    /// Position decoded by the most recent tick
    last_position: usize,
    /// Frames per step (0 = stopped)
    interval: u32,
    loop_window: LoopWindow,
    paused: bool,
}

impl Sequencer {
    pub fn new() -> Self {
        Self {
            tracks: core::array::from_fn(|_| Track::new()),
            position: 0,
            last_position: 0,
            interval: tempo_to_interval(DEFAULT_TEMPO),
            loop_window: LoopWindow::NONE,
            paused: false,
        }
    }

    /// Run one tick. Returns frames until the next one.
    pub fn process(&mut self, voices: &mut VoicePool, bank: &SoundBank) -> u32 {
        self.last_position = self.position;
        if self.paused || self.interval == 0 {
            return POLL_INTERVAL;
        }

        for _ in 0..MAX_PASSES {
            let (flow, next) = self.decode_pass(voices, bank);
            self.position = next;
            match flow {
                StepFlow::Advance => break,
                StepFlow::Repeat => {}
                StepFlow::HardJump => {
                    for track in &mut self.tracks {
                        track.skip = 0;
                    }
                }
            }
        }

        if self.interval == 0 {
            POLL_INTERVAL
        } else {
            self.interval
        }
    }

    /// Decode the current position on every track.
    fn decode_pass(&mut self, voices: &mut VoicePool, bank: &SoundBank) -> (StepFlow, usize) {
        let pos = self.position;
        if pos == 0 {
            self.set_defaults();
        }

        let mut next = self.loop_window.wrap(pos.saturating_add(1));
        let mut flow = StepFlow::Advance;
        let mut tempo = None;

        for (t, track) in self.tracks.iter_mut().enumerate() {
            // Argument bytes are swallowed whether or not the track is long enough
            let in_arguments = track.skip > 0;
            if in_arguments {
                track.skip -= 1;
            }
            if pos >= track.len() || in_arguments {
                continue;
            }

            let step = Step::decode(track.steps(), pos);
            match step {
                Step::Note(digit) => {
                    if !track.mute {
                        trigger(track, t, digit, voices, bank);
                    }
                }
                Step::Cut => voices.set_decay(t, CUT_DECAY, bank),
                Step::Decay(Some(n)) => track.decay = n as f32 * 0.1,
                Step::Jump(Some(target)) => {
                    next = target as usize;
                    flow = flow.max(StepFlow::HardJump);
                }
                Step::Tempo(Some(bpm)) => tempo = Some(bpm),
                Step::Volume(Some((l, r))) => {
                    track.lvol = l as f32 / 9.0;
                    track.rvol = r as f32 / 9.0;
                }
                Step::ZeroTime => flow = flow.max(StepFlow::Repeat),
                Step::Decay(None)
                | Step::Jump(None)
                | Step::Tempo(None)
                | Step::Volume(None)
                | Step::Filler => {}
            }
            track.skip = step.arguments();
        }

        if let Some(bpm) = tempo {
            self.interval = tempo_to_interval(bpm as f32);
        }
        (flow, next)
    }

    /// Restore tempo and all track modifiers.
    fn set_defaults(&mut self) {
        self.interval = tempo_to_interval(DEFAULT_TEMPO);
        for track in &mut self.tracks {
            track.reset_modifiers();
        }
    }

    /// Preview a note on `track` with the track's current modifiers.
    /// Anything but a digit is ignored.
    pub fn play_note(&self, track: usize, symbol: u8, voices: &mut VoicePool, bank: &SoundBank) {
        let Some(tr) = self.tracks.get(track) else {
            return;
        };
        if symbol.is_ascii_digit() {
            trigger(tr, track, symbol - b'0', voices, bank);
        }
    }

    /// Set the tempo in BPM. Zero or negative stops stepping.
    pub fn set_tempo(&mut self, bpm: f32) {
        self.interval = tempo_to_interval(bpm);
    }

    /// Current tempo in BPM, derived from the step interval.
    pub fn tempo(&self) -> f32 {
        interval_to_tempo(self.interval)
    }

    /// Frames per step.
    pub fn interval(&self) -> u32 {
        self.interval
    }

    pub fn pause(&mut self, paused: bool) {
        self.paused = paused;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// The position that is currently sounding.
    pub fn position(&self) -> usize {
        self.last_position
    }

    /// The position the next tick will decode.
    pub fn next_position(&self) -> usize {
        self.position
    }

    /// Move the decode cursor.
    pub fn set_position(&mut self, pos: usize) {
        self.position = pos;
    }

    /// Set the loop window. Takes effect on the next wrap.
    pub fn set_loop(&mut self, window: LoopWindow) {
        self.loop_window = window;
    }

    pub fn loop_window(&self) -> LoopWindow {
        self.loop_window
    }

    /// Append step data to a track. Unknown tracks are ignored.
    pub fn add(&mut self, track: usize, fragment: &[u8]) {
        if let Some(tr) = self.tracks.get_mut(track) {
            tr.append(fragment);
        }
    }

    /// Symbol at `pos` on `track`.
    pub fn note(&self, pos: usize, track: usize) -> Option<u8> {
        self.tracks.get(track)?.note(pos)
    }

    /// Write a symbol, growing the track with filler as needed.
    pub fn set_note(&mut self, pos: usize, track: usize, symbol: u8) -> bool {
        match self.tracks.get_mut(track) {
            Some(tr) => tr.set_note(pos, symbol),
            None => false,
        }
    }

    pub fn mute(&mut self, track: usize, mute: bool) {
        if let Some(tr) = self.tracks.get_mut(track) {
            tr.mute = mute;
        }
    }

    pub fn is_muted(&self, track: usize) -> bool {
        self.tracks.get(track).is_some_and(|tr| tr.mute)
    }

    pub fn track(&self, track: usize) -> Option<&Track> {
        self.tracks.get(track)
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Drop all step data and restore defaults. The cursor and loop window
    /// are kept.
    pub fn clear(&mut self) {
        for track in &mut self.tracks {
            track.clear();
        }
        self.set_defaults();
    }
}

impl Default for Sequencer {
    fn default() -> Self {
        Self::new()
    }
}

impl ControlSource for Sequencer {
    fn control_tick(&mut self, voices: &mut VoicePool, bank: &SoundBank) -> u32 {
        self.process(voices, bank)
    }
}

/// Start track `id`'s sound at velocity `digit` (0-9).
fn trigger(track: &Track, id: usize, digit: u8, voices: &mut VoicePool, bank: &SoundBank) {
    let mut velocity = digit as f32 / 9.0;
    if velocity != 0.0 {
        velocity = 0.3 + velocity * 0.7;
    }
    voices.play(id, id, bank, velocity * track.lvol, velocity * track.rvol);
    voices.set_decay(id, track.decay, bank);
}
