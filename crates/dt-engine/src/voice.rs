//! Voice: playback state for one track.
//!
//! Gains are 8:24 fixed point (`UNITY_GAIN` is 0 dB). The decay coefficient
//! is the fraction of the gain removed per sample, in 16:16 fixed point,
//! which gives an exponential envelope.

use dt_ir::{SynthDef, SAMPLE_RATE};

use crate::frequency::{angular_step, semitone_to_hz};

/// 0 dB in 8:24 fixed point.
pub const UNITY_GAIN: i32 = 1 << 24;

/// Linear gain removed from a synth voice after every block.
const SYNTH_TAIL_STEP: i32 = 16;

/// Map a linear control volume in `[0, 1]` to a gain, cubed so equal
/// control steps sound like equal loudness steps.
pub fn volume_to_gain(volume: f32) -> i32 {
    let v = volume.clamp(0.0, 1.0);
    (v * v * v * UNITY_GAIN as f32) as i32
}

/// Map a decay speed to a per-sample decay coefficient.
pub fn decay_coefficient(decay: f32) -> i32 {
    let d = decay * decay * 0.00001;
    (d * UNITY_GAIN as f32) as i32
}

/// One step of exponential decay. Never goes below zero, and always makes
/// progress while `decay` is non-zero so the tail cannot stall.
fn decay_gain(gain: i32, decay: i32) -> i32 {
    if decay <= 0 || gain <= 0 {
        return gain.max(0);
    }
    let step = (((gain >> 8) as i64 * decay as i64) >> 8) as i32;
    (gain - step.max(1)).max(0)
}

/// Runtime state of one playback voice.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Voice {
    /// Sound slot being played, or `None` when silent.
    pub sound: Option<usize>,
    /// Play position in samples.
    pub position: u32,
    /// Left gain (8:24).
    pub lvol: i32,
    /// Right gain (8:24).
    pub rvol: i32,
    /// Per-sample decay coefficient (16:16).
    pub decay: i32,
}

impl Voice {
    /// A silent voice.
    pub const fn new() -> Self {
        Self {
            sound: None,
            position: 0,
            lvol: 0,
            rvol: 0,
            decay: 0,
        }
    }

    /// Returns true if the voice is bound to a sound.
    pub fn is_active(&self) -> bool {
        self.sound.is_some()
    }

    /// Start `sound` from the top, replacing whatever was playing.
    pub fn trigger(&mut self, sound: usize, lvol: f32, rvol: f32) {
        self.sound = Some(sound);
        self.position = 0;
        self.lvol = volume_to_gain(lvol);
        self.rvol = volume_to_gain(rvol);
    }

    /// Silence the voice immediately.
    pub fn stop(&mut self) {
        self.sound = None;
    }

    fn apply_decay(&mut self) {
        self.lvol = decay_gain(self.lvol, self.decay);
        self.rvol = decay_gain(self.rvol, self.decay);
    }

    /// Add a sampled waveform into an interleaved stereo wide buffer.
    ///
    /// Running off the end of the data deactivates the voice and leaves the
    /// remaining frames untouched.
    pub fn render_sample(&mut self, data: &[i16], out: &mut [i32]) {
        for frame in out.chunks_exact_mut(2) {
            let Some(&s) = data.get(self.position as usize) else {
                self.sound = None;
                break;
            };
            let s = s as i32;
            frame[0] += (s * (self.lvol >> 9)) >> 7;
            frame[1] += (s * (self.rvol >> 9)) >> 7;
            self.apply_decay();
            self.position += 1;
        }
    }

    /// Add the FM synth voice into an interleaved stereo wide buffer.
    ///
    /// After the block a fixed amount is taken off both gains so the tail
    /// reaches true silence; a voice with both gains at zero deactivates.
    pub fn render_synth(&mut self, synth: &SynthDef, out: &mut [i32]) {
        let f = semitone_to_hz(synth.pitch);
        let w = angular_step(f, SAMPLE_RATE);
        let fm = synth.fm as f64 * SAMPLE_RATE as f64 / f;

        for frame in out.chunks_exact_mut(2) {
            let t = self.position as f64;
            let modulation = libm::sin(t * w) * fm;
            let s = (libm::sin((t + modulation) * w) * 32767.0) as i32;
            frame[0] += (s * (self.lvol >> 9)) >> 7;
            frame[1] += (s * (self.rvol >> 9)) >> 7;
            self.apply_decay();
            self.position = self.position.wrapping_add(1);
        }

        self.lvol = (self.lvol - SYNTH_TAIL_STEP).max(0);
        self.rvol = (self.rvol - SYNTH_TAIL_STEP).max(0);
        if self.lvol == 0 && self.rvol == 0 {
            self.sound = None;
        }
    }
}
