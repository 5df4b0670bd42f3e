//! Pitch and tempo conversions.
//!
//! Synth pitches are semitones above C0 in 12-tone equal temperament.
//! Tempo is expressed to the clock as a whole number of samples per step.

use dt_ir::{SAMPLE_RATE, STEPS_PER_BEAT};

/// Frequency of semitone 0 (C0) in Hz.
pub const C0_HZ: f64 = 16.3515978312874;

/// Convert a pitch in semitones above C0 to Hz.
pub fn semitone_to_hz(pitch: f32) -> f64 {
    C0_HZ * libm::pow(2.0, pitch as f64 / 12.0)
}

/// Phase advance per sample, in radians, for a tone of `hz`.
pub fn angular_step(hz: f64, sample_rate: u32) -> f64 {
    core::f64::consts::PI * 2.0 * hz / sample_rate as f64
}

/// Samples per sequencer step at `bpm`. Zero or negative tempo stops ticking.
pub fn tempo_to_interval(bpm: f32) -> u32 {
    if bpm <= 0.0 {
        return 0;
    }
    (SAMPLE_RATE as f64 / bpm as f64 * 60.0 / STEPS_PER_BEAT as f64) as u32
}

/// Inverse of [`tempo_to_interval`]. Returns 0.0 when not ticking.
pub fn interval_to_tempo(interval: u32) -> f32 {
    if interval == 0 {
        return 0.0;
    }
    (SAMPLE_RATE as f64 / interval as f64 * 60.0 / STEPS_PER_BEAT as f64) as f32
}
