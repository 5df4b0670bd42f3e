//! Core data types for the DrumToy step sequencer.
//!
//! This crate defines the plain data shared by the engine, the format
//! parsers and the controller: sound slot contents, decoded PCM, track
//! step strings and the step language itself.
//!
//! Designed to be `no_std` compatible with the `alloc` crate.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod sound;
mod step;
mod tag;
mod track;
mod transport;

pub use sound::{Pcm, Sample, Sound, SynthDef, SynthDefError};
pub use step::Step;
pub use tag::Tag;
pub use track::{Track, MAX_TRACK_STEPS};
pub use transport::LoopWindow;

/// Number of sound slots in the bank.
pub const SOUNDS_MAX: usize = 16;

/// Number of sequencer tracks.
pub const TRACKS_MAX: usize = 16;

/// Number of playback voices. Each track owns exactly one voice.
pub const VOICES_MAX: usize = TRACKS_MAX;

/// Maximum number of frames mixed in one go.
///
/// Mixing and the observation hook never see a block larger than this.
pub const MAX_FRAGMENT: usize = 256;

/// Fixed engine output rate. Samples are played back unresampled.
pub const SAMPLE_RATE: u32 = 44100;

/// Sequencer steps per beat (four sixteenths).
pub const STEPS_PER_BEAT: u32 = 4;

/// Tempo restored whenever playback passes step 0.
pub const DEFAULT_TEMPO: f32 = 120.0;

/// Placeholder symbol for positions with nothing scheduled.
pub const FILLER: u8 = b'.';
