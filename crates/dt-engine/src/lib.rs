//! Playback engine for DrumToy.
//!
//! A fixed set of voices, one per sequencer track, is mixed into a wide
//! accumulator in blocks of at most [`MAX_FRAGMENT`] frames. Between blocks
//! the audio clock hands control to the step sequencer, which decodes one
//! transport step and retriggers voices.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod clock;
mod engine;
mod frame;
mod frequency;
mod mixer;
pub mod sequencer;
#[cfg(feature = "std")]
mod shared;
mod sound_bank;
mod voice;
mod voice_pool;

pub use clock::{AudioClock, AudioHook, ControlSource, FALLBACK_INTERVAL};
pub use engine::Engine;
pub use frame::Frame;
pub use frequency::{angular_step, interval_to_tempo, semitone_to_hz, tempo_to_interval, C0_HZ};
pub use mixer::Mixer;
pub use sequencer::{Sequencer, StepFlow, POLL_INTERVAL};
#[cfg(feature = "std")]
pub use shared::SharedEngine;
pub use sound_bank::{LoadError, SoundBank};
pub use voice::{decay_coefficient, volume_to_gain, Voice, UNITY_GAIN};
pub use voice_pool::VoicePool;

pub use dt_ir::MAX_FRAGMENT;
