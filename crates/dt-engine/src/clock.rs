//! Audio clock: interleaves mixing with control ticks.
//!
//! Output is produced in blocks that never cross a control tick, so the
//! control source always runs at a sample-exact position. When no control
//! source is installed, or the installed one asks to stop, the clock keeps
//! ticking idly every [`FALLBACK_INTERVAL`] frames.

use alloc::boxed::Box;
use alloc::vec;

use dt_ir::MAX_FRAGMENT;

use crate::frame::Frame;
use crate::mixer::{narrow, Mixer};
use crate::sound_bank::SoundBank;
use crate::voice_pool::VoicePool;

/// Idle tick interval, in frames.
pub const FALLBACK_INTERVAL: u32 = 10000;

/// Something that runs between mixing blocks and returns the number of
/// frames until it wants to run again. Returning 0 uninstalls it.
pub trait ControlSource {
    fn control_tick(&mut self, voices: &mut VoicePool, bank: &SoundBank) -> u32;
}

/// Observer of each wide mix block before it is narrowed.
///
/// Runs on the audio thread; implementations must not block or allocate.
pub trait AudioHook: Send {
    fn process(&mut self, buf: &[i32], frames: usize);
}

/// Block scheduler for the audio callback.
#[derive(Debug)]
pub struct AudioClock {
    /// Frames between the last two ticks
    interval: u32,
    /// Frames left until the next tick
    next_tick: u32,
    /// Whether the control source is consulted on ticks
    control_installed: bool,
    /// Wide interleaved mix scratch
    mixbuf: Box<[i32]>,
}

impl AudioClock {
    pub fn new() -> Self {
        Self {
            interval: 0,
            next_tick: 0,
            control_installed: false,
            mixbuf: vec![0i32; MAX_FRAGMENT * 2].into_boxed_slice(),
        }
    }

    /// Install the control source. It runs before the next output frame.
    pub fn install_control(&mut self) {
        self.control_installed = true;
        self.next_tick = 0;
    }

    /// Stop consulting the control source.
    pub fn remove_control(&mut self) {
        self.control_installed = false;
    }

    pub fn has_control(&self) -> bool {
        self.control_installed
    }

    /// Frames between the most recent two ticks.
    pub fn interval(&self) -> u32 {
        self.interval
    }

    /// Frames until the next tick.
    pub fn next_tick(&self) -> u32 {
        self.next_tick
    }

    /// Bring the next tick forward to at most `interval` frames away.
    /// Never pushes it later.
    pub fn force_interval(&mut self, interval: u32) {
        if self.next_tick > interval {
            self.next_tick = interval;
        }
    }

    /// Fill `out` with audio, running `control` at every tick boundary.
    pub fn render<C: ControlSource>(
        &mut self,
        out: &mut [Frame],
        mixer: &mut Mixer,
        bank: &SoundBank,
        control: &mut C,
        mut hook: Option<&mut dyn AudioHook>,
    ) {
        let mut done = 0;
        while done < out.len() {
            let want = (self.next_tick as usize)
                .min(MAX_FRAGMENT)
                .min(out.len() - done);

            if want > 0 {
                let frames = mixer.mix(bank, &mut self.mixbuf, want);
                let wide = &self.mixbuf[..frames * 2];
                if let Some(h) = &mut hook {
                    h.process(wide, frames);
                }
                narrow(wide, &mut out[done..done + frames]);
                done += frames;
                self.next_tick -= frames as u32;
            }

            if self.next_tick == 0 {
                self.tick(mixer, bank, control);
            }
        }
    }

    fn tick<C: ControlSource>(&mut self, mixer: &mut Mixer, bank: &SoundBank, control: &mut C) {
        let mut interval = FALLBACK_INTERVAL;
        if self.control_installed {
            interval = control.control_tick(mixer.voices_mut(), bank);
            if interval == 0 {
                self.control_installed = false;
                interval = FALLBACK_INTERVAL;
            }
        }
        self.interval = interval;
        self.next_tick = interval;
    }
}

impl Default for AudioClock {
    fn default() -> Self {
        Self::new()
    }
}
