//! Voice mixer: sums every voice into a wide buffer and narrows it.

use dt_ir::MAX_FRAGMENT;

use crate::frame::Frame;
use crate::sound_bank::SoundBank;
use crate::voice_pool::VoicePool;

/// Owns the voice pool and renders it one block at a time.
#[derive(Clone, Debug, Default)]
pub struct Mixer {
    voices: VoicePool,
}

impl Mixer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn voices(&self) -> &VoicePool {
        &self.voices
    }

    pub fn voices_mut(&mut self) -> &mut VoicePool {
        &mut self.voices
    }

    /// Mix up to `frames` frames (capped at [`MAX_FRAGMENT`]) into `buf`,
    /// interleaved stereo. Returns the number of frames mixed.
    ///
    /// `buf` is cleared first and must hold at least `2 * frames` values.
    pub fn mix(&mut self, bank: &SoundBank, buf: &mut [i32], frames: usize) -> usize {
        let frames = frames.min(MAX_FRAGMENT).min(buf.len() / 2);
        let block = &mut buf[..frames * 2];
        block.fill(0);
        self.voices.render_all(bank, block);
        frames
    }
}

/// Narrow a wide interleaved mix into 16-bit frames.
pub fn narrow(wide: &[i32], out: &mut [Frame]) {
    for (frame, pair) in out.iter_mut().zip(wide.chunks_exact(2)) {
        *frame = Frame::from_wide(pair[0], pair[1]);
    }
}
