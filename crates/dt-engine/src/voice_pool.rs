//! Fixed pool of playback voices, one per track.

use dt_ir::{Sound, VOICES_MAX};

use crate::sound_bank::SoundBank;
use crate::voice::{decay_coefficient, Voice};

/// All voices, indexed by voice id.
#[derive(Clone, Debug)]
pub struct VoicePool {
    voices: [Voice; VOICES_MAX],
}

impl VoicePool {
    pub fn new() -> Self {
        Self {
            voices: [Voice::new(); VOICES_MAX],
        }
    }

    /// Get a voice by id.
    pub fn get(&self, id: usize) -> Option<&Voice> {
        self.voices.get(id)
    }

    /// Start `sound` on voice `id`, cutting whatever it was playing.
    ///
    /// Unknown voice ids are ignored. Playing an empty slot leaves the
    /// voice silent. Synth voices start with the synth's own decay; the
    /// caller's [`set_decay`](Self::set_decay) adds to it.
    pub fn play(&mut self, id: usize, sound: usize, bank: &SoundBank, lvol: f32, rvol: f32) {
        let Some(voice) = self.voices.get_mut(id) else {
            return;
        };
        match bank.get(sound) {
            Some(Sound::Sample(_)) => {
                voice.trigger(sound, lvol, rvol);
            }
            Some(Sound::Synth(def)) => {
                voice.trigger(sound, lvol, rvol);
                voice.decay = decay_coefficient(def.decay);
            }
            Some(Sound::Empty) | None => voice.stop(),
        }
    }

    /// Set the decay speed of a sounding voice. Inactive voices are left
    /// alone. For synths the synth's own decay is added.
    pub fn set_decay(&mut self, id: usize, decay: f32, bank: &SoundBank) {
        let Some(voice) = self.voices.get_mut(id) else {
            return;
        };
        let Some(sound) = voice.sound else {
            return;
        };
        let base = match bank.get(sound) {
            Some(Sound::Synth(def)) => def.decay,
            _ => 0.0,
        };
        voice.decay = decay_coefficient(decay + base);
    }

    /// Silence every voice.
    pub fn stop_all(&mut self) {
        for voice in &mut self.voices {
            voice.stop();
        }
    }

    /// Number of sounding voices.
    pub fn active_count(&self) -> usize {
        self.voices.iter().filter(|v| v.is_active()).count()
    }

    /// Add every active voice into `out` (interleaved stereo, wide).
    ///
    /// A voice whose slot was emptied since it started is stopped.
    pub fn render_all(&mut self, bank: &SoundBank, out: &mut [i32]) {
        for voice in &mut self.voices {
            let Some(slot) = voice.sound else {
                continue;
            };
            match bank.get(slot) {
                Some(Sound::Sample(sample)) => voice.render_sample(&sample.data, out),
                Some(Sound::Synth(def)) => voice.render_synth(def, out),
                Some(Sound::Empty) | None => voice.stop(),
            }
        }
    }
}

impl Default for VoicePool {
    fn default() -> Self {
        Self::new()
    }
}
