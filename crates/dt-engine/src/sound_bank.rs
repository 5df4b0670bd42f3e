//! Sound bank: the instrument slots voices play from.

use alloc::string::String;
use core::fmt;
use dt_ir::{Pcm, Sample, Sound, SynthDef, SynthDefError, SAMPLE_RATE, SOUNDS_MAX};

/// Error type for sound loading.
#[derive(Debug)]
pub enum LoadError {
    /// Sample data is not 16-bit mono
    Format { channels: u16, bits_per_sample: u16 },
    /// Source file or stream unavailable
    Io(String),
    /// Malformed synth definition
    Parse(SynthDefError),
    /// Slot index out of range
    InvalidSlot(usize),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Format { channels, bits_per_sample } => write!(
                f,
                "unsupported sample format: {} channel(s), {} bit; only 16 bit mono is supported",
                channels, bits_per_sample
            ),
            LoadError::Io(msg) => write!(f, "I/O error: {}", msg),
            LoadError::Parse(e) => write!(f, "parse error: {}", e),
            LoadError::InvalidSlot(slot) => write!(f, "sound slot {} out of range", slot),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for LoadError {}

impl From<SynthDefError> for LoadError {
    fn from(e: SynthDefError) -> Self {
        LoadError::Parse(e)
    }
}

/// Fixed array of sound slots.
///
/// Every load empties the slot first, so a failed load leaves it empty.
#[derive(Clone, Debug)]
pub struct SoundBank {
    slots: [Sound; SOUNDS_MAX],
}

impl SoundBank {
    /// Create a bank with every slot empty.
    pub fn new() -> Self {
        Self {
            slots: core::array::from_fn(|_| Sound::Empty),
        }
    }

    /// Get the sound in `slot`.
    pub fn get(&self, slot: usize) -> Option<&Sound> {
        self.slots.get(slot)
    }

    /// Load decoded PCM into `slot`.
    ///
    /// Only 16-bit mono is accepted. Other sample rates load with a warning
    /// since playback is not resampled.
    pub fn load_sample(&mut self, slot: usize, name: &str, pcm: &Pcm) -> Result<(), LoadError> {
        check_slot(slot)?;
        self.unload(slot);

        if pcm.channels != 1 || pcm.bits_per_sample != 16 {
            return Err(LoadError::Format {
                channels: pcm.channels,
                bits_per_sample: pcm.bits_per_sample,
            });
        }
        if pcm.sample_rate != SAMPLE_RATE {
            tracing::warn!(
                slot,
                name,
                sample_rate = pcm.sample_rate,
                "sample is not 44.1 kHz; it will play at the wrong pitch"
            );
        }

        self.slots[slot] = Sound::Sample(Sample::new(name, pcm.to_i16(), pcm.sample_rate));
        Ok(())
    }

    /// Parse and load a synth definition (`fm2 <pitch> <fm> <decay>`).
    pub fn load_synth(&mut self, slot: usize, def: &str) -> Result<(), LoadError> {
        check_slot(slot)?;
        self.unload(slot);
        let synth = SynthDef::parse(def)?;
        self.slots[slot] = Sound::Synth(synth);
        Ok(())
    }

    /// Install an already parsed synth definition.
    pub fn load_synth_def(&mut self, slot: usize, synth: SynthDef) -> Result<(), LoadError> {
        check_slot(slot)?;
        self.slots[slot] = Sound::Synth(synth);
        Ok(())
    }

    /// Release whatever `slot` holds. Out-of-range slots are ignored.
    pub fn unload(&mut self, slot: usize) {
        if let Some(sound) = self.slots.get_mut(slot) {
            *sound = Sound::Empty;
        }
    }

    /// Release every slot.
    pub fn unload_all(&mut self) {
        for slot in 0..SOUNDS_MAX {
            self.unload(slot);
        }
    }

    /// Number of non-empty slots.
    pub fn loaded_count(&self) -> usize {
        self.slots.iter().filter(|s| !s.is_empty()).count()
    }
}

impl Default for SoundBank {
    fn default() -> Self {
        Self::new()
    }
}

fn check_slot(slot: usize) -> Result<(), LoadError> {
    if slot < SOUNDS_MAX {
        Ok(())
    } else {
        Err(LoadError::InvalidSlot(slot))
    }
}
