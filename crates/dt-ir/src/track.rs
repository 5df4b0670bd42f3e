//! Sequencer track: a step string plus per-track playback modifiers.

use alloc::vec::Vec;

use crate::FILLER;

/// Positions at or beyond this are rejected by [`Track::set_note`].
pub const MAX_TRACK_STEPS: usize = 1 << 16;

/// A single sequencer track.
#[derive(Clone, Debug)]
pub struct Track {
    /// Step symbols, one byte per position
    steps: Vec<u8>,
    /// Notes are suppressed while muted; commands still run
    pub mute: bool,
    /// Decay bias applied on every note (0.0 = sustain)
    pub decay: f32,
    /// Left volume bias (0.0-1.0)
    pub lvol: f32,
    /// Right volume bias (0.0-1.0)
    pub rvol: f32,
    /// Argument bytes still to swallow
    pub skip: u8,
}

impl Default for Track {
    fn default() -> Self {
        Self {
            steps: Vec::new(),
            mute: false,
            decay: 0.0,
            lvol: 1.0,
            rvol: 1.0,
            skip: 0,
        }
    }
}

impl Track {
    /// Create an empty track.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of positions in the track.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Returns true if the track has no steps.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// The raw step string.
    pub fn steps(&self) -> &[u8] {
        &self.steps
    }

    /// Append a fragment of step data. Fragments concatenate in call order.
    pub fn append(&mut self, fragment: &[u8]) {
        self.steps.extend_from_slice(fragment);
    }

    /// Read the symbol at `pos`, or `None` past the end.
    pub fn note(&self, pos: usize) -> Option<u8> {
        self.steps.get(pos).copied()
    }

    /// Write `symbol` at `pos`, padding with filler if the track is shorter.
    ///
    /// Returns false (and changes nothing) if `pos` is out of range.
    pub fn set_note(&mut self, pos: usize, symbol: u8) -> bool {
        if pos >= MAX_TRACK_STEPS {
            return false;
        }
        if pos >= self.steps.len() {
            self.steps.resize(pos + 1, FILLER);
        }
        self.steps[pos] = symbol;
        true
    }

    /// Restore decay and volume biases. Step data and mute are kept.
    pub fn reset_modifiers(&mut self) {
        self.decay = 0.0;
        self.lvol = 1.0;
        self.rvol = 1.0;
    }

    /// Drop all step data and modifiers.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
