//! Sound slot contents: sampled waveforms and FM synth definitions.

use alloc::vec::Vec;
use arrayvec::ArrayString;
use core::fmt;

/// Contents of one sound bank slot.
#[derive(Clone, Debug, Default)]
pub enum Sound {
    /// Nothing loaded. Voices playing an empty slot are silent.
    #[default]
    Empty,
    /// 16-bit mono waveform.
    Sample(Sample),
    /// Two-operator FM voice.
    Synth(SynthDef),
}

impl Sound {
    /// Returns true if the slot holds nothing.
    pub fn is_empty(&self) -> bool {
        matches!(self, Sound::Empty)
    }

    /// Display name of the loaded sound, if any.
    pub fn name(&self) -> Option<&str> {
        match self {
            Sound::Empty => None,
            Sound::Sample(s) => Some(&s.name),
            Sound::Synth(s) => Some(&s.name),
        }
    }
}

/// A sampled waveform.
#[derive(Clone, Debug, Default)]
pub struct Sample {
    /// Sample name (usually the file stem)
    pub name: ArrayString<26>,
    /// Mono 16-bit sample data
    pub data: Vec<i16>,
    /// Rate the data was recorded at. Informational only.
    pub sample_rate: u32,
}

impl Sample {
    /// Create a sample from decoded data.
    pub fn new(name: &str, data: Vec<i16>, sample_rate: u32) -> Self {
        Self {
            name: truncated_name(name),
            data,
            sample_rate,
        }
    }

    /// Length in samples.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the sample has no data.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Parameters of the `fm2` synth voice.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SynthDef {
    /// Definition text, for display
    pub name: ArrayString<26>,
    /// Pitch in semitones above C0 (60.0 is middle C)
    pub pitch: f32,
    /// FM modulation depth
    pub fm: f32,
    /// Base decay speed, added to the track decay bias
    pub decay: f32,
}

impl SynthDef {
    /// Build a definition from its three parameters.
    pub fn new(pitch: f32, fm: f32, decay: f32) -> Self {
        Self {
            name: truncated_name("fm2"),
            pitch,
            fm,
            decay,
        }
    }

    /// Parse a definition of the form `fm2 <pitch> <fm> <decay>`.
    ///
    /// Tokens after the third parameter are ignored.
    pub fn parse(def: &str) -> Result<Self, SynthDefError> {
        let mut tokens = def.split_whitespace();
        match tokens.next() {
            Some("fm2") => {}
            _ => return Err(SynthDefError::UnknownType),
        }

        let mut params = [0.0f32; 3];
        for param in params.iter_mut() {
            let token = tokens.next().ok_or(SynthDefError::TooFewParameters)?;
            *param = token
                .parse()
                .map_err(|_| SynthDefError::InvalidNumber)?;
        }

        Ok(Self {
            name: truncated_name(def.trim()),
            pitch: params[0],
            fm: params[1],
            decay: params[2],
        })
    }
}

/// Reasons a synth definition can be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SynthDefError {
    /// The definition does not start with a known instrument type
    UnknownType,
    /// Fewer than three parameters
    TooFewParameters,
    /// A parameter is not a number
    InvalidNumber,
}

impl fmt::Display for SynthDefError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SynthDefError::UnknownType => write!(f, "unknown instrument type"),
            SynthDefError::TooFewParameters => write!(f, "fm2: too few parameters"),
            SynthDefError::InvalidNumber => write!(f, "fm2: parameter is not a number"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for SynthDefError {}

/// Decoded PCM audio as handed over by a file decoder.
///
/// `data` holds the raw little-endian sample bytes. The sound bank decides
/// whether the layout is one it can play.
#[derive(Clone, Debug, Default)]
pub struct Pcm {
    /// Number of interleaved channels
    pub channels: u16,
    /// Bits per sample
    pub bits_per_sample: u16,
    /// Recording rate in Hz
    pub sample_rate: u32,
    /// Raw little-endian sample bytes
    pub data: Vec<u8>,
}

impl Pcm {
    /// Wrap 16-bit mono samples.
    pub fn mono16(samples: &[i16], sample_rate: u32) -> Self {
        Self {
            channels: 1,
            bits_per_sample: 16,
            sample_rate,
            data: samples.iter().flat_map(|s| s.to_le_bytes()).collect(),
        }
    }

    /// Interpret the data as 16-bit samples.
    pub fn to_i16(&self) -> Vec<i16> {
        self.data
            .chunks_exact(2)
            .map(|c| i16::from_le_bytes([c[0], c[1]]))
            .collect()
    }
}

/// Copy as much of `name` as fits, stopping on a character boundary.
fn truncated_name(name: &str) -> ArrayString<26> {
    let mut out = ArrayString::new();
    for c in name.chars() {
        if out.try_push(c).is_err() {
            break;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_fm2_definition() {
        let def = SynthDef::parse("fm2 48 0.5 2").unwrap();
        assert_eq!(def.pitch, 48.0);
        assert_eq!(def.fm, 0.5);
        assert_eq!(def.decay, 2.0);
        assert_eq!(def.name.as_str(), "fm2 48 0.5 2");
    }

    #[test]
    fn parse_ignores_trailing_tokens() {
        let def = SynthDef::parse("fm2 60 1 1 extra stuff").unwrap();
        assert_eq!(def.pitch, 60.0);
    }

    #[test]
    fn parse_rejects_missing_parameters() {
        assert_eq!(SynthDef::parse("fm2 60 1"), Err(SynthDefError::TooFewParameters));
        assert_eq!(SynthDef::parse("fm2"), Err(SynthDefError::TooFewParameters));
    }

    #[test]
    fn parse_rejects_unknown_type() {
        assert_eq!(SynthDef::parse("fm3 60 1 1"), Err(SynthDefError::UnknownType));
        assert_eq!(SynthDef::parse(""), Err(SynthDefError::UnknownType));
    }

    #[test]
    fn parse_rejects_garbage_numbers() {
        assert_eq!(SynthDef::parse("fm2 sixty 1 1"), Err(SynthDefError::InvalidNumber));
    }

    #[test]
    fn long_names_are_truncated() {
        let s = Sample::new("a_very_long_sample_name_that_keeps_going.wav", vec![0; 4], 44100);
        assert_eq!(s.name.len(), 26);
        assert!(s.name.starts_with("a_very_long"));
    }

    #[test]
    fn pcm_mono16_roundtrip() {
        let pcm = Pcm::mono16(&[0, -1, 1000, i16::MIN], 22050);
        assert_eq!(pcm.data.len(), 8);
        assert_eq!(pcm.to_i16(), vec![0, -1, 1000, i16::MIN]);
    }

    #[test]
    fn empty_sound_has_no_name() {
        assert!(Sound::Empty.is_empty());
        assert_eq!(Sound::Empty.name(), None);
        let synth = Sound::Synth(SynthDef::new(60.0, 0.0, 1.0));
        assert_eq!(synth.name(), Some("fm2"));
    }
}
