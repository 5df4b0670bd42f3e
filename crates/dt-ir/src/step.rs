//! The step language.
//!
//! Each track is a string of single-byte steps. Most steps stand alone;
//! `D`, `J`, `T` and `V` are followed by decimal argument bytes that the
//! sequencer must swallow rather than play.

/// One decoded step.
///
/// Commands whose argument bytes are missing or not decimal digits decode
/// with `None` and are ignored by the sequencer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    /// `0`-`9`: trigger the track's sound at this velocity digit
    Note(u8),
    /// `C`: cut the sounding note
    Cut,
    /// `Dn`: set the track decay bias
    Decay(Option<u8>),
    /// `Jnnn`: jump to an absolute position
    Jump(Option<u16>),
    /// `Tnnn`: set tempo in BPM
    Tempo(Option<u16>),
    /// `Vlr`: set left/right volume
    Volume(Option<(u8, u8)>),
    /// `Z`: zero-duration step
    ZeroTime,
    /// `.` or any unrecognised byte
    Filler,
}

impl Step {
    /// Decode the step at `pos`. Positions past the end decode as filler.
    pub fn decode(steps: &[u8], pos: usize) -> Step {
        let Some(&symbol) = steps.get(pos) else {
            return Step::Filler;
        };
        match symbol {
            b'0'..=b'9' => Step::Note(symbol - b'0'),
            b'C' => Step::Cut,
            b'D' => Step::Decay(digit(steps, pos + 1)),
            b'J' => Step::Jump(number3(steps, pos + 1)),
            b'T' => Step::Tempo(number3(steps, pos + 1)),
            b'V' => Step::Volume(digit(steps, pos + 1).zip(digit(steps, pos + 2))),
            b'Z' => Step::ZeroTime,
            _ => Step::Filler,
        }
    }

    /// Number of argument bytes following this step's symbol.
    pub fn arguments(&self) -> u8 {
        match self {
            Step::Decay(_) => 1,
            Step::Volume(_) => 2,
            Step::Jump(_) | Step::Tempo(_) => 3,
            _ => 0,
        }
    }
}

fn digit(steps: &[u8], pos: usize) -> Option<u8> {
    steps
        .get(pos)
        .filter(|b| b.is_ascii_digit())
        .map(|b| b - b'0')
}

fn number3(steps: &[u8], pos: usize) -> Option<u16> {
    let mut value = 0u16;
    for i in 0..3 {
        value = value * 10 + digit(steps, pos + i)? as u16;
    }
    Some(value)
}
