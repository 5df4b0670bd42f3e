//! File formats for DrumToy.
//!
//! Decodes RIFF/WAVE sample files into [`Pcm`](dt_ir::Pcm), writes stereo
//! renders back out as WAV, and reads and writes the line-based DT42 song
//! format.

mod song_format;
mod wav_format;

pub use song_format::{
    parse_song, write_song, SongFile, SoundLine, SoundSource, TrackLine, SONG_CREATOR,
    SONG_VERSION,
};
pub use wav_format::{decode_wav, frames_to_wav, write_wav};

use std::fmt;

/// Error type for format parsing.
#[derive(Debug)]
pub enum FormatError {
    /// Invalid file header or magic bytes
    InvalidHeader,
    /// Unexpected end of file
    UnexpectedEof,
    /// File written by a newer format version
    UnsupportedVersion(u32),
    /// WAV data is not plain PCM
    UnsupportedEncoding(u16),
    /// Malformed song line
    Syntax { line: usize, reason: &'static str },
    /// I/O error
    Io(String),
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatError::InvalidHeader => write!(f, "invalid header"),
            FormatError::UnexpectedEof => write!(f, "unexpected end of file"),
            FormatError::UnsupportedVersion(v) => {
                write!(f, "file version {} is newer than supported", v)
            }
            FormatError::UnsupportedEncoding(code) => {
                write!(f, "unsupported WAV encoding {} (only PCM)", code)
            }
            FormatError::Syntax { line, reason } => write!(f, "line {}: {}", line, reason),
            FormatError::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for FormatError {}

impl From<std::io::Error> for FormatError {
    fn from(e: std::io::Error) -> Self {
        FormatError::Io(e.to_string())
    }
}
