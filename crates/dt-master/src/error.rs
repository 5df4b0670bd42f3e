//! Controller error type.

use dt_audio::AudioError;
use dt_engine::LoadError;
use dt_formats::FormatError;
use std::fmt;

/// Anything that can go wrong on the control side.
#[derive(Debug)]
pub enum ControllerError {
    /// A sound could not be loaded into the bank
    Load(LoadError),
    /// A song or sample file could not be parsed
    Format(FormatError),
    /// The audio device failed
    Audio(AudioError),
    /// Reading or writing a file failed
    Io(std::io::Error),
}

impl fmt::Display for ControllerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControllerError::Load(e) => write!(f, "load error: {}", e),
            ControllerError::Format(e) => write!(f, "format error: {}", e),
            ControllerError::Audio(e) => write!(f, "audio error: {}", e),
            ControllerError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for ControllerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ControllerError::Load(e) => Some(e),
            ControllerError::Format(e) => Some(e),
            ControllerError::Audio(e) => Some(e),
            ControllerError::Io(e) => Some(e),
        }
    }
}

impl From<LoadError> for ControllerError {
    fn from(e: LoadError) -> Self {
        ControllerError::Load(e)
    }
}

impl From<FormatError> for ControllerError {
    fn from(e: FormatError) -> Self {
        ControllerError::Format(e)
    }
}

impl From<AudioError> for ControllerError {
    fn from(e: AudioError) -> Self {
        ControllerError::Audio(e)
    }
}

impl From<std::io::Error> for ControllerError {
    fn from(e: std::io::Error) -> Self {
        ControllerError::Io(e)
    }
}
