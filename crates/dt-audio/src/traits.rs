//! Audio output trait and error types.

/// Failures opening or driving the output device.
#[derive(Debug)]
pub enum AudioError {
    /// Failed to initialize audio device
    DeviceInit(String),
    /// Failed to create audio stream
    StreamCreate(String),
    /// Playback error
    Playback(String),
    /// No audio device available
    NoDevice,
}

impl std::fmt::Display for AudioError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AudioError::DeviceInit(msg) => write!(f, "cannot open audio device: {}", msg),
            AudioError::StreamCreate(msg) => write!(f, "cannot create audio stream: {}", msg),
            AudioError::Playback(msg) => write!(f, "playback failed: {}", msg),
            AudioError::NoDevice => write!(f, "no audio output device available"),
        }
    }
}

impl std::error::Error for AudioError {}

/// A device that pulls audio from the engine on its own schedule.
pub trait AudioOutput {
    /// Device sample rate.
    fn sample_rate(&self) -> u32;

    /// Start pulling audio.
    fn start(&mut self) -> Result<(), AudioError>;

    /// Stop pulling audio. The device outputs silence.
    fn stop(&mut self) -> Result<(), AudioError>;

    /// Whether audio is currently being pulled.
    fn is_running(&self) -> bool;
}
