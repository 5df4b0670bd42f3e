//! CPAL-based audio output backend.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, SampleRate, Stream, StreamConfig};
use dt_engine::{Engine, Frame, SharedEngine, MAX_FRAGMENT};
use dt_ir::SAMPLE_RATE;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::traits::{AudioError, AudioOutput};

/// CPAL-based audio output.
///
/// The stream callback locks the engine once per device buffer and renders
/// it in blocks of at most [`MAX_FRAGMENT`] frames into preallocated scratch.
pub struct CpalOutput {
    device: Device,
    config: StreamConfig,
    stream: Option<Stream>,
    running: Arc<AtomicBool>,
}

impl CpalOutput {
    /// Open the default output device at the engine's fixed rate.
    pub fn new() -> Result<Self, AudioError> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(AudioError::NoDevice)?;

        let config = device
            .default_output_config()
            .map_err(|e| AudioError::DeviceInit(e.to_string()))?;

        let mut config: StreamConfig = config.into();
        // The callback assumes 2-channel interleaving
        config.channels = 2;
        if config.sample_rate.0 != SAMPLE_RATE {
            tracing::warn!(
                default_rate = config.sample_rate.0,
                "device default rate differs, requesting {} Hz",
                SAMPLE_RATE
            );
            config.sample_rate = SampleRate(SAMPLE_RATE);
        }

        let name = device.name().unwrap_or_else(|_| "unknown".to_string());
        tracing::info!(device = name.as_str(), "opened audio device");

        Ok(Self {
            device,
            config,
            stream: None,
            running: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Build the stream that pulls from `engine`. Outputs silence until
    /// [`start`](AudioOutput::start) is called.
    pub fn build_stream(&mut self, engine: SharedEngine) -> Result<(), AudioError> {
        let running = self.running.clone();
        let channels = self.config.channels as usize;
        let mut scratch = vec![Frame::silence(); MAX_FRAGMENT];

        let stream = self
            .device
            .build_output_stream(
                &self.config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    if !running.load(Ordering::Relaxed) {
                        data.fill(0.0);
                        return;
                    }
                    let mut engine = engine.lock();
                    #[cfg(feature = "alloc_check")]
                    assert_no_alloc::assert_no_alloc(|| {
                        fill_buffer(&mut engine, &mut scratch, data, channels)
                    });
                    #[cfg(not(feature = "alloc_check"))]
                    fill_buffer(&mut engine, &mut scratch, data, channels);
                },
                |err| tracing::error!(%err, "audio stream error"),
                None,
            )
            .map_err(|e| AudioError::StreamCreate(e.to_string()))?;

        stream.play().map_err(|e| AudioError::Playback(e.to_string()))?;
        self.stream = Some(stream);
        tracing::debug!(
            channels,
            sample_rate = self.config.sample_rate.0,
            "audio stream built"
        );

        Ok(())
    }
}

/// Render interleaved float output, zero-filling any channels past stereo.
fn fill_buffer(engine: &mut Engine, scratch: &mut [Frame], data: &mut [f32], channels: usize) {
    for block in data.chunks_mut(scratch.len() * channels) {
        let frames = block.len() / channels;
        let out = &mut scratch[..frames];
        engine.render(out);
        for (chunk, frame) in block.chunks_mut(channels).zip(out.iter()) {
            let (left, right) = frame.to_f32();
            for (i, sample) in chunk.iter_mut().enumerate() {
                *sample = match i {
                    0 => left,
                    1 => right,
                    _ => 0.0,
                };
            }
        }
    }
}

impl AudioOutput for CpalOutput {
    fn sample_rate(&self) -> u32 {
        self.config.sample_rate.0
    }

    fn start(&mut self) -> Result<(), AudioError> {
        self.running.store(true, Ordering::Relaxed);
        if let Some(ref stream) = self.stream {
            stream.play().map_err(|e| AudioError::Playback(e.to_string()))?;
        }
        Ok(())
    }

    fn stop(&mut self) -> Result<(), AudioError> {
        self.running.store(false, Ordering::Relaxed);
        if let Some(ref stream) = self.stream {
            stream.pause().map_err(|e| AudioError::Playback(e.to_string()))?;
        }
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }
}
