//! Headless controller for DrumToy.
//!
//! Provides one API for loading and saving songs, editing, live playback
//! and offline rendering, shared by the CLI and any front end.

mod error;

use dt_audio::{AudioOutput, CpalOutput, ScopeReader, ScopeTap};
use dt_engine::{Engine, SharedEngine};
use dt_formats::{SongFile, SoundLine, SoundSource, TrackLine};
use dt_ir::{LoopWindow, Pcm, SynthDef, Tag, SAMPLE_RATE, TRACKS_MAX};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

// Re-export common types so callers don't need dt-ir/dt-engine directly.
pub use dt_engine::{Frame, LoadError};
pub use dt_formats::{frames_to_wav, write_wav, FormatError};
pub use error::ControllerError;

/// A sound decoded from disk, ready to go into the bank.
enum PreparedSound {
    Sample { name: String, pcm: Pcm },
    Synth(SynthDef),
}

/// Headless DrumToy controller: owns the engine, the song's tags and the
/// audio device.
pub struct Controller {
    engine: SharedEngine,
    tags: Vec<Tag>,
    output: Option<CpalOutput>,
}

impl Controller {
    pub fn new() -> Self {
        Self {
            engine: SharedEngine::new(Engine::new()),
            tags: Vec::new(),
            output: None,
        }
    }

    /// The shared engine, for callers that need direct access.
    pub fn engine(&self) -> &SharedEngine {
        &self.engine
    }

    // --- Song management ---

    /// Tags of the current song, in file order.
    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    pub fn tag(&self, label: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|t| t.label == label)
            .map(|t| t.data.as_str())
    }

    /// Set or add a tag written on the next save.
    pub fn set_tag(&mut self, label: &str, data: &str) {
        match self.tags.iter_mut().find(|t| t.label == label) {
            Some(tag) => tag.data = data.to_string(),
            None => self.tags.push(Tag::new(label, data)),
        }
    }

    /// Replace the current song with the one in `path`.
    ///
    /// Files are read and decoded before the engine is touched; the song is
    /// then applied in one go. If the file cannot be read or parsed the current
    /// song is kept; if a sound fails to load the engine is left empty.
    pub fn load_song(&mut self, path: impl AsRef<Path>) -> Result<(), ControllerError> {
        let path = path.as_ref();
        tracing::info!(path = %path.display(), "loading song");

        let song = dt_formats::parse_song(&fs::read(path)?)?;
        let prepared = song
            .sounds
            .iter()
            .map(|line| prepare_sound(line).map(|sound| (line.slot, sound)));
        let sounds = match prepared.collect::<Result<Vec<_>, _>>() {
            Ok(sounds) => sounds,
            Err(e) => {
                self.clear();
                return Err(e);
            }
        };

        let applied = self.engine.with(|engine| {
            engine.clear();
            engine.set_position(0);
            let applied = apply_song(engine, &sounds, &song.tracks);
            if applied.is_err() {
                engine.clear();
            }
            applied
        });

        match applied {
            Ok(()) => {
                self.tags = song.tags;
                tracing::info!(
                    sounds = sounds.len(),
                    tracks = song.tracks.len(),
                    "song loaded"
                );
                Ok(())
            }
            Err(e) => {
                self.tags.clear();
                Err(e.into())
            }
        }
    }

    /// Write the current song to `path`.
    ///
    /// Stamps `CREATOR` and `VERSION`, and fills in `AUTHOR` and `TITLE` if
    /// the song has none. The stamped tags are kept.
    pub fn save_song(&mut self, path: impl AsRef<Path>) -> Result<(), ControllerError> {
        let path = path.as_ref();
        let mut song = SongFile::new();
        song.tags = std::mem::take(&mut self.tags);
        song.stamp(&path.to_string_lossy());
        song.tracks = self.engine.with(|engine| {
            engine
                .tracks()
                .iter()
                .enumerate()
                .map(|(track, t)| TrackLine {
                    track,
                    steps: String::from_utf8_lossy(t.steps()).into_owned(),
                })
                .collect()
        });

        let written = fs::File::create(path).and_then(|file| {
            let mut w = BufWriter::new(file);
            dt_formats::write_song(&mut w, &song)?;
            w.flush()
        });
        self.tags = song.tags;
        written?;

        tracing::info!(path = %path.display(), "song saved");
        Ok(())
    }

    /// Drop all tracks, sounds and tags.
    pub fn clear(&mut self) {
        self.engine.with(Engine::clear);
        self.tags.clear();
    }

    /// Load a WAV file into `slot` and remember it for saving. The slot is
    /// emptied first, so a failed load leaves it empty.
    pub fn load_sample(&mut self, slot: usize, path: &str) -> Result<(), ControllerError> {
        self.unload(slot);
        let sound = prepare_sound(&SoundLine {
            slot,
            source: SoundSource::Sample(path.to_string()),
        })?;
        self.engine.with(|engine| install_sound(engine, slot, &sound))?;
        self.tags.push(Tag::new(&format!("I{}", slot), path));
        Ok(())
    }

    /// Define a synth in `slot` and remember it for saving.
    pub fn load_synth(&mut self, slot: usize, def: &str) -> Result<(), ControllerError> {
        self.forget_sound(slot);
        self.engine.with(|engine| engine.load_synth(slot, def))?;
        self.tags.push(Tag::new(&format!("S{}", slot), def));
        Ok(())
    }

    /// Empty `slot` and drop its tag.
    pub fn unload(&mut self, slot: usize) {
        self.forget_sound(slot);
        self.engine.with(|engine| engine.unload(slot));
    }

    fn forget_sound(&mut self, slot: usize) {
        let sample = format!("I{}", slot);
        let synth = format!("S{}", slot);
        self.tags.retain(|t| t.label != sample && t.label != synth);
    }

    // --- Editing ---

    /// Append step data to a track.
    pub fn add(&mut self, track: usize, steps: &str) {
        self.engine.with(|engine| engine.add(track, steps.as_bytes()));
    }

    pub fn note(&self, pos: usize, track: usize) -> Option<u8> {
        self.engine.with(|engine| engine.note(pos, track))
    }

    pub fn set_note(&mut self, pos: usize, track: usize, symbol: u8) -> bool {
        self.engine.with(|engine| engine.set_note(pos, track, symbol))
    }

    /// Step data of `track` as text.
    pub fn track_steps(&self, track: usize) -> Option<String> {
        self.engine.with(|engine| {
            engine
                .track(track)
                .map(|t| String::from_utf8_lossy(t.steps()).into_owned())
        })
    }

    /// Length of the longest track.
    pub fn song_length(&self) -> usize {
        self.engine
            .with(|engine| engine.tracks().iter().map(|t| t.len()).max().unwrap_or(0))
    }

    pub fn mute(&mut self, track: usize, mute: bool) {
        self.engine.with(|engine| engine.mute(track, mute));
    }

    pub fn is_muted(&self, track: usize) -> bool {
        self.engine.with(|engine| engine.is_muted(track))
    }

    /// Preview a note on `track`.
    pub fn play_note(&mut self, track: usize, symbol: u8) {
        self.engine.with(|engine| engine.play_note(track, symbol));
    }

    // --- Transport ---

    pub fn set_tempo(&mut self, bpm: f32) {
        self.engine.with(|engine| engine.set_tempo(bpm));
    }

    pub fn tempo(&self) -> f32 {
        self.engine.with(|engine| engine.tempo())
    }

    pub fn pause(&mut self, paused: bool) {
        self.engine.with(|engine| engine.pause(paused));
    }

    pub fn is_paused(&self) -> bool {
        self.engine.with(|engine| engine.is_paused())
    }

    /// The step currently sounding.
    pub fn position(&self) -> usize {
        self.engine.with(|engine| engine.position())
    }

    pub fn set_position(&mut self, pos: usize) {
        self.engine.with(|engine| engine.set_position(pos));
    }

    /// Loop over `[start, end)`.
    pub fn set_loop(&mut self, start: usize, end: usize) {
        self.engine
            .with(|engine| engine.set_loop(LoopWindow::new(start, end)));
    }

    pub fn clear_loop(&mut self) {
        self.engine.with(|engine| engine.set_loop(LoopWindow::NONE));
    }

    pub fn loop_window(&self) -> LoopWindow {
        self.engine.with(|engine| engine.loop_window())
    }

    // --- Real-time playback ---

    /// Start live output, opening the audio device on first use.
    pub fn play(&mut self) -> Result<(), ControllerError> {
        if self.output.is_none() {
            let mut output = CpalOutput::new()?;
            output.build_stream(self.engine.clone())?;
            self.output = Some(output);
        }
        if let Some(output) = &mut self.output {
            output.start()?;
            tracing::debug!("playback started");
        }
        Ok(())
    }

    /// Silence live output. The device stays open.
    pub fn stop(&mut self) -> Result<(), ControllerError> {
        if let Some(output) = &mut self.output {
            output.stop()?;
        }
        Ok(())
    }

    pub fn is_playing(&self) -> bool {
        self.output.as_ref().is_some_and(|o| o.is_running())
    }

    /// Tap the mix for a level meter or scope holding up to `capacity`
    /// frames. Replaces any previous tap.
    pub fn scope(&mut self, capacity: usize) -> ScopeReader {
        let (tap, reader) = ScopeTap::new(capacity);
        self.engine
            .with(|engine| engine.set_audio_hook(Some(Box::new(tap))));
        reader
    }

    // --- Offline rendering ---

    /// Render `frames` frames from the current transport position.
    pub fn render_frames(&mut self, frames: usize) -> Vec<Frame> {
        self.engine.with(|engine| engine.render_frames(frames))
    }

    /// Render `seconds` of audio as a 16-bit stereo WAV file.
    pub fn render_to_wav(&mut self, seconds: u32) -> Vec<u8> {
        let frames = self.render_frames(seconds_to_frames(seconds));
        frames_to_wav(&frames, SAMPLE_RATE)
    }
}

impl Default for Controller {
    fn default() -> Self {
        Self::new()
    }
}

fn seconds_to_frames(seconds: u32) -> usize {
    (SAMPLE_RATE as usize).saturating_mul(seconds as usize)
}

/// Read and decode whatever a sound line refers to.
fn prepare_sound(line: &SoundLine) -> Result<PreparedSound, ControllerError> {
    match &line.source {
        SoundSource::Sample(path) => {
            let data = fs::read(path).map_err(|e| LoadError::Io(format!("{}: {}", path, e)))?;
            let pcm = dt_formats::decode_wav(&data)?;
            let name = Path::new(path)
                .file_stem()
                .map_or_else(|| path.clone(), |s| s.to_string_lossy().into_owned());
            tracing::debug!(slot = line.slot, path = path.as_str(), "decoded sample");
            Ok(PreparedSound::Sample { name, pcm })
        }
        SoundSource::Synth(def) => {
            let synth = SynthDef::parse(def).map_err(LoadError::from)?;
            Ok(PreparedSound::Synth(synth))
        }
    }
}

fn install_sound(engine: &mut Engine, slot: usize, sound: &PreparedSound) -> Result<(), LoadError> {
    match sound {
        PreparedSound::Sample { name, pcm } => engine.load_sample(slot, name, pcm),
        PreparedSound::Synth(synth) => engine.load_synth_def(slot, synth.clone()),
    }
}

fn apply_song(
    engine: &mut Engine,
    sounds: &[(usize, PreparedSound)],
    tracks: &[TrackLine],
) -> Result<(), LoadError> {
    for (slot, sound) in sounds {
        install_sound(engine, *slot, sound)?;
    }
    for line in tracks.iter().filter(|t| t.track < TRACKS_MAX) {
        engine.add(line.track, line.steps.as_bytes());
    }
    Ok(())
}
