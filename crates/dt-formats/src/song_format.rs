//! DT42 song files.
//!
//! A song is a `DT42SONG<version>` header line followed by `LABEL:DATA`
//! lines:
//!
//! - `I<n>:path` loads a sample file into sound slot `n`
//! - `S<n>:fm2 <pitch> <fm> <decay>` defines a synth in slot `n`
//! - `<n>:steps` appends step data to track `n`
//! - `CREATOR`, `VERSION`, `AUTHOR`, `TITLE` describe the file
//!
//! Every line except track data is kept as a [`Tag`] in file order and
//! written back on save. Unknown labels are kept too.

use crate::FormatError;
use dt_ir::{Tag, TRACKS_MAX};
use std::io::Write;

/// Newest song format version this crate reads and the one it writes.
pub const SONG_VERSION: u32 = 1;

/// Value written to the `CREATOR` tag.
pub const SONG_CREATOR: &str = "DT-42 DrumToy";

const INFO_LABELS: [&str; 4] = ["CREATOR", "VERSION", "AUTHOR", "TITLE"];

/// Where a sound slot gets its sound from.
#[derive(Clone, Debug, PartialEq)]
pub enum SoundSource {
    /// Path of a WAV file, used as written
    Sample(String),
    /// Synth definition text
    Synth(String),
}

/// An `I<n>` or `S<n>` line.
#[derive(Clone, Debug, PartialEq)]
pub struct SoundLine {
    pub slot: usize,
    pub source: SoundSource,
}

/// A `<n>` line. Several lines for one track concatenate.
#[derive(Clone, Debug, PartialEq)]
pub struct TrackLine {
    pub track: usize,
    pub steps: String,
}

/// A parsed song file.
///
/// `sounds` is derived from the `I`/`S` tags while parsing; writing only
/// looks at `tags` and `tracks`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SongFile {
    pub version: u32,
    pub tags: Vec<Tag>,
    pub sounds: Vec<SoundLine>,
    pub tracks: Vec<TrackLine>,
}

impl SongFile {
    pub fn new() -> Self {
        Self {
            version: SONG_VERSION,
            ..Self::default()
        }
    }

    /// Data of the first tag with `label`.
    pub fn tag(&self, label: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|t| t.label == label)
            .map(|t| t.data.as_str())
    }

    /// Replace the first tag with `label`, or append a new one.
    pub fn set_tag(&mut self, label: &str, data: &str) {
        match self.tags.iter_mut().find(|t| t.label == label) {
            Some(tag) => tag.data = data.to_string(),
            None => self.tags.push(Tag::new(label, data)),
        }
    }

    /// Fill in the tags written on every save: this program as creator,
    /// and `AUTHOR`/`TITLE` where missing.
    pub fn stamp(&mut self, title: &str) {
        self.set_tag("CREATOR", SONG_CREATOR);
        self.set_tag("VERSION", env!("CARGO_PKG_VERSION"));
        if self.tag("AUTHOR").is_none() {
            self.set_tag("AUTHOR", "Unknown");
        }
        if self.tag("TITLE").is_none() {
            self.set_tag("TITLE", title);
        }
    }
}

/// Parse a song file.
pub fn parse_song(data: &[u8]) -> Result<SongFile, FormatError> {
    if data.len() < 8 {
        return Err(FormatError::UnexpectedEof);
    }
    if &data[0..4] != b"DT42" || &data[4..8] != b"SONG" {
        return Err(FormatError::InvalidHeader);
    }
    let version = leading_number(&data[8..]);
    if version > SONG_VERSION {
        return Err(FormatError::UnsupportedVersion(version));
    }

    let mut song = SongFile {
        version,
        ..SongFile::default()
    };

    let mut i = data[8..]
        .iter()
        .position(|&b| b == b'\n')
        .map_or(data.len(), |p| p + 8);

    loop {
        while i < data.len() && data[i] < b' ' {
            i += 1;
        }
        if i >= data.len() {
            break;
        }

        let line_start = i;
        while i < data.len() && data[i] != b':' && data[i] != b'\n' {
            i += 1;
        }
        if i >= data.len() || data[i] != b':' {
            return Err(FormatError::Syntax {
                line: line_number(data, line_start),
                reason: "missing ':' after label",
            });
        }
        let label = String::from_utf8_lossy(&data[line_start..i]).into_owned();

        i += 1;
        let data_start = i;
        while i < data.len() && data[i] != b'\n' {
            i += 1;
        }
        let mut value = &data[data_start..i];
        if let Some(stripped) = value.strip_suffix(b"\r") {
            value = stripped;
        }
        let value = String::from_utf8_lossy(value).into_owned();

        load_line(&mut song, label, value, line_number(data, line_start))?;
    }

    tracing::debug!(
        tags = song.tags.len(),
        sounds = song.sounds.len(),
        tracks = song.tracks.len(),
        "parsed song"
    );
    Ok(song)
}

fn load_line(song: &mut SongFile, label: String, data: String, line: usize) -> Result<(), FormatError> {
    if let Some(slot) = label.strip_prefix('I').and_then(parse_index) {
        song.sounds.push(SoundLine {
            slot,
            source: SoundSource::Sample(data.clone()),
        });
    } else if let Some(slot) = label.strip_prefix('S').and_then(parse_index) {
        song.sounds.push(SoundLine {
            slot,
            source: SoundSource::Synth(data.clone()),
        });
    } else if let Some(track) = parse_index(&label) {
        if track >= TRACKS_MAX {
            return Err(FormatError::Syntax {
                line,
                reason: "track index out of range",
            });
        }
        song.tracks.push(TrackLine { track, steps: data });
        return Ok(());
    } else if INFO_LABELS.contains(&label.as_str()) {
        tracing::info!(label = label.as_str(), value = data.as_str(), "song info");
    } else {
        tracing::warn!(label = label.as_str(), line, "unknown song tag");
    }

    song.tags.push(Tag { label, data });
    Ok(())
}

/// Write a song file: header, tags, a blank line, then one line per
/// non-empty track.
pub fn write_song(w: &mut impl Write, song: &SongFile) -> std::io::Result<()> {
    writeln!(w, "DT42SONG{}", SONG_VERSION)?;
    for tag in &song.tags {
        writeln!(w, "{}:{}", tag.label, tag.data)?;
    }
    writeln!(w)?;
    for track in &song.tracks {
        if !track.steps.is_empty() {
            writeln!(w, "{}:{}", track.track, track.steps)?;
        }
    }
    Ok(())
}

/// A non-empty run of decimal digits.
fn parse_index(s: &str) -> Option<usize> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Value of the digits at the start of `data`; 0 if there are none.
fn leading_number(data: &[u8]) -> u32 {
    data.iter()
        .take_while(|b| b.is_ascii_digit())
        .fold(0u32, |n, &b| n.saturating_mul(10).saturating_add((b - b'0') as u32))
}

fn line_number(data: &[u8], pos: usize) -> usize {
    1 + data[..pos].iter().filter(|&&b| b == b'\n').count()
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEMO: &str = "DT42SONG1\n\
        CREATOR:DT-42 DrumToy\n\
        I0:kick.wav\n\
        S1:fm2 48 0.5 2\n\
        AUTHOR:someone\n\
        \n\
        0:9...9...\n\
        1:..5...5.\n\
        0:C\n";

    #[test]
    fn parse_demo_song() {
        let song = parse_song(DEMO.as_bytes()).unwrap();
        assert_eq!(song.version, 1);
        assert_eq!(song.tags.len(), 4);
        assert_eq!(song.tags[1], Tag::new("I0", "kick.wav"));
        assert_eq!(song.tag("AUTHOR"), Some("someone"));
        assert_eq!(
            song.sounds,
            vec![
                SoundLine { slot: 0, source: SoundSource::Sample("kick.wav".into()) },
                SoundLine { slot: 1, source: SoundSource::Synth("fm2 48 0.5 2".into()) },
            ]
        );
        assert_eq!(song.tracks.len(), 3);
        assert_eq!(song.tracks[2], TrackLine { track: 0, steps: "C".into() });
    }

    #[test]
    fn unknown_labels_are_kept() {
        let song = parse_song(b"DT42SONG1\nBPM:140\nIX:foo\n").unwrap();
        assert_eq!(song.tags, vec![Tag::new("BPM", "140"), Tag::new("IX", "foo")]);
        assert!(song.sounds.is_empty());
    }

    #[test]
    fn crlf_and_missing_final_newline() {
        let song = parse_song(b"DT42SONG1\r\nTITLE:x\r\n\r\n3:9.9").unwrap();
        assert_eq!(song.tag("TITLE"), Some("x"));
        assert_eq!(song.tracks, vec![TrackLine { track: 3, steps: "9.9".into() }]);
    }

    #[test]
    fn data_may_contain_colons() {
        let song = parse_song(b"DT42SONG1\nI2:C:/drums/snare.wav\n").unwrap();
        assert_eq!(
            song.sounds[0].source,
            SoundSource::Sample("C:/drums/snare.wav".into())
        );
    }

    #[test]
    fn bad_magic_rejected() {
        assert!(matches!(parse_song(b"DT43SONG1\n"), Err(FormatError::InvalidHeader)));
        assert!(matches!(parse_song(b"DT42SUNG1\n"), Err(FormatError::InvalidHeader)));
        assert!(matches!(parse_song(b"DT4"), Err(FormatError::UnexpectedEof)));
    }

    #[test]
    fn newer_version_rejected() {
        assert!(matches!(
            parse_song(b"DT42SONG2\n0:9\n"),
            Err(FormatError::UnsupportedVersion(2))
        ));
        assert_eq!(parse_song(b"DT42SONG\n").unwrap().version, 0);
    }

    #[test]
    fn line_without_colon_is_an_error() {
        match parse_song(b"DT42SONG1\nTITLE:ok\nnonsense\n0:9\n") {
            Err(FormatError::Syntax { line, .. }) => assert_eq!(line, 3),
            other => panic!("expected syntax error, got {:?}", other),
        }
    }

    #[test]
    fn track_index_out_of_range() {
        assert!(matches!(
            parse_song(b"DT42SONG1\n16:9\n"),
            Err(FormatError::Syntax { line: 2, .. })
        ));
    }

    #[test]
    fn stamp_fills_missing_tags() {
        let mut song = SongFile::new();
        song.set_tag("AUTHOR", "me");
        song.stamp("beat.dt42");
        assert_eq!(song.tag("CREATOR"), Some(SONG_CREATOR));
        assert_eq!(song.tag("VERSION"), Some(env!("CARGO_PKG_VERSION")));
        assert_eq!(song.tag("AUTHOR"), Some("me"));
        assert_eq!(song.tag("TITLE"), Some("beat.dt42"));
        assert_eq!(song.tags[0].label, "AUTHOR");
    }

    #[test]
    fn write_layout() {
        let mut song = SongFile::new();
        song.tags.push(Tag::new("S0", "fm2 40 1 1"));
        song.tracks.push(TrackLine { track: 0, steps: "9.9.".into() });
        song.tracks.push(TrackLine { track: 1, steps: String::new() });
        song.tracks.push(TrackLine { track: 2, steps: "5".into() });
        let mut out = Vec::new();
        write_song(&mut out, &song).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "DT42SONG1\nS0:fm2 40 1 1\n\n0:9.9.\n2:5\n"
        );
    }

    #[test]
    fn written_song_parses_back() {
        let song = parse_song(DEMO.as_bytes()).unwrap();
        let mut out = Vec::new();
        write_song(&mut out, &song).unwrap();
        let again = parse_song(&out).unwrap();
        assert_eq!(again.tags, song.tags);
        assert_eq!(again.sounds, song.sounds);
        assert_eq!(again.tracks, song.tracks);
    }
}
