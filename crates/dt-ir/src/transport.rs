//! Loop window for the sequencer transport.

/// Loop bounds as set by the user.
///
/// Playback wraps when the next position would reach `end`. Bounds are
/// stored as given; a `start` past `end` is not reordered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoopWindow {
    /// Position to wrap to (0 when unset)
    pub start: Option<usize>,
    /// First position past the loop; no looping when unset
    pub end: Option<usize>,
}

impl LoopWindow {
    /// No looping.
    pub const NONE: Self = Self { start: None, end: None };

    /// Loop over `[start, end)`.
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    /// Returns true if the window causes wrapping.
    pub fn is_active(&self) -> bool {
        self.end.is_some()
    }

    /// Apply the window to a candidate next position.
    pub fn wrap(&self, next: usize) -> usize {
        match self.end {
            Some(end) if next >= end => self.start.unwrap_or(0),
            _ => next,
        }
    }
}
