//! Lock-free tap on the wide mix for meters and scopes.

use dt_engine::AudioHook;
use ringbuf::traits::{Consumer, Observer, Producer, Split};
use ringbuf::{HeapCons, HeapProd, HeapRb};

/// Full scale of the wide mix (0 dB).
const WIDE_FULL_SCALE: f32 = (32768 << 8) as f32;

/// Audio-thread side: pushes every mixed frame into a ring buffer.
///
/// Frames that do not fit are dropped; the audio thread never waits.
pub struct ScopeTap {
    producer: HeapProd<[i32; 2]>,
}

/// Control side of a [`ScopeTap`].
pub struct ScopeReader {
    consumer: HeapCons<[i32; 2]>,
}

impl ScopeTap {
    /// Create a tap holding up to `capacity` frames.
    pub fn new(capacity: usize) -> (ScopeTap, ScopeReader) {
        let (producer, consumer) = HeapRb::<[i32; 2]>::new(capacity).split();
        (ScopeTap { producer }, ScopeReader { consumer })
    }
}

impl AudioHook for ScopeTap {
    fn process(&mut self, buf: &[i32], frames: usize) {
        for pair in buf.chunks_exact(2).take(frames) {
            if self.producer.try_push([pair[0], pair[1]]).is_err() {
                break;
            }
        }
    }
}

impl ScopeReader {
    /// Frames waiting to be read.
    pub fn len(&self) -> usize {
        self.consumer.occupied_len()
    }

    pub fn is_empty(&self) -> bool {
        self.consumer.is_empty()
    }

    /// Move every waiting frame into `out`.
    pub fn drain_into(&mut self, out: &mut Vec<[i32; 2]>) {
        out.extend(self.consumer.pop_iter());
    }

    /// Drain and return the left/right peak relative to full scale, or
    /// `None` if nothing was mixed since the last call.
    pub fn drain_peak(&mut self) -> Option<(f32, f32)> {
        let mut peak: Option<(i32, i32)> = None;
        for [l, r] in self.consumer.pop_iter() {
            let (pl, pr) = peak.unwrap_or((0, 0));
            peak = Some((pl.max(l.saturating_abs()), pr.max(r.saturating_abs())));
        }
        peak.map(|(l, r)| (l as f32 / WIDE_FULL_SCALE, r as f32 / WIDE_FULL_SCALE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_arrive_in_order() {
        let (mut tap, mut reader) = ScopeTap::new(16);
        tap.process(&[1, 2, 3, 4, 5, 6], 3);
        assert_eq!(reader.len(), 3);
        let mut out = Vec::new();
        reader.drain_into(&mut out);
        assert_eq!(out, vec![[1, 2], [3, 4], [5, 6]]);
        assert!(reader.is_empty());
    }

    #[test]
    fn overflow_drops_newest() {
        let (mut tap, mut reader) = ScopeTap::new(2);
        tap.process(&[1, 1, 2, 2, 3, 3], 3);
        let mut out = Vec::new();
        reader.drain_into(&mut out);
        assert_eq!(out, vec![[1, 1], [2, 2]]);
    }

    #[test]
    fn peak_is_relative_to_full_scale() {
        let (mut tap, mut reader) = ScopeTap::new(8);
        assert_eq!(reader.drain_peak(), None);
        tap.process(&[16384 << 8, -(8192 << 8), -(16384 << 8), 0], 2);
        assert_eq!(reader.drain_peak(), Some((0.5, 0.25)));
        assert_eq!(reader.drain_peak(), None);
    }
}
