//! Fixed-duration framing of a PCM buffer.

use crate::buffer::AudioBuffer;

/// A fixed-duration slice of PCM audio with its position on the timeline.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    /// Offset of the first byte of this frame, in seconds.
    pub timestamp: f64,
    /// Raw PCM bytes, always exactly one frame long.
    pub bytes: &'a [u8],
}

/// Number of samples in one frame of `frame_duration_ms` at `sample_rate`.
pub fn frame_size_samples(sample_rate: u32, frame_duration_ms: u32) -> usize {
    (sample_rate as f64 * frame_duration_ms as f64 / 1000.0).round() as usize
}

/// Slice `buffer` into consecutive non-overlapping fixed-duration frames.
///
/// A trailing remainder shorter than one frame is dropped, never
/// zero-padded. The iterator borrows the buffer, so framing restarts by
/// calling this again with the same buffer.
///
/// `frame_duration_ms` must be positive; the `detect_speech_segments`
/// boundary validates this before framing begins.
pub fn frames(buffer: &AudioBuffer, frame_duration_ms: u32) -> impl Iterator<Item = Frame<'_>> {
    let frame_bytes = frame_size_samples(buffer.sample_rate(), frame_duration_ms) * buffer.sample_width();
    let bytes_per_second = buffer.bytes_per_second() as f64;

    buffer
        .data()
        .chunks_exact(frame_bytes)
        .enumerate()
        .map(move |(i, chunk)| Frame {
            timestamp: (i * frame_bytes) as f64 / bytes_per_second,
            bytes: chunk,
        })
}
