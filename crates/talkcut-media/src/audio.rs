//! Audio track extraction and slicing.
//!
//! Everything here conforms audio for the two consumers downstream:
//! raw mono PCM for speech detection, and WAV slices for transcription.

use std::path::Path;

use tempfile::NamedTempFile;
use tracing::debug;

use crate::command::FfmpegCommand;
use crate::error::{MediaError, MediaResult};

/// Sample rate audio is conformed to before detection (16 kHz is in the
/// classifier's accepted set and is plenty for speech).
pub const DETECTION_SAMPLE_RATE: u32 = 16_000;

/// Bytes per sample of the extracted PCM (s16le).
pub const DETECTION_SAMPLE_WIDTH: usize = 2;

/// Extract the audio track of `input` as raw s16le mono PCM at
/// `sample_rate`, fully buffered in memory.
///
/// FFmpeg handles demuxing, downmixing, and resampling, so the returned
/// bytes are ready for the detection engine as-is.
pub async fn extract_pcm(input: &Path, sample_rate: u32) -> MediaResult<Vec<u8>> {
    let temp_audio = NamedTempFile::new()?;

    debug!(
        input = %input.display(),
        sample_rate = sample_rate,
        "Extracting audio track to raw PCM"
    );

    FfmpegCommand::new(input, temp_audio.path())
        .no_video()
        .sample_rate(sample_rate)
        .channels(1)
        .format("s16le")
        .run()
        .await?;

    let bytes = tokio::fs::read(temp_audio.path()).await?;
    if bytes.is_empty() {
        return Err(MediaError::NoAudioData);
    }

    debug!(bytes = bytes.len(), "Audio extraction complete");

    Ok(bytes)
}

/// Slice `[start, end]` of the audio track to a 16 kHz mono WAV at
/// `output`, suitable for uploading to a transcription API.
pub async fn slice_to_wav(input: &Path, start: f64, end: f64, output: &Path) -> MediaResult<()> {
    FfmpegCommand::new(input, output)
        .seek(start)
        .duration((end - start).max(0.0))
        .no_video()
        .sample_rate(DETECTION_SAMPLE_RATE)
        .channels(1)
        .run()
        .await
}
