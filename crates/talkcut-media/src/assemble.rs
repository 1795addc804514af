//! Final video assembly from kept segments.
//!
//! Each kept interval is extracted with two-pass seeking (fast input seek
//! to get near the cut, accurate output seek from there) and re-encoded so
//! cuts land between keyframes, then the pieces are concatenated with the
//! concat demuxer using stream copy.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use talkcut_models::SpeechSegment;

use crate::command::FfmpegCommand;
use crate::error::{MediaError, MediaResult};

/// Segments at or below this duration are dropped before assembly.
pub const MIN_SEGMENT_SECS: f64 = 0.1;

/// Filter out segments too short to survive a cut.
pub fn keepable_segments(segments: &[SpeechSegment]) -> Vec<SpeechSegment> {
    segments
        .iter()
        .filter(|s| s.duration_secs() > MIN_SEGMENT_SECS)
        .copied()
        .collect()
}

/// Render the concat demuxer list for a set of extracted segment files.
fn concat_list(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| format!("file '{}'\n", p.display()))
        .collect()
}

/// Assemble `output` from the kept intervals of `input`.
///
/// Returns [`MediaError::NoSegmentsToKeep`] when no interval survives the
/// minimum-duration filter.
pub async fn assemble_video(
    input: &Path,
    output: &Path,
    segments: &[SpeechSegment],
) -> MediaResult<()> {
    let kept = keepable_segments(segments);
    if kept.is_empty() {
        return Err(MediaError::NoSegmentsToKeep);
    }

    debug!(
        input = %input.display(),
        output = %output.display(),
        segments = kept.len(),
        "Assembling final video"
    );

    let temp_dir = tempfile::tempdir()?;
    let mut segment_paths = Vec::with_capacity(kept.len());

    for (i, seg) in kept.iter().enumerate() {
        let seg_path = temp_dir.path().join(format!("seg_{:04}.mp4", i));

        // Fast input seek to within 5 s of the cut, accurate seek the rest.
        let fast_seek = if seg.start > 5.0 { seg.start - 5.0 } else { 0.0 };
        let accurate_seek = seg.start - fast_seek;

        debug!(
            segment = i,
            start_sec = seg.start,
            duration_sec = seg.duration_secs(),
            "Extracting segment"
        );

        FfmpegCommand::new(input, &seg_path)
            .seek(fast_seek)
            .output_seek(accurate_seek)
            .duration(seg.duration_secs())
            .video_codec("libx264")
            .preset("veryfast")
            .crf(20)
            .audio_codec("aac")
            .audio_bitrate("128k")
            .output_args(["-avoid_negative_ts", "make_zero"])
            .run()
            .await
            .map_err(|e| match e {
                MediaError::FfmpegFailed { message, stderr, exit_code } => {
                    MediaError::FfmpegFailed {
                        message: format!("Segment {} extraction failed: {}", i, message),
                        stderr,
                        exit_code,
                    }
                }
                other => other,
            })?;

        segment_paths.push(seg_path);
    }

    let list_path = temp_dir.path().join("concat.txt");
    tokio::fs::write(&list_path, concat_list(&segment_paths)).await?;

    FfmpegCommand::new(&list_path, output)
        .input_args(["-f", "concat", "-safe", "0"])
        .output_args(["-c", "copy", "-movflags", "+faststart"])
        .run()
        .await?;

    info!(
        segments = segment_paths.len(),
        output = %output.display(),
        "Final video assembled"
    );

    Ok(())
}
