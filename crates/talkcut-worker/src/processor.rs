//! Per-video processing pipeline.
//!
//! For each video: probe, extract the audio track, detect speech segments,
//! transcribe them, let the chat model drop redundant takes, and assemble
//! the final cut. Every intermediate result is persisted as JSON next to
//! the working directory so runs can be inspected and resumed by hand.

use std::path::{Path, PathBuf};

use tracing::{debug, error, info};

use talkcut_media::{
    assemble_video, extract_pcm, probe_media, slice_to_wav, DETECTION_SAMPLE_RATE,
    DETECTION_SAMPLE_WIDTH,
};
use talkcut_models::{format_seconds, SpeechSegment, TranscriptSegment};
use talkcut_vad::{detect_speech_segments, AudioBuffer};

use crate::config::WorkerConfig;
use crate::error::WorkerResult;
use crate::files::{save_json, video_files};
use crate::openai::OpenAiClient;

/// Drives the full pipeline for a batch of videos.
pub struct VideoProcessor {
    config: WorkerConfig,
    client: OpenAiClient,
}

impl VideoProcessor {
    /// Create a processor from the worker configuration.
    pub fn new(config: WorkerConfig) -> Self {
        let client = OpenAiClient::new(&config);
        Self { config, client }
    }

    /// Process every supported video in the raw directory.
    ///
    /// A failure on one file is logged and does not abort the batch.
    pub async fn process_all(&self) -> WorkerResult<()> {
        let videos = video_files(&self.config.raw_video_dir).await?;

        if videos.is_empty() {
            info!(
                dir = %self.config.raw_video_dir.display(),
                "No videos to process"
            );
            return Ok(());
        }

        info!(count = videos.len(), "Starting batch");

        for video in &videos {
            if let Err(err) = self.process_video(video).await {
                error!(
                    video = %video.display(),
                    error = %err,
                    "Video processing failed"
                );
            }
        }

        Ok(())
    }

    /// Run the full pipeline for one video.
    pub async fn process_video(&self, video_path: &Path) -> WorkerResult<()> {
        let media = probe_media(video_path).await?;
        info!(
            video = %video_path.display(),
            duration = %format_seconds(media.duration),
            has_audio = media.has_audio,
            "Processing video"
        );

        // Detect speech on the extracted audio track.
        let pcm = extract_pcm(video_path, DETECTION_SAMPLE_RATE).await?;
        let buffer = AudioBuffer::new(pcm, DETECTION_SAMPLE_RATE, DETECTION_SAMPLE_WIDTH);
        let segments = detect_speech_segments(&buffer, &self.config.detection)?;

        save_json(&segments, &artifact_path(video_path, "raw_segments")).await?;

        if segments.is_empty() {
            info!(video = %video_path.display(), "No speech detected, nothing to cut");
            return Ok(());
        }

        // Transcribe each detected segment.
        let transcript = self.transcribe_segments(video_path, &segments).await?;
        save_json(&transcript, &artifact_path(video_path, "transcription")).await?;

        // Let the chat model drop redundant takes; fail-open inside.
        let suggestion = self.client.filter_transcript(&transcript).await;
        save_json(&suggestion, &artifact_path(video_path, "suggestion")).await?;

        if suggestion.is_empty() {
            info!(video = %video_path.display(), "All segments filtered out, skipping assembly");
            return Ok(());
        }

        // Assemble the final cut from the surviving intervals.
        tokio::fs::create_dir_all(&self.config.edited_video_dir).await?;
        let output = self
            .config
            .edited_video_dir
            .join(video_path.file_name().unwrap_or_default());
        let keep: Vec<SpeechSegment> = suggestion.iter().map(|t| t.segment()).collect();

        assemble_video(video_path, &output, &keep).await?;

        info!(output = %output.display(), "Final video written");
        Ok(())
    }

    async fn transcribe_segments(
        &self,
        video_path: &Path,
        segments: &[SpeechSegment],
    ) -> WorkerResult<Vec<TranscriptSegment>> {
        let mut transcript = Vec::with_capacity(segments.len());

        for seg in segments {
            let wav = tempfile::Builder::new().suffix(".wav").tempfile()?;
            slice_to_wav(video_path, seg.start, seg.end, wav.path()).await?;

            debug!(
                start = %format_seconds(seg.start),
                end = %format_seconds(seg.end),
                "Transcribing segment"
            );

            let text = self.client.transcribe_wav(wav.path()).await?;
            transcript.push(TranscriptSegment::new(*seg, text));
        }

        Ok(transcript)
    }
}

/// Artifact path for a video: `<stem>_<suffix>.json` in the video's
/// directory.
fn artifact_path(video_path: &Path, suffix: &str) -> PathBuf {
    let stem = video_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("video");
    video_path.with_file_name(format!("{}_{}.json", stem, suffix))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_path() {
        let path = artifact_path(Path::new("/data/raw/intro.mp4"), "raw_segments");
        assert_eq!(path, PathBuf::from("/data/raw/intro_raw_segments.json"));
    }

    #[test]
    fn test_artifact_path_keeps_directory() {
        let path = artifact_path(Path::new("clip.mov"), "suggestion");
        assert_eq!(path, PathBuf::from("clip_suggestion.json"));
    }
}
