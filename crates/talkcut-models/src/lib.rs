//! Shared data models for the talkcut pipeline.
//!
//! This crate provides Serde-serializable types for:
//! - Speech segments detected on an audio timeline
//! - Transcribed segments produced by the transcription step
//! - Timestamp formatting for logs and prompts

pub mod segment;
pub mod timestamp;
pub mod transcript;

// Re-export common types
pub use segment::SpeechSegment;
pub use timestamp::format_seconds;
pub use transcript::TranscriptSegment;
