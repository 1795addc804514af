//! Batch video trimming worker.
//!
//! This crate provides:
//! - Environment-driven configuration
//! - OpenAI clients for transcription and transcript filtering
//! - The per-video processing pipeline
//! - JSON artifact persistence

pub mod config;
pub mod error;
pub mod files;
pub mod openai;
pub mod processor;

pub use config::WorkerConfig;
pub use error::{WorkerError, WorkerResult};
pub use openai::OpenAiClient;
pub use processor::VideoProcessor;
