//! Per-frame speech classification with a fail-open adapter.
//!
//! The classifier is a black box: one PCM frame goes in, a speech verdict
//! comes out. A classifier failure on a single frame must never abort
//! detection for an entire file, so the adapter records the frame as
//! non-speech, logs the failure, and keeps going.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;
use webrtc_vad::{SampleRate, Vad, VadMode};

use crate::framer::Frame;

/// Errors from a single classification attempt.
#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("sample rate {0} Hz is not accepted by the classifier")]
    UnsupportedSampleRate(u32),

    #[error("frame sample rate {got} Hz does not match the classifier's {expected} Hz")]
    SampleRateMismatch { expected: u32, got: u32 },

    #[error("frame length {0} bytes is not 16-bit PCM")]
    OddFrameLength(usize),

    #[error("classifier rejected a frame of {0} samples")]
    RejectedFrame(usize),
}

/// A per-frame speech verdict on the audio timeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeechFlag {
    /// Timestamp of the classified frame, in seconds.
    pub timestamp: f64,
    /// Whether the frame contains speech.
    pub is_speech: bool,
}

/// Frame-level speech/non-speech predicate.
///
/// Implementations may keep internal state between frames (the WebRTC VAD
/// does), hence `&mut self`.
pub trait SpeechClassifier {
    /// Decide whether one frame of mono PCM contains speech.
    fn is_speech(&mut self, frame: &[u8], sample_rate: u32) -> Result<bool, ClassifierError>;
}

/// Classifier aggressiveness (0-3), forwarded to the VAD unchanged.
///
/// Higher modes are stricter about what counts as speech, which reduces
/// false positives but may miss quiet speech.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Aggressiveness {
    /// Least aggressive; best for clean audio
    Quality = 0,
    /// Low bitrate optimised
    LowBitrate = 1,
    /// More aggressive; good for moderate background noise
    Aggressive = 2,
    /// Most aggressive; best for noisy recordings
    #[default]
    VeryAggressive = 3,
}

impl Aggressiveness {
    /// Map a numeric level (0-3) to a mode. Returns `None` out of range.
    pub fn from_level(level: u8) -> Option<Self> {
        match level {
            0 => Some(Self::Quality),
            1 => Some(Self::LowBitrate),
            2 => Some(Self::Aggressive),
            3 => Some(Self::VeryAggressive),
            _ => None,
        }
    }
}

impl From<Aggressiveness> for VadMode {
    fn from(mode: Aggressiveness) -> Self {
        match mode {
            Aggressiveness::Quality => VadMode::Quality,
            Aggressiveness::LowBitrate => VadMode::LowBitrate,
            Aggressiveness::Aggressive => VadMode::Aggressive,
            Aggressiveness::VeryAggressive => VadMode::VeryAggressive,
        }
    }
}

/// Production classifier backed by the WebRTC GMM voice activity detector.
///
/// Accepts 8000/16000/32000/48000 Hz and frames of 10, 20, or 30 ms of
/// 16-bit mono PCM; anything else is rejected per frame and fails open.
///
/// The underlying handle is `!Send`: construct one per detection run on
/// the thread that drives it.
pub struct WebRtcClassifier {
    vad: Vad,
    sample_rate: u32,
}

impl WebRtcClassifier {
    /// Create a classifier for `sample_rate` with the given aggressiveness.
    pub fn new(sample_rate: u32, aggressiveness: Aggressiveness) -> Result<Self, ClassifierError> {
        let rate = match sample_rate {
            8000 => SampleRate::Rate8kHz,
            16000 => SampleRate::Rate16kHz,
            32000 => SampleRate::Rate32kHz,
            48000 => SampleRate::Rate48kHz,
            other => return Err(ClassifierError::UnsupportedSampleRate(other)),
        };

        Ok(Self {
            vad: Vad::new_with_rate_and_mode(rate, aggressiveness.into()),
            sample_rate,
        })
    }

    /// The sample rate this classifier was built for.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

impl SpeechClassifier for WebRtcClassifier {
    fn is_speech(&mut self, frame: &[u8], sample_rate: u32) -> Result<bool, ClassifierError> {
        if sample_rate != self.sample_rate {
            return Err(ClassifierError::SampleRateMismatch {
                expected: self.sample_rate,
                got: sample_rate,
            });
        }
        if frame.len() % 2 != 0 {
            return Err(ClassifierError::OddFrameLength(frame.len()));
        }

        let samples: Vec<i16> = frame
            .chunks_exact(2)
            .map(|b| i16::from_le_bytes([b[0], b[1]]))
            .collect();

        self.vad
            .is_voice_segment(&samples)
            .map_err(|_| ClassifierError::RejectedFrame(samples.len()))
    }
}

/// Classify every frame, failing open on classifier errors.
///
/// The output has the same length and order as the input frames. A frame
/// the classifier errors on is flagged as non-speech and the failure is
/// logged with its timestamp; classification continues with the next
/// frame.
pub fn classify<'a, C, I>(frames: I, classifier: &mut C, sample_rate: u32) -> Vec<SpeechFlag>
where
    C: SpeechClassifier + ?Sized,
    I: IntoIterator<Item = Frame<'a>>,
{
    frames
        .into_iter()
        .map(|frame| {
            let is_speech = match classifier.is_speech(frame.bytes, sample_rate) {
                Ok(verdict) => verdict,
                Err(err) => {
                    warn!(
                        timestamp_secs = format!("{:.2}", frame.timestamp),
                        error = %err,
                        "Classifier failed on frame, treating as non-speech"
                    );
                    false
                }
            };

            SpeechFlag {
                timestamp: frame.timestamp,
                is_speech,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::AudioBuffer;
    use crate::framer::frames;

    /// Returns a scripted verdict per frame, or errors when the script says so.
    struct ScriptedClassifier {
        verdicts: Vec<Result<bool, ()>>,
        next: usize,
    }

    impl ScriptedClassifier {
        fn new(verdicts: Vec<Result<bool, ()>>) -> Self {
            Self { verdicts, next: 0 }
        }
    }

    impl SpeechClassifier for ScriptedClassifier {
        fn is_speech(&mut self, frame: &[u8], _sample_rate: u32) -> Result<bool, ClassifierError> {
            let verdict = self.verdicts[self.next];
            self.next += 1;
            verdict.map_err(|_| ClassifierError::RejectedFrame(frame.len() / 2))
        }
    }

    fn hundred_ms_buffer() -> AudioBuffer {
        AudioBuffer::new(vec![0u8; 3200], 16000, 2)
    }

    #[test]
    fn test_order_and_length_preserved() {
        let buffer = hundred_ms_buffer();
        let mut classifier = ScriptedClassifier::new(vec![Ok(false), Ok(true), Ok(true)]);

        let flags = classify(frames(&buffer, 30), &mut classifier, 16000);

        assert_eq!(flags.len(), 3);
        assert!(flags.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
        assert_eq!(
            flags.iter().map(|f| f.is_speech).collect::<Vec<_>>(),
            vec![false, true, true]
        );
    }

    #[test]
    fn test_failures_fail_open() {
        let buffer = hundred_ms_buffer();
        let mut classifier = ScriptedClassifier::new(vec![Ok(true), Err(()), Ok(true)]);

        let flags = classify(frames(&buffer, 30), &mut classifier, 16000);

        assert_eq!(flags.len(), 3);
        assert!(!flags[1].is_speech, "failed frame must be non-speech");
        assert!(flags[0].is_speech && flags[2].is_speech);
    }

    #[test]
    fn test_aggressiveness_levels() {
        assert_eq!(Aggressiveness::from_level(0), Some(Aggressiveness::Quality));
        assert_eq!(Aggressiveness::from_level(3), Some(Aggressiveness::VeryAggressive));
        assert_eq!(Aggressiveness::from_level(4), None);
    }

    #[test]
    fn test_webrtc_supported_rates() {
        for rate in [8000, 16000, 32000, 48000] {
            assert!(WebRtcClassifier::new(rate, Aggressiveness::default()).is_ok());
        }
        assert!(matches!(
            WebRtcClassifier::new(44100, Aggressiveness::default()),
            Err(ClassifierError::UnsupportedSampleRate(44100))
        ));
    }

    #[test]
    fn test_webrtc_silence_is_not_speech() {
        let mut classifier = WebRtcClassifier::new(16000, Aggressiveness::VeryAggressive).unwrap();
        // 30 ms of digital silence at 16 kHz s16le.
        let frame = vec![0u8; 960];
        assert!(!classifier.is_speech(&frame, 16000).unwrap());
    }

    #[test]
    fn test_webrtc_rejects_mismatched_rate() {
        let mut classifier = WebRtcClassifier::new(16000, Aggressiveness::default()).unwrap();
        let frame = vec![0u8; 960];
        assert!(matches!(
            classifier.is_speech(&frame, 8000),
            Err(ClassifierError::SampleRateMismatch { expected: 16000, got: 8000 })
        ));
    }

    #[test]
    fn test_webrtc_rejects_odd_length() {
        let mut classifier = WebRtcClassifier::new(16000, Aggressiveness::default()).unwrap();
        let frame = vec![0u8; 961];
        assert!(matches!(
            classifier.is_speech(&frame, 16000),
            Err(ClassifierError::OddFrameLength(961))
        ));
    }
}
