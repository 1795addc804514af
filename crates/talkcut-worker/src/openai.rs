//! OpenAI API client for transcription and transcript filtering.
//!
//! Two endpoints are used: `/audio/transcriptions` (Whisper) for turning a
//! WAV slice into text, and `/chat/completions` for dropping redundant or
//! duplicated takes from the assembled transcript.

use std::path::Path;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use talkcut_models::TranscriptSegment;

use crate::config::WorkerConfig;
use crate::error::{WorkerError, WorkerResult};

/// OpenAI API client.
pub struct OpenAiClient {
    api_key: String,
    base_url: String,
    whisper_model: String,
    chat_model: String,
    client: Client,
}

/// Whisper transcription response.
#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: String,
}

/// Chat completion request.
#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

/// Chat completion response.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// The JSON object the filter prompt instructs the model to return.
#[derive(Debug, Deserialize)]
struct FilteredTranscription {
    filtered_transcription: Vec<TranscriptSegment>,
}

impl OpenAiClient {
    /// Create a client from the worker configuration.
    pub fn new(config: &WorkerConfig) -> Self {
        Self {
            api_key: config.openai_api_key.clone(),
            base_url: config.openai_base_url.trim_end_matches('/').to_string(),
            whisper_model: config.whisper_model.clone(),
            chat_model: config.chat_model.clone(),
            client: Client::new(),
        }
    }

    /// Transcribe a WAV file with the Whisper API.
    pub async fn transcribe_wav(&self, path: &Path) -> WorkerResult<String> {
        let bytes = tokio::fs::read(path).await?;

        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name("segment.wav")
            .mime_str("audio/wav")?;
        let form = reqwest::multipart::Form::new()
            .text("model", self.whisper_model.clone())
            .text("response_format", "json")
            .part("file", part);

        let response = self
            .client
            .post(format!("{}/audio/transcriptions", self.base_url))
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(WorkerError::transcription_failed(format!(
                "API returned {}: {}",
                status, body
            )));
        }

        let parsed: TranscriptionResponse = response
            .json()
            .await
            .map_err(|e| WorkerError::transcription_failed(format!("Bad response body: {}", e)))?;

        Ok(parsed.text.trim().to_string())
    }

    /// Ask the chat model to drop redundant or duplicated transcript
    /// segments.
    ///
    /// Fail-open: any transport, API, or schema failure logs a warning and
    /// returns the transcript unchanged. A bad filtering pass must not lose
    /// a video's transcript.
    pub async fn filter_transcript(
        &self,
        transcript: &[TranscriptSegment],
    ) -> Vec<TranscriptSegment> {
        match self.request_filtered(transcript).await {
            Ok(filtered) => {
                info!(
                    before = transcript.len(),
                    after = filtered.len(),
                    "Transcript filtered"
                );
                filtered
            }
            Err(err) => {
                warn!(error = %err, "Transcript filtering failed, keeping unfiltered transcript");
                transcript.to_vec()
            }
        }
    }

    async fn request_filtered(
        &self,
        transcript: &[TranscriptSegment],
    ) -> WorkerResult<Vec<TranscriptSegment>> {
        let request = ChatRequest {
            model: self.chat_model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: build_filter_prompt(transcript)?,
            }],
            temperature: 0.0,
            response_format: ResponseFormat {
                format_type: "json_object".to_string(),
            },
        };

        debug!(model = %self.chat_model, segments = transcript.len(), "Requesting transcript filtering");

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(WorkerError::filtering_failed(format!(
                "API returned {}: {}",
                status, body
            )));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| WorkerError::filtering_failed(format!("Bad response body: {}", e)))?;

        let text = chat
            .choices
            .first()
            .map(|c| c.message.content.as_str())
            .ok_or_else(|| WorkerError::filtering_failed("No choices in chat response"))?;

        let parsed: FilteredTranscription = serde_json::from_str(strip_code_fences(text))
            .map_err(|e| WorkerError::filtering_failed(format!("Bad filter JSON: {}", e)))?;

        Ok(parsed.filtered_transcription)
    }
}

/// Build the filtering prompt with an embedded response schema.
fn build_filter_prompt(transcript: &[TranscriptSegment]) -> WorkerResult<String> {
    let transcript_json = serde_json::to_string_pretty(transcript)?;

    Ok(format!(
        r#"You are given a raw JSON transcription of a video as an array of objects, each with 'start' (number, seconds), 'end' (number, seconds), and 'text' (string).
Remove any segments that are redundant, duplicate, or mistaken. For segments with duplicate or nearly identical text, keep only the last occurrence.

Return ONLY a single JSON object with this schema:
{{
  "filtered_transcription": [
    {{"start": 0.0, "end": 0.0, "text": "..."}}
  ]
}}

Additional instructions:
- Keep the remaining segments in chronological order.
- Copy 'start' and 'end' values unchanged from the input.
- Do not rewrite or merge segment text.

Raw transcription:
{transcript_json}
"#
    ))
}

/// Strip a markdown code fence if the model wrapped its JSON in one.
fn strip_code_fences(text: &str) -> &str {
    let text = text.trim();
    let text = text.strip_prefix("```json").unwrap_or(text);
    let text = text.strip_prefix("```").unwrap_or(text);
    let text = text.strip_suffix("```").unwrap_or(text);
    text.trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use talkcut_models::SpeechSegment;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(base_url: String) -> WorkerConfig {
        WorkerConfig {
            raw_video_dir: "raw".into(),
            edited_video_dir: "edited".into(),
            openai_api_key: "sk-test".into(),
            openai_base_url: base_url,
            whisper_model: "whisper-1".into(),
            chat_model: "gpt-4o-mini".into(),
            detection: talkcut_vad::DetectionConfig::default(),
        }
    }

    fn sample_transcript() -> Vec<TranscriptSegment> {
        vec![
            TranscriptSegment::new(SpeechSegment::new(0.0, 1.0), "take one"),
            TranscriptSegment::new(SpeechSegment::new(2.0, 3.0), "take one"),
        ]
    }

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("{\"a\":1}"), "{\"a\":1}");
        assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("```\n{\"a\":1}\n```"), "{\"a\":1}");
    }

    #[test]
    fn test_filter_prompt_embeds_transcript() {
        let prompt = build_filter_prompt(&sample_transcript()).unwrap();
        assert!(prompt.contains("take one"));
        assert!(prompt.contains("filtered_transcription"));
        assert!(prompt.contains("keep only the last occurrence"));
    }

    #[tokio::test]
    async fn test_transcribe_wav() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/audio/transcriptions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "text": "  hello world  "
            })))
            .mount(&server)
            .await;

        let wav = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(wav.path(), b"RIFF").unwrap();

        let client = OpenAiClient::new(&test_config(format!("{}/v1", server.uri())));
        let text = client.transcribe_wav(wav.path()).await.unwrap();

        assert_eq!(text, "hello world");
    }

    #[tokio::test]
    async fn test_transcribe_reports_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/audio/transcriptions"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let wav = tempfile::NamedTempFile::new().unwrap();
        let client = OpenAiClient::new(&test_config(format!("{}/v1", server.uri())));

        assert!(matches!(
            client.transcribe_wav(wav.path()).await,
            Err(WorkerError::TranscriptionFailed(_))
        ));
    }

    #[tokio::test]
    async fn test_filter_transcript_success() {
        let server = MockServer::start().await;
        let content = serde_json::json!({
            "filtered_transcription": [
                {"start": 2.0, "end": 3.0, "text": "take one"}
            ]
        })
        .to_string();

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"role": "assistant", "content": content}}]
            })))
            .mount(&server)
            .await;

        let client = OpenAiClient::new(&test_config(format!("{}/v1", server.uri())));
        let filtered = client.filter_transcript(&sample_transcript()).await;

        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].start, 2.0);
    }

    #[tokio::test]
    async fn test_filter_transcript_fails_open_on_bad_json() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"role": "assistant", "content": "not json"}}]
            })))
            .mount(&server)
            .await;

        let client = OpenAiClient::new(&test_config(format!("{}/v1", server.uri())));
        let transcript = sample_transcript();
        let filtered = client.filter_transcript(&transcript).await;

        assert_eq!(filtered, transcript);
    }

    #[tokio::test]
    async fn test_filter_transcript_fails_open_on_transport_error() {
        // Point at a server that is no longer listening.
        let server = MockServer::start().await;
        let base_url = format!("{}/v1", server.uri());
        drop(server);

        let client = OpenAiClient::new(&test_config(base_url));
        let transcript = sample_transcript();
        let filtered = client.filter_transcript(&transcript).await;

        assert_eq!(filtered, transcript);
    }
}
