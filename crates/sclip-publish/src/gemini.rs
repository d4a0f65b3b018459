//! Gemini client for upload metadata generation.
//!
//! Builds a prompt from the clip's caption text, a source title hint, and a
//! bounded sample of previously generated metadata (so new titles stay
//! distinct), then parses the structured metadata object out of the
//! response.

use std::path::Path;

use chrono::Utc;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use sclip_models::metadata::ShortMetadata;

use crate::error::{PublishError, PublishResult};
use crate::retry::{retry_async, RetryConfig};

/// Character budget for existing-metadata examples in the prompt.
const MAX_EXISTING_CHARS: usize = 1500;

/// Models tried in order until one answers.
const MODELS: &[&str] = &["gemini-2.0-flash", "gemini-2.5-flash", "gemini-2.5-flash-lite"];

/// Gemini API client.
pub struct GeminiClient {
    api_key: String,
    client: Client,
}

/// Gemini API request.
#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    #[serde(rename = "responseMimeType")]
    response_mime_type: String,
}

/// Gemini API response.
#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: ResponseContent,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: String,
}

/// Some responses wrap the object under a SHORT_METADATA key.
#[derive(Debug, Deserialize)]
struct WrappedMetadata {
    #[serde(rename = "SHORT_METADATA")]
    short_metadata: ShortMetadata,
}

impl GeminiClient {
    /// Create a new client from the `GEMINI_API_KEY` environment variable.
    pub fn new() -> PublishResult<Self> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| PublishError::MissingCredentials("GEMINI_API_KEY not set".into()))?;
        Ok(Self::with_api_key(api_key))
    }

    /// Create a new client with an explicit key.
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            client: Client::new(),
        }
    }

    /// Generate upload metadata for a clip.
    ///
    /// Retries transient failures up to the bounded retry policy; each
    /// attempt walks the model fallback list.
    pub async fn generate_metadata(
        &self,
        captions: &str,
        title_hint: &str,
        metadata_dir: &Path,
    ) -> PublishResult<ShortMetadata> {
        let existing = gather_existing_metadata(metadata_dir, MAX_EXISTING_CHARS).await;
        let prompt = build_prompt(captions, title_hint, &existing);

        let config = RetryConfig::new("gemini_metadata").with_max_retries(3);
        let mut metadata = retry_async(&config, || self.try_models(&prompt))
            .await
            .into_result()?;

        metadata.generated_at = Some(Utc::now());
        Ok(metadata)
    }

    /// Try every model in order, returning the first success.
    async fn try_models(&self, prompt: &str) -> PublishResult<ShortMetadata> {
        let mut last_error = None;

        for model in MODELS {
            match self.call_gemini_api(model, prompt).await {
                Ok(metadata) => {
                    info!(model, "Generated metadata");
                    return Ok(metadata);
                }
                Err(e) => {
                    warn!(model, error = %e, "Metadata generation attempt failed");
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| PublishError::ai_failed("All Gemini models failed")))
    }

    /// Call the Gemini API with one model.
    async fn call_gemini_api(&self, model: &str, prompt: &str) -> PublishResult<ShortMetadata> {
        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent?key={}",
            model, self.api_key
        );

        let request = GeminiRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
            },
        };

        let response = self.client.post(&url).json(&request).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(PublishError::ApiError { status, body });
        }

        let gemini_response: GeminiResponse = response.json().await?;

        let text = gemini_response
            .candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .map(|p| p.text.as_str())
            .ok_or_else(|| PublishError::ai_failed("No content in Gemini response"))?;

        parse_metadata_json(text)
    }
}

/// Parse the metadata object out of a model response, tolerating markdown
/// code fences and the SHORT_METADATA wrapper.
pub fn parse_metadata_json(text: &str) -> PublishResult<ShortMetadata> {
    let text = text.trim();
    let text = text.strip_prefix("```json").unwrap_or(text);
    let text = text.strip_prefix("```").unwrap_or(text);
    let text = text.strip_suffix("```").unwrap_or(text);
    let text = text.trim();

    if let Ok(wrapped) = serde_json::from_str::<WrappedMetadata>(text) {
        return Ok(wrapped.short_metadata);
    }

    serde_json::from_str(text)
        .map_err(|e| PublishError::ai_failed(format!("Failed to parse metadata JSON: {}", e)))
}

/// Collect compacted JSON from existing metadata sidecars, up to a
/// character budget, so the prompt can ask for something different.
async fn gather_existing_metadata(dir: &Path, budget: usize) -> String {
    let mut names: Vec<_> = match std::fs::read_dir(dir) {
        Ok(entries) => entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.ends_with("metadata.json"))
            })
            .collect(),
        Err(_) => return String::new(),
    };
    names.sort();

    let mut existing = String::new();
    for path in names {
        let Ok(content) = tokio::fs::read_to_string(&path).await else {
            continue;
        };
        // Re-serialize compactly so the budget buys more examples
        let Ok(value) = serde_json::from_str::<serde_json::Value>(&content) else {
            continue;
        };
        let block = value.to_string();

        if existing.len() + block.len() > budget {
            let room = budget.saturating_sub(existing.len());
            existing.extend(block.chars().take(room));
            break;
        }
        existing.push_str(&block);
        existing.push('\n');
    }

    existing
}

fn build_prompt(captions: &str, title_hint: &str, existing: &str) -> String {
    format!(
        "You are generating metadata for a YouTube Short. \
         Return a JSON object named SHORT_METADATA with keys: title, description, tags, category (24).\n\n\
         Title of source: {title_hint}\n\n\
         Transcribed captions:\n{captions}\n\n\
         Existing metadata examples (truncated):\n{existing}\n\n\
         Now generate a new SHORT_METADATA JSON object that is clearly different \
         from the examples above."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_object() {
        let meta = parse_metadata_json(
            r#"{"title": "Clip", "description": "desc", "tags": ["a"], "category": 24}"#,
        )
        .unwrap();
        assert_eq!(meta.title, "Clip");
        assert_eq!(meta.tags, vec!["a"]);
    }

    #[test]
    fn test_parse_wrapped_object() {
        let meta = parse_metadata_json(
            r#"{"SHORT_METADATA": {"title": "Clip", "description": "desc", "category": "24"}}"#,
        )
        .unwrap();
        assert_eq!(meta.title, "Clip");
        assert_eq!(meta.category, 24);
    }

    #[test]
    fn test_parse_code_fenced_object() {
        let meta = parse_metadata_json(
            "```json\n{\"title\": \"Clip\", \"description\": \"d\"}\n```",
        )
        .unwrap();
        assert_eq!(meta.title, "Clip");
    }

    #[test]
    fn test_parse_garbage_fails() {
        assert!(parse_metadata_json("no json here").is_err());
    }

    #[tokio::test]
    async fn test_gather_existing_respects_budget() {
        let dir = tempfile::TempDir::new().unwrap();
        for i in 0..10 {
            let body = format!(
                r#"{{"title": "Example {i} with a reasonably long padded title string"}}"#
            );
            std::fs::write(dir.path().join(format!("{i}_short_metadata.json")), body).unwrap();
        }

        let existing = gather_existing_metadata(dir.path(), 200).await;
        assert!(existing.len() <= 200);
        assert!(existing.contains("Example 0"));
    }

    #[tokio::test]
    async fn test_gather_existing_missing_dir() {
        let existing =
            gather_existing_metadata(Path::new("/definitely/not/here"), 500).await;
        assert!(existing.is_empty());
    }

    #[test]
    fn test_prompt_mentions_inputs() {
        let prompt = build_prompt("some words", "Fury 2014", "");
        assert!(prompt.contains("some words"));
        assert!(prompt.contains("Fury 2014"));
    }
}
