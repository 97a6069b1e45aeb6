/// LLM Client: the single point of entry for all model calls in Folio.
///
/// ARCHITECTURAL RULE: No other module may call the Gemini API directly.
/// All LLM interactions MUST go through this module, and every call takes the
/// session's `ApiKey` as an explicit argument. Nothing here reads a key from
/// the environment.
///
/// No retry loop here: the portfolio pipeline retries the whole run once.
use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;
#[cfg(test)]
pub mod scripted;

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";
const TOP_K: u32 = 40;
const TOP_P: f32 = 0.95;
const SAFETY_CATEGORIES: [&str; 4] = [
    "HARM_CATEGORY_DANGEROUS_CONTENT",
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
];

/// Temperature for résumé extraction: stay close to the source text.
pub const EXTRACTION_TEMPERATURE: f32 = 0.2;
/// Temperature for brief, design and UI planning: encourage variety.
pub const DESIGN_TEMPERATURE: f32 = 0.9;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("LLM returned empty content")]
    EmptyContent,

    #[error("LLM reply contains no JSON object")]
    NoJsonObject,
}

/// A user-supplied access key. Lives only in session memory; `Debug` never prints it.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// `None` for a blank key.
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into().trim().to_string();
        (!raw.is_empty()).then_some(Self(raw))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

/// What a session hands to each stage that calls the model.
#[derive(Debug, Clone)]
pub struct Credential {
    pub key: ApiKey,
    pub model: GeminiModel,
}

impl Credential {
    pub fn request(&self, prompt: impl Into<String>, temperature: f32) -> GenerationRequest {
        GenerationRequest::new(self.model, prompt, temperature)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GeminiModel {
    #[default]
    #[serde(rename = "gemini-1.5-flash")]
    Flash,
    #[serde(rename = "gemini-1.5-pro")]
    Pro,
}

impl GeminiModel {
    pub fn as_str(self) -> &'static str {
        match self {
            GeminiModel::Flash => "gemini-1.5-flash",
            GeminiModel::Pro => "gemini-1.5-pro",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name.trim() {
            "gemini-1.5-flash" => Some(GeminiModel::Flash),
            "gemini-1.5-pro" => Some(GeminiModel::Pro),
            _ => None,
        }
    }
}

impl fmt::Display for GeminiModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One prompt plus its sampling parameters.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub model: GeminiModel,
    pub prompt: String,
    pub temperature: f32,
}

impl GenerationRequest {
    pub fn new(model: GeminiModel, prompt: impl Into<String>, temperature: f32) -> Self {
        Self {
            model,
            prompt: prompt.into(),
            temperature,
        }
    }
}

/// Anything that turns a prompt into reply text.
///
/// Carried in `AppState` as `Arc<dyn TextModel>`; tests substitute a scripted model.
#[async_trait]
pub trait TextModel: Send + Sync {
    async fn generate(&self, key: &ApiKey, request: &GenerationRequest)
        -> Result<String, LlmError>;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
    safety_settings: Vec<SafetySetting>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_k: u32,
    top_p: f32,
}

#[derive(Debug, Serialize)]
struct SafetySetting {
    category: &'static str,
    threshold: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    pub content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ReplyPart>,
}

#[derive(Debug, Deserialize)]
pub struct ReplyPart {
    pub text: Option<String>,
}

impl GenerateContentResponse {
    /// Text of the first candidate's first part.
    pub fn text(&self) -> Option<&str> {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .and_then(|c| c.parts.first())
            .and_then(|p| p.text.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    message: String,
}

/// The Gemini `generateContent` client used by all services in Folio.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_base: String,
}

impl LlmClient {
    pub fn new(api_base: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .expect("Failed to build HTTP client"),
            api_base: api_base.into().trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self, model: GeminiModel) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.api_base, model)
    }

    /// Makes a raw call to the Gemini API, returning the full response object.
    pub async fn call(
        &self,
        key: &ApiKey,
        request: &GenerationRequest,
    ) -> Result<GenerateContentResponse, LlmError> {
        let body = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part {
                    text: &request.prompt,
                }],
            }],
            generation_config: GenerationConfig {
                temperature: request.temperature,
                top_k: TOP_K,
                top_p: TOP_P,
            },
            safety_settings: SAFETY_CATEGORIES
                .iter()
                .map(|&category| SafetySetting {
                    category,
                    threshold: "BLOCK_NONE",
                })
                .collect(),
        };

        let response = self
            .client
            .post(self.endpoint(request.model))
            .header("x-goog-api-key", key.expose())
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("LLM API returned {}", status);
            // Try to parse error message
            let message = serde_json::from_str::<GeminiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let reply: GenerateContentResponse = response.json().await?;
        debug!(
            "LLM call succeeded: model={}, candidates={}",
            request.model,
            reply.candidates.len()
        );
        Ok(reply)
    }
}

#[async_trait]
impl TextModel for LlmClient {
    async fn generate(
        &self,
        key: &ApiKey,
        request: &GenerationRequest,
    ) -> Result<String, LlmError> {
        let reply = self.call(key, request).await?;
        reply
            .text()
            .filter(|t| !t.trim().is_empty())
            .map(str::to_string)
            .ok_or(LlmError::EmptyContent)
    }
}

/// Span from the first `{` to the last `}` inclusive. Tolerates commentary and
/// code fences around the object.
pub fn extract_json_span(text: &str) -> Result<&str, LlmError> {
    let start = text.find('{').ok_or(LlmError::NoJsonObject)?;
    let end = text.rfind('}').ok_or(LlmError::NoJsonObject)?;
    if end < start {
        return Err(LlmError::NoJsonObject);
    }
    Ok(&text[start..=end])
}

/// Extracts the brace span and deserializes it.
pub fn parse_json_reply<T: DeserializeOwned>(text: &str) -> Result<T, LlmError> {
    let span = extract_json_span(text)?;
    serde_json::from_str(span).map_err(LlmError::Parse)
}

/// Strips ```markdown ... ``` or ``` ... ``` fences from a prose reply.
pub fn strip_markdown_fences(text: &str) -> &str {
    let text = text.trim();
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest
        .strip_prefix("markdown")
        .or_else(|| rest.strip_prefix("md"))
        .unwrap_or(rest);
    rest.trim_start()
        .strip_suffix("```")
        .map(str::trim)
        .unwrap_or_else(|| rest.trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn test_extract_json_span_with_surrounding_chatter() {
        let input = "Sure! Here is the JSON: {\"name\": \"Ada\"} — hope that helps!";
        assert_eq!(extract_json_span(input).unwrap(), "{\"name\": \"Ada\"}");
    }

    #[test]
    fn test_extract_json_span_with_fences() {
        let input = "```json\n{\"key\": {\"nested\": true}}\n```";
        assert_eq!(
            extract_json_span(input).unwrap(),
            "{\"key\": {\"nested\": true}}"
        );
    }

    #[test]
    fn test_extract_json_span_without_braces() {
        assert!(matches!(
            extract_json_span("no json here"),
            Err(LlmError::NoJsonObject)
        ));
        assert!(matches!(
            extract_json_span("} backwards {"),
            Err(LlmError::NoJsonObject)
        ));
    }

    #[test]
    fn test_parse_json_reply_rejects_broken_span() {
        let result: Result<Value, _> = parse_json_reply("here: {\"a\": } thanks");
        assert!(matches!(result, Err(LlmError::Parse(_))));
    }

    #[test]
    fn test_strip_markdown_fences() {
        assert_eq!(strip_markdown_fences("```markdown\n# Brief\n```"), "# Brief");
        assert_eq!(strip_markdown_fences("```\n# Brief\n```"), "# Brief");
        assert_eq!(strip_markdown_fences("  # Brief  "), "# Brief");
    }

    #[test]
    fn test_request_body_shape() {
        let body = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: "hello" }],
            }],
            generation_config: GenerationConfig {
                temperature: EXTRACTION_TEMPERATURE,
                top_k: TOP_K,
                top_p: TOP_P,
            },
            safety_settings: SAFETY_CATEGORIES
                .iter()
                .map(|&category| SafetySetting {
                    category,
                    threshold: "BLOCK_NONE",
                })
                .collect(),
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["contents"][0]["role"], "user");
        assert_eq!(value["contents"][0]["parts"][0]["text"], "hello");
        assert_eq!(value["generationConfig"]["topK"], 40);
        assert_eq!(value["safetySettings"].as_array().unwrap().len(), 4);
        assert_eq!(value["safetySettings"][0]["threshold"], "BLOCK_NONE");
    }

    #[test]
    fn test_reply_text_is_first_candidate_first_part() {
        let reply: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"one"},{"text":"two"}]}},{"content":{"parts":[{"text":"three"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(reply.text(), Some("one"));

        let empty: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(empty.text(), None);
    }

    #[test]
    fn test_api_key_debug_is_redacted() {
        let key = ApiKey::new("AIza-secret").unwrap();
        assert_eq!(format!("{key:?}"), "ApiKey(***)");
        assert!(ApiKey::new("   ").is_none());
    }

    #[test]
    fn test_endpoint_uses_model_name() {
        let client = LlmClient::new("https://example.test/", Duration::from_secs(1));
        assert_eq!(
            client.endpoint(GeminiModel::Pro),
            "https://example.test/v1beta/models/gemini-1.5-pro:generateContent"
        );
    }

    #[test]
    fn test_model_names_round_trip() {
        assert_eq!(GeminiModel::parse("gemini-1.5-flash"), Some(GeminiModel::Flash));
        assert_eq!(GeminiModel::parse("gpt-4"), None);
        assert_eq!(
            serde_json::to_value(GeminiModel::Pro).unwrap(),
            Value::String("gemini-1.5-pro".into())
        );
    }
}
