/// Generation Gateway — the single point of entry for all Gemini calls.
///
/// ARCHITECTURAL RULE: No other module may call the generation service directly.
/// Everything downstream depends on the `GenerationGateway` trait so the rest of
/// the pipeline stays deterministic and testable with a stub.
///
/// Decoding settings are fixed here on purpose: bounded output, low temperature,
/// BLOCK_ONLY_HIGH safety thresholds.
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
/// The model used for every generation call.
pub const MODEL: &str = "gemini-2.0-flash";
const MAX_OUTPUT_TOKENS: u32 = 8192;
const TEMPERATURE: f32 = 0.2;
const MAX_RETRIES: u32 = 3;
const SAFETY_CATEGORIES: [&str; 4] = [
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
];
const SAFETY_THRESHOLD: &str = "BLOCK_ONLY_HIGH";

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("GEMINI_API_KEY is not set; get a key at https://aistudio.google.com/app/apikey")]
    MissingApiKey,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Content blocked by safety filter: {reason}")]
    Blocked { reason: String },

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("Service returned empty content")]
    EmptyContent,
}

/// Black-box text generation: instruction in, markup out.
#[async_trait]
pub trait GenerationGateway: Send + Sync {
    async fn generate(&self, instruction: &str) -> Result<String, GatewayError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Wire types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
    generation_config: GenerationConfig,
    safety_settings: Vec<SafetySetting<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    role: &'a str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct SafetySetting<'a> {
    category: &'a str,
    threshold: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub prompt_feedback: Option<PromptFeedback>,
    pub usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<CandidateContent>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
pub struct ResponsePart {
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    pub block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    #[serde(default)]
    pub prompt_token_count: u32,
    #[serde(default)]
    pub candidates_token_count: u32,
}

impl GenerateContentResponse {
    /// Concatenates the text parts of the first candidate, or explains why
    /// there is nothing to return.
    pub fn into_text(self) -> Result<String, GatewayError> {
        if let Some(reason) = self.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(GatewayError::Blocked { reason });
        }

        let candidate = self
            .candidates
            .into_iter()
            .next()
            .ok_or(GatewayError::EmptyContent)?;

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return match candidate.finish_reason.as_deref() {
                Some("SAFETY") | Some("PROHIBITED_CONTENT") | Some("BLOCKLIST") => {
                    Err(GatewayError::Blocked {
                        reason: candidate.finish_reason.unwrap_or_default(),
                    })
                }
                _ => Err(GatewayError::EmptyContent),
            };
        }
        Ok(text)
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

// ────────────────────────────────────────────────────────────────────────────
// Gemini client
// ────────────────────────────────────────────────────────────────────────────

/// Production gateway backed by the Gemini `generateContent` endpoint.
#[derive(Clone)]
pub struct GeminiGateway {
    client: Client,
    api_key: Option<String>,
}

impl GeminiGateway {
    pub fn new(api_key: Option<String>) -> Result<Self, GatewayError> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()?,
            api_key,
        })
    }

    fn request_body(instruction: &str) -> GenerateContentRequest<'_> {
        GenerateContentRequest {
            contents: vec![RequestContent {
                role: "user",
                parts: vec![RequestPart { text: instruction }],
            }],
            generation_config: GenerationConfig {
                max_output_tokens: MAX_OUTPUT_TOKENS,
                temperature: TEMPERATURE,
            },
            safety_settings: SAFETY_CATEGORIES
                .iter()
                .map(|category| SafetySetting {
                    category,
                    threshold: SAFETY_THRESHOLD,
                })
                .collect(),
        }
    }

    /// Makes the call, retrying on 429, 5xx and transport errors with
    /// exponential backoff.
    async fn call(
        &self,
        api_key: &str,
        instruction: &str,
    ) -> Result<GenerateContentResponse, GatewayError> {
        let url = format!("{GEMINI_API_BASE}/{MODEL}:generateContent");
        let request_body = Self::request_body(instruction);

        let mut last_error: Option<GatewayError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s
                let delay = std::time::Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    "Generation attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(&url)
                .header("x-goog-api-key", api_key)
                .header("content-type", "application/json")
                .json(&request_body)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(GatewayError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("Gemini API returned {}: {}", status, body);
                last_error = Some(retryable_error(status.as_u16(), body));
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<GeminiError>(&body)
                    .map(|e| e.error.message)
                    .unwrap_or(body);
                return Err(GatewayError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let body = response.text().await?;
            let parsed: GenerateContentResponse = serde_json::from_str(&body)?;

            if let Some(usage) = &parsed.usage_metadata {
                debug!(
                    "Generation succeeded: prompt_tokens={}, output_tokens={}",
                    usage.prompt_token_count, usage.candidates_token_count
                );
            }

            return Ok(parsed);
        }

        Err(last_error.unwrap_or(GatewayError::RateLimited {
            retries: MAX_RETRIES,
        }))
    }
}

/// Error kept for a retryable status. A 429 that outlasts every retry is
/// reported as rate limiting.
fn retryable_error(status: u16, body: String) -> GatewayError {
    if status == 429 {
        GatewayError::RateLimited {
            retries: MAX_RETRIES,
        }
    } else {
        GatewayError::Api {
            status,
            message: body,
        }
    }
}

#[async_trait]
impl GenerationGateway for GeminiGateway {
    async fn generate(&self, instruction: &str) -> Result<String, GatewayError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(GatewayError::MissingApiKey)?;
        self.call(api_key, instruction).await?.into_text()
    }
}

/// Removes code-fence marker lines (```` ```latex ````, ```` ```tex ````, bare
/// ```` ``` ````) from generated markup and normalises surrounding whitespace.
/// A fence glued to the first or last line of content is cut off as well.
pub fn strip_code_fences(text: &str) -> String {
    let kept: Vec<&str> = text
        .lines()
        .filter(|line| !is_fence_marker(line))
        .collect();
    let joined = kept.join("\n");
    let mut body = joined.trim();
    if let Some(rest) = body.strip_prefix("```") {
        body = rest
            .trim_start_matches(|c: char| c.is_ascii_alphanumeric() || c == '-' || c == '_')
            .trim_start();
    }
    if let Some(rest) = body.strip_suffix("```") {
        body = rest.trim_end();
    }
    let mut out = body.to_string();
    out.push('\n');
    out
}

fn is_fence_marker(line: &str) -> bool {
    let Some(rest) = line.trim().strip_prefix("```") else {
        return false;
    };
    rest.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = "\\documentclass{article}\n\\begin{document}\nHi\n\\end{document}";

    #[test]
    fn test_strip_code_fences_with_language_tag() {
        let input = format!("```latex\n{BODY}\n```");
        assert_eq!(strip_code_fences(&input), format!("{BODY}\n"));
    }

    #[test]
    fn test_strip_code_fences_tagged_and_bare_agree() {
        let tagged = format!("```latex\n{BODY}\n```\n");
        let bare = format!("```\n{BODY}\n```");
        assert_eq!(strip_code_fences(&tagged), strip_code_fences(&bare));
    }

    #[test]
    fn test_strip_code_fences_no_fences() {
        assert_eq!(strip_code_fences(BODY), format!("{BODY}\n"));
    }

    #[test]
    fn test_strip_code_fences_glued_to_content() {
        let bare = strip_code_fences(&format!("```\n{BODY}\n```"));
        let glued_close = format!("```latex\n{BODY}```");
        let glued_both = format!("```latex {BODY}```");
        assert_eq!(strip_code_fences(&glued_close), bare);
        assert_eq!(strip_code_fences(&glued_both), bare);
        assert_eq!(bare, format!("{BODY}\n"));
    }

    #[test]
    fn test_strip_code_fences_keeps_inline_backticks() {
        let input = "```tex\nuse ```code``` inline\n```";
        assert_eq!(strip_code_fences(input), "use ```code``` inline\n");
    }

    #[test]
    fn test_request_body_carries_fixed_settings() {
        let body = serde_json::to_value(GeminiGateway::request_body("hello")).unwrap();
        assert_eq!(body["contents"][0]["parts"][0]["text"], "hello");
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 8192);
        let temperature = body["generationConfig"]["temperature"].as_f64().unwrap();
        assert!((temperature - 0.2).abs() < 1e-6);
        let settings = body["safetySettings"].as_array().unwrap();
        assert_eq!(settings.len(), 4);
        assert!(settings.iter().all(|s| s["threshold"] == "BLOCK_ONLY_HIGH"));
    }

    #[test]
    fn test_response_text_joins_parts() {
        let json = r#"{"candidates":[{"content":{"parts":[{"text":"a"},{"text":"b"}]},"finishReason":"STOP"}]}"#;
        let response: GenerateContentResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.into_text().unwrap(), "ab");
    }

    #[test]
    fn test_response_prompt_block_is_reported() {
        let json = r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#;
        let response: GenerateContentResponse = serde_json::from_str(json).unwrap();
        assert!(matches!(
            response.into_text(),
            Err(GatewayError::Blocked { reason }) if reason == "SAFETY"
        ));
    }

    #[test]
    fn test_response_safety_finish_is_blocked() {
        let json = r#"{"candidates":[{"finishReason":"SAFETY"}]}"#;
        let response: GenerateContentResponse = serde_json::from_str(json).unwrap();
        assert!(matches!(response.into_text(), Err(GatewayError::Blocked { .. })));
    }

    #[test]
    fn test_response_without_candidates_is_empty() {
        let response: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        assert!(matches!(response.into_text(), Err(GatewayError::EmptyContent)));
    }

    #[test]
    fn test_retryable_status_classification() {
        assert!(matches!(
            retryable_error(429, "quota".into()),
            GatewayError::RateLimited { retries: MAX_RETRIES }
        ));
        assert!(matches!(
            retryable_error(503, "overloaded".into()),
            GatewayError::Api { status: 503, message } if message == "overloaded"
        ));
    }

    #[tokio::test]
    async fn test_missing_api_key_fails_before_network() {
        let gateway = GeminiGateway::new(None).unwrap();
        let result = gateway.generate("instruction").await;
        assert!(matches!(result, Err(GatewayError::MissingApiKey)));
    }
}
