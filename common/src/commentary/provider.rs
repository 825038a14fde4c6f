use std::future::Future;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;

use crate::error::CommentaryError;
use crate::games::snake::GameStatus;
use super::config::CommentaryConfig;
use super::Commentary;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// One attempt at producing a remark. Retrying and fallback belong to
/// `CommentaryService`.
pub trait CommentaryProvider: Send + Sync + 'static {
    fn request(
        &self,
        score: u32,
        status: GameStatus,
    ) -> impl Future<Output = Result<Commentary, CommentaryError>> + Send;
}

/// Provider used when commentary is switched off; every request fails fast.
#[derive(Clone, Copy, Debug, Default)]
pub struct DisabledProvider;

impl CommentaryProvider for DisabledProvider {
    async fn request(&self, _score: u32, _status: GameStatus) -> Result<Commentary, CommentaryError> {
        Err(CommentaryError::Disabled)
    }
}

/// Calls the generateContent REST endpoint in JSON response mode.
pub struct GeminiProvider {
    client: Client,
    endpoint: String,
    model: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl GeminiProvider {
    pub fn new(endpoint: &str, model: &str, api_key: String) -> Result<Self, CommentaryError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key,
        })
    }

    pub fn from_config(config: &CommentaryConfig) -> Result<Self, CommentaryError> {
        let api_key = config
            .api_key()
            .ok_or_else(|| CommentaryError::MissingApiKey(config.api_key_env.clone()))?;
        Self::new(&config.endpoint, &config.model, api_key)
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }
}

impl CommentaryProvider for GeminiProvider {
    async fn request(&self, score: u32, status: GameStatus) -> Result<Commentary, CommentaryError> {
        let body = json!({
            "contents": [{ "parts": [{ "text": build_prompt(score, status) }] }],
            "generationConfig": { "responseMimeType": "application/json" }
        });

        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let http_status = response.status();
        if http_status == StatusCode::TOO_MANY_REQUESTS {
            return Err(CommentaryError::RateLimited);
        }
        if !http_status.is_success() {
            return Err(CommentaryError::Status(http_status.as_u16()));
        }

        let parsed: GenerateContentResponse = response.json().await?;
        let text = first_text(parsed)?;
        Ok(serde_json::from_str(strip_code_fence(&text))?)
    }
}

fn build_prompt(score: u32, status: GameStatus) -> String {
    format!(
        "You are a witty, slightly sarcastic AI commentator in a retro Snake game. \
         The current score is {score} and the game status is {status}. \
         Give a short, sharp, one-sentence remark about the player's performance \
         using gaming terminology. \
         Reply with a JSON object with two fields: 'message' (string) and 'type' \
         (one of 'encouragement', 'sarcasm', 'advice', 'congratulations')."
    )
}

fn first_text(response: GenerateContentResponse) -> Result<String, CommentaryError> {
    response
        .candidates
        .into_iter()
        .filter_map(|candidate| candidate.content)
        .flat_map(|content| content.parts)
        .filter_map(|part| part.text)
        .find(|text| !text.trim().is_empty())
        .ok_or(CommentaryError::EmptyResponse)
}

/// Some models wrap JSON mode output in a markdown fence anyway.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commentary::CommentaryKind;

    #[test]
    fn test_first_text_reads_first_non_empty_part() {
        let raw = r#"{
            "candidates": [{
                "content": { "parts": [{ "text": "" }, { "text": "{\"message\":\"Go!\",\"type\":\"advice\"}" }] }
            }]
        }"#;
        let response: GenerateContentResponse = serde_json::from_str(raw).unwrap();

        let text = first_text(response).unwrap();
        let commentary: Commentary = serde_json::from_str(&text).unwrap();

        assert_eq!(commentary.kind, CommentaryKind::Advice);
        assert_eq!(commentary.message, "Go!");
    }

    #[test]
    fn test_missing_candidates_is_empty_response() {
        let response: GenerateContentResponse = serde_json::from_str("{}").unwrap();

        assert!(matches!(first_text(response), Err(CommentaryError::EmptyResponse)));
    }

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("  {\"a\":1} "), "{\"a\":1}");
    }

    #[test]
    fn test_prompt_mentions_score_and_status() {
        let prompt = build_prompt(15, GameStatus::GameOver);

        assert!(prompt.contains("15"));
        assert!(prompt.contains("GAME_OVER"));
    }

    #[test]
    fn test_url_trims_trailing_slash() {
        let provider = GeminiProvider::new("https://example.com/v1beta/", "m", "k".to_string()).unwrap();

        assert_eq!(provider.url(), "https://example.com/v1beta/models/m:generateContent");
    }

    #[tokio::test]
    async fn test_disabled_provider_fails() {
        let result = DisabledProvider.request(5, GameStatus::Playing).await;

        assert!(matches!(result, Err(CommentaryError::Disabled)));
    }
}
