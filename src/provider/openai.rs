use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::{Result, SkinGenError};
use crate::profile::RoutineResult;

/// Fixed sampling temperature for hosted chat models.
pub const CHAT_TEMPERATURE: f64 = 0.7;

/// Sends the built prompt as a single user message to an OpenAI-compatible
/// `/v1/chat/completions` endpoint.
pub struct RemoteChatBackend {
    model: String,
    api_base: String,
    api_key: Option<String>,
    client: Client,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Msg<'a>>,
    temperature: f64,
}

#[derive(Serialize)]
struct Msg<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

impl RemoteChatBackend {
    pub fn new(
        model: String,
        api_base: String,
        api_key: Option<String>,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }
        let client = builder
            .build()
            .map_err(|e| SkinGenError::Configuration(format!("http client: {e}")))?;
        Ok(Self { model, api_base, api_key, client })
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/chat/completions", self.api_base.trim_end_matches('/'))
    }
}

#[async_trait]
impl super::Backend for RemoteChatBackend {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn generate(&self, prompt: &str) -> Result<RoutineResult> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            SkinGenError::Configuration("provider API key is not set (export OPENAI_API_KEY)".into())
        })?;

        let body = ChatRequest {
            model: &self.model,
            messages: vec![Msg { role: "user", content: prompt }],
            temperature: CHAT_TEMPERATURE,
        };

        let url = self.endpoint();
        tracing::debug!(%url, model = %self.model, "sending chat completion");

        let resp = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| SkinGenError::Generation(format!("chat request failed: {e}")))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| SkinGenError::Generation(format!("reading chat response: {e}")))?;

        if !status.is_success() {
            tracing::warn!(%status, "chat endpoint returned an error");
            return Err(SkinGenError::Generation(format!("API error ({status}): {text}")));
        }

        let parsed: ChatResponse = serde_json::from_str(&text)
            .map_err(|e| SkinGenError::Generation(format!("unparsable chat response: {e}")))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| SkinGenError::Generation("model returned no text".into()))?;

        Ok(RoutineResult::new(content))
    }
}
