use anyhow::{Context, Result, bail};
use serde_json::json;

/// The external generation capability: hand the model a prompt, get back
/// free-form text. Implemented by [`LlmClient`] for the real API and by
/// scripted fakes in tests.
pub trait TextGenerator {
    async fn complete(&self, prompt: &str, temperature: f32, max_tokens: u32) -> Result<String>;
}

/// Client for an OpenAI-compatible chat-completions endpoint. Constructed
/// once at startup and shared across requests; the underlying reqwest
/// client pools connections.
pub struct LlmClient {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
}

impl LlmClient {
    /// Missing credentials fail here, at startup, so no request ever gets
    /// far enough to attempt a generation call that cannot succeed.
    pub fn from_env() -> Result<Self> {
        let api_key =
            std::env::var("LLM_API_KEY").context("LLM_API_KEY environment variable is not set")?;
        let api_url = std::env::var("LLM_API_URL")
            .unwrap_or_else(|_| "https://api.groq.com/openai/v1/chat/completions".to_string());
        let model =
            std::env::var("LLM_MODEL").unwrap_or_else(|_| "llama-3.1-8b-instant".to_string());

        Ok(LlmClient {
            client: reqwest::Client::new(),
            api_url,
            api_key,
            model,
        })
    }
}

impl TextGenerator for LlmClient {
    async fn complete(&self, prompt: &str, temperature: f32, max_tokens: u32) -> Result<String> {
        tracing::debug!(prompt_len = prompt.len(), model = %self.model, "calling generation API");

        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&json!({
                "model": self.model,
                "messages": [{"role": "user", "content": prompt}],
                "temperature": temperature,
                "max_tokens": max_tokens,
            }))
            .send()
            .await
            .context("generation API request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("generation API returned {}: {}", status, body);
        }

        let body: serde_json::Value = response
            .json()
            .await
            .context("generation API response was not JSON")?;

        body.get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .map(|s| s.to_string())
            .context("generation API response had no message content")
    }
}
