//! OpenAI-compatible chat completion client.
//! Any endpoint speaking the `/v1/chat/completions` protocol works; the
//! endpoint, model and key come from the environment.

use super::{ChatModel, ChatRequest};
use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use tracing::{debug, trace};

pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-5-nano";
/// Question generation over a long transcript can take minutes.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(180);

/// Connection settings for [`OpenAiChat`].
#[derive(Debug, Clone)]
pub struct OpenAiSettings {
    pub api_key: String,
    pub endpoint: String,
    pub model: String,
    pub timeout: Duration,
}

impl OpenAiSettings {
    /// Read `OPENAI_API_KEY` (required) and the optional `OPENAI_API_ENDPOINT`,
    /// `OPENAI_MODEL` and `OPENAI_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self> {
        let api_key = env::var("OPENAI_API_KEY").context("OPENAI_API_KEY is not set")?;
        let endpoint =
            env::var("OPENAI_API_ENDPOINT").unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string());
        let model = env::var("OPENAI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let timeout = match env::var("OPENAI_TIMEOUT_SECS") {
            Ok(secs) => Duration::from_secs(
                secs.trim()
                    .parse()
                    .with_context(|| format!("OPENAI_TIMEOUT_SECS is not a number: {secs:?}"))?,
            ),
            Err(_) => DEFAULT_TIMEOUT,
        };
        Ok(Self {
            api_key,
            endpoint,
            model,
            timeout,
        })
    }
}

/// Chat model backed by an OpenAI-compatible HTTP endpoint.
pub struct OpenAiChat {
    client: Client,
    settings: OpenAiSettings,
}

impl OpenAiChat {
    pub fn new(settings: OpenAiSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(settings.timeout)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self { client, settings })
    }

    /// Create a client from the environment, see [`OpenAiSettings::from_env`].
    pub fn from_env() -> Result<Self> {
        Self::new(OpenAiSettings::from_env()?)
    }

    pub fn settings(&self) -> &OpenAiSettings {
        &self.settings
    }
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct CompletionBody<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    temperature: f32,
    top_p: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct Completion {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Reply,
}

#[derive(Deserialize)]
struct Reply {
    content: Option<String>,
}

#[async_trait]
impl ChatModel for OpenAiChat {
    /// Post the system and user messages and return the first choice's text.
    async fn complete(&self, request: &ChatRequest) -> Result<String> {
        let settings = &self.settings;
        trace!(
            "complete endpoint={} model={}",
            settings.endpoint,
            settings.model
        );
        let body = CompletionBody {
            model: &settings.model,
            messages: vec![
                Message {
                    role: "system",
                    content: &request.system,
                },
                Message {
                    role: "user",
                    content: &request.user,
                },
            ],
            temperature: request.temperature,
            top_p: request.top_p,
            max_tokens: request.max_tokens,
        };
        let resp = self
            .client
            .post(&settings.endpoint)
            .bearer_auth(&settings.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    anyhow!("request timed out after {}s", settings.timeout.as_secs())
                } else {
                    anyhow!(err).context(format!("request to {} failed", settings.endpoint))
                }
            })?;
        let status = resp.status();
        if !status.is_success() {
            let detail = resp.text().await.unwrap_or_default();
            if detail.contains("MODEL_NOT_FOUND") {
                bail!(
                    "model {:?} is not available at {}",
                    settings.model,
                    settings.endpoint
                );
            }
            bail!("{} returned {status}: {detail}", settings.endpoint);
        }
        let completion: Completion = resp
            .json()
            .await
            .context("unexpected chat completion response")?;
        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| anyhow!("chat completion response contained no text"))?;
        debug!("received {} bytes from {}", content.len(), settings.model);
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn chat(server: &MockServer) -> OpenAiChat {
        OpenAiChat::new(OpenAiSettings {
            api_key: "test-key".to_string(),
            endpoint: server.url("/v1/chat/completions"),
            model: "test-model".to_string(),
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    fn request() -> ChatRequest {
        ChatRequest {
            system: "sys".to_string(),
            user: "usr".to_string(),
            temperature: 1.0,
            top_p: 1.0,
            max_tokens: 2500,
        }
    }

    #[tokio::test]
    async fn posts_messages_and_returns_first_choice() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/v1/chat/completions")
                    .header("authorization", "Bearer test-key")
                    .json_body_partial(
                        r#"{"model":"test-model","max_tokens":2500,"messages":[{"role":"system","content":"sys"},{"role":"user","content":"usr"}]}"#,
                    );
                then.status(200).json_body(json!({
                    "choices": [{"message": {"role": "assistant", "content": "1. Q? [00:01]"}}]
                }));
            })
            .await;
        let text = chat(&server).complete(&request()).await.unwrap();
        assert_eq!(text, "1. Q? [00:01]");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn surfaces_http_errors() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/v1/chat/completions");
                then.status(500).body("overloaded");
            })
            .await;
        let err = chat(&server).complete(&request()).await.unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("500"), "{msg}");
        assert!(msg.contains("overloaded"), "{msg}");
    }

    #[tokio::test]
    async fn reports_missing_model() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/v1/chat/completions");
                then.status(404)
                    .json_body(json!({"reason": "MODEL_NOT_FOUND", "message": "no such model"}));
            })
            .await;
        let err = chat(&server).complete(&request()).await.unwrap_err();
        assert!(err.to_string().contains("\"test-model\" is not available"));
    }

    #[tokio::test]
    async fn rejects_empty_choices() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/v1/chat/completions");
                then.status(200).json_body(json!({"choices": []}));
            })
            .await;
        let err = chat(&server).complete(&request()).await.unwrap_err();
        assert!(err.to_string().contains("no text"));
    }
}
