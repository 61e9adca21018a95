//! Draft generation through an OpenAI-compatible chat completions API.
//!
//! One request per call. Failures are returned to the caller; nothing here
//! retries.

use crate::config::AgentConfig;
use crate::error::{ConfigError, GenerationError};
use crate::prompts;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

const TEMPERATURE: f32 = 0.7;

/// Produces raw draft text for a topic, or a revision of an earlier draft.
pub trait DraftGenerator {
    fn generate(&self, topic: &str) -> Result<String, GenerationError>;

    fn refine(&self, topic: &str, current_draft: &str, feedback: &str)
        -> Result<String, GenerationError>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Chat completions client for draft generation.
#[derive(Clone)]
pub struct ContentGenerator {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
    system_prompt: String,
}

impl ContentGenerator {
    /// Fails with [`ConfigError::Missing`] when no API key is configured.
    pub fn new(config: &AgentConfig) -> Result<Self, ConfigError> {
        let api_key = config.require_groq_key()?.to_string();
        let client = Client::builder()
            .timeout(config.generation_timeout)
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", config.groq_api_url),
            api_key,
            model: config.model.clone(),
            system_prompt: prompts::system_prompt(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn complete(&self, user_prompt: &str) -> Result<String, GenerationError> {
        let request = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &self.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt,
                },
            ],
            temperature: TEMPERATURE,
            response_format: ResponseFormat {
                kind: "json_object",
            },
        };

        log::debug!("Requesting draft from {} ({})", self.endpoint, self.model);
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()?;

        let status = response.status();
        let body = response.text()?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            log::warn!("Generation API returned {}: {}", status, message);
            return Err(GenerationError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ChatResponse = serde_json::from_str(&body)?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(GenerationError::EmptyContent)?;

        log::debug!("Received {} characters of draft", content.len());
        Ok(content)
    }
}

impl DraftGenerator for ContentGenerator {
    fn generate(&self, topic: &str) -> Result<String, GenerationError> {
        self.complete(&prompts::topic_prompt(topic))
    }

    fn refine(
        &self,
        topic: &str,
        current_draft: &str,
        feedback: &str,
    ) -> Result<String, GenerationError> {
        self.complete(&prompts::refine_prompt(topic, current_draft, feedback))
    }
}
