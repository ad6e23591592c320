use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Failure talking to the inference backend
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("backend not reachable at {url}: {reason}")]
    Unreachable { url: String, reason: String },

    #[error("backend returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("request failed: {0}")]
    Transport(String),

    #[error("unexpected response body: {0}")]
    ResponseParsing(String),
}

/// A language-model service that can answer a system + user prompt pair
#[async_trait]
pub trait InferenceBackend: Send + Sync {
    /// Confirm the service is reachable before any work begins
    async fn probe(&self) -> Result<(), BackendError>;

    /// Run one prompt to completion and return the raw response text
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, BackendError>;
}

/// Configuration for the Ollama HTTP client
#[derive(Debug, Clone)]
pub struct OllamaConfig {
    /// Base URL of the Ollama server
    pub base_url: String,
    /// Model to use (e.g., "llama3.2")
    pub model: String,
    /// Temperature (lower = more deterministic)
    pub temperature: f64,
    /// Timeout for the connectivity probe
    pub probe_timeout: Duration,
    /// Timeout for inference requests (none = wait indefinitely)
    pub request_timeout: Option<Duration>,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            model: "llama3.2".to_string(),
            temperature: 0.1,
            probe_timeout: Duration::from_secs(5),
            request_timeout: None,
        }
    }
}

impl OllamaConfig {
    /// Create with custom endpoint and model
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            model: model.into(),
            ..Default::default()
        }
    }

    /// Reject settings the backend would refuse
    pub fn validate(&self) -> crate::error::Result<()> {
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(crate::error::AnalysisError::InvalidConfig(format!(
                "backend URL must start with http:// or https://, got {}",
                self.base_url
            )));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(crate::error::AnalysisError::InvalidConfig(format!(
                "temperature must be between 0 and 2, got {}",
                self.temperature
            )));
        }
        Ok(())
    }
}

/// Ollama API client
pub struct OllamaClient {
    client: Client,
    config: OllamaConfig,
}

impl OllamaClient {
    pub fn new(config: OllamaConfig) -> Result<Self, BackendError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &OllamaConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn unreachable(&self, reason: impl Into<String>) -> BackendError {
        BackendError::Unreachable {
            url: self.config.base_url.clone(),
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl InferenceBackend for OllamaClient {
    async fn probe(&self) -> Result<(), BackendError> {
        let response = self
            .client
            .get(self.url("/api/tags"))
            .timeout(self.config.probe_timeout)
            .send()
            .await
            .map_err(|e| self.unreachable(e.to_string()))?;

        if response.status() != StatusCode::OK {
            return Err(self.unreachable(format!("probe returned HTTP {}", response.status())));
        }

        // The model list is advisory; Ollama can still pull a missing model on first use
        match response.json::<TagsResponse>().await {
            Ok(tags) => {
                if !tags.has_model(&self.config.model) {
                    warn!(
                        "Model {} not installed on {} (available: {:?})",
                        self.config.model,
                        self.config.base_url,
                        tags.names()
                    );
                }
            }
            Err(e) => debug!("Could not parse model list: {}", e),
        }

        Ok(())
    }

    async fn complete(&self, system: &str, prompt: &str) -> Result<String, BackendError> {
        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt.to_string(),
                },
            ],
            stream: false,
            options: ChatOptions {
                temperature: self.config.temperature,
            },
        };

        let response = self
            .client
            .post(self.url("/api/chat"))
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    self.unreachable(e.to_string())
                } else {
                    BackendError::Transport(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Status { status, body });
        }

        let response: ChatResponse = response
            .json()
            .await
            .map_err(|e| BackendError::ResponseParsing(e.to_string()))?;

        Ok(response.message.content)
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    stream: bool,
    options: ChatOptions,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatOptions {
    temperature: f64,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<TagModel>,
}

#[derive(Debug, Deserialize)]
struct TagModel {
    name: String,
}

impl TagsResponse {
    fn names(&self) -> Vec<&str> {
        self.models.iter().map(|m| m.name.as_str()).collect()
    }

    /// Ollama lists "llama3.2" as "llama3.2:latest"
    fn has_model(&self, model: &str) -> bool {
        self.models
            .iter()
            .any(|m| m.name == model || m.name.split(':').next() == Some(model))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_request_shape() {
        let request = ChatRequest {
            model: "llama3.2".to_string(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: "hi".to_string(),
            }],
            stream: false,
            options: ChatOptions { temperature: 0.1 },
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "llama3.2");
        assert_eq!(json["stream"], false);
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["options"]["temperature"], 0.1);
    }

    #[test]
    fn test_parse_chat_response() {
        let json = r#"{
            "model": "llama3.2",
            "created_at": "2024-10-19T10:00:00Z",
            "message": {"role": "assistant", "content": "10/02,-4.23,POS PURCHASE"},
            "done": true
        }"#;

        let response: ChatResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.message.content, "10/02,-4.23,POS PURCHASE");
    }

    #[test]
    fn test_tags_model_matching() {
        let tags: TagsResponse = serde_json::from_str(
            r#"{"models": [{"name": "llama3.2:latest"}, {"name": "mistral:7b"}]}"#,
        )
        .unwrap();

        assert!(tags.has_model("llama3.2"));
        assert!(tags.has_model("mistral:7b"));
        assert!(!tags.has_model("phi3"));
    }

    #[test]
    fn test_config_validation() {
        assert!(OllamaConfig::default().validate().is_ok());

        let mut config = OllamaConfig::default();
        config.temperature = 3.5;
        assert!(config.validate().is_err());

        let config = OllamaConfig::new("localhost:11434", "llama3.2");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_url_trims_trailing_slash() {
        let client = OllamaClient::new(OllamaConfig::new("http://localhost:11434/", "llama3.2"))
            .unwrap();
        assert_eq!(client.url("/api/tags"), "http://localhost:11434/api/tags");
    }

    #[tokio::test]
    async fn test_probe_unreachable() {
        let mut config = OllamaConfig::new("http://127.0.0.1:1", "llama3.2");
        config.probe_timeout = Duration::from_millis(500);
        let client = OllamaClient::new(config).unwrap();

        let err = client.probe().await.unwrap_err();
        assert!(matches!(err, BackendError::Unreachable { .. }));
    }
}
