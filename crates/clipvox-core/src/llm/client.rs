//! LLM API HTTP Client
//!
//! Supports both OpenAI-compatible APIs and the Claude API.

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info, warn};

use crate::config::{LlmConfig, LlmProvider};
use crate::error::{Error, Result};

use super::generator::{CompletionRequest, TextGenerator};
use super::types::*;

/// LLM API client (supports OpenAI-compatible and Claude APIs)
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    provider: LlmProvider,
}

impl LlmClient {
    /// Create a new LLM client
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .map_err(Error::Http)?;

        let base_url = match &config.base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => match config.provider {
                LlmProvider::Claude => "https://api.anthropic.com/v1".to_string(),
                LlmProvider::OpenAi => "https://api.openai.com/v1".to_string(),
            },
        };

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            base_url,
            provider: config.provider.clone(),
        })
    }

    /// Send a request to the configured provider.
    ///
    /// `json_output` switches OpenAI-compatible providers into JSON-object mode;
    /// the Claude API has no equivalent and relies on the prompt alone.
    pub async fn messages(
        &self,
        request: MessagesRequest,
        json_output: bool,
    ) -> Result<MessagesResponse> {
        match self.provider {
            LlmProvider::Claude => self.send_claude_request(request).await,
            LlmProvider::OpenAi => self.send_openai_request(request, json_output).await,
        }
    }

    /// Send request to Claude API
    async fn send_claude_request(&self, request: MessagesRequest) -> Result<MessagesResponse> {
        let url = format!("{}/messages", self.base_url);

        debug!("Sending request to Claude API: {}", url);

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(Error::Http)?;

        let status = response.status();
        let body = response.text().await.map_err(Error::Http)?;

        if !status.is_success() {
            warn!("Claude API error: {} - {}", status, body);
            return Err(Error::LlmApi(format!("{}: {}", status, body)));
        }

        let parsed: MessagesResponse = serde_json::from_str(&body).map_err(|e| {
            Error::ProviderResponse(format!("Failed to parse response: {} - {}", e, body))
        })?;

        info!(
            "Claude API response: stop_reason={:?}, tokens={}",
            parsed.stop_reason,
            parsed.usage.as_ref().map(|u| u.output_tokens).unwrap_or(0)
        );

        Ok(parsed)
    }

    /// Send request to OpenAI-compatible API
    async fn send_openai_request(
        &self,
        request: MessagesRequest,
        json_output: bool,
    ) -> Result<MessagesResponse> {
        let url = format!("{}/chat/completions", self.base_url);

        debug!("Sending request to OpenAI-compatible API: {}", url);

        let openai_request = ChatCompletionRequest::from_messages_request(&request, json_output);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("content-type", "application/json")
            .json(&openai_request)
            .send()
            .await
            .map_err(Error::Http)?;

        let status = response.status();
        let body = response.text().await.map_err(Error::Http)?;

        if !status.is_success() {
            warn!("OpenAI API error: {} - {}", status, body);
            return Err(Error::LlmApi(format!("{}: {}", status, body)));
        }

        let openai_response: ChatCompletionResponse = serde_json::from_str(&body).map_err(|e| {
            Error::ProviderResponse(format!("Failed to parse response: {} - {}", e, body))
        })?;

        let parsed = openai_response.to_messages_response();

        info!(
            "OpenAI API response: stop_reason={:?}, tokens={}",
            parsed.stop_reason,
            parsed.usage.as_ref().map(|u| u.output_tokens).unwrap_or(0)
        );

        Ok(parsed)
    }

    /// Get the model name
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Get the provider type
    pub fn provider(&self) -> &LlmProvider {
        &self.provider
    }

    /// Get the API base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl TextGenerator for LlmClient {
    async fn generate(&self, request: CompletionRequest) -> Result<String> {
        let messages_request = MessagesRequest {
            model: self.model.clone(),
            max_tokens: request.max_tokens,
            system: Some(request.system),
            messages: vec![Message::user(request.prompt)],
            temperature: request.temperature,
        };

        let response = self.messages(messages_request, true).await?;
        let text = response.text();

        if text.trim().is_empty() {
            return Err(Error::ProviderResponse(
                "model returned an empty reply".to_string(),
            ));
        }

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(provider: LlmProvider, base_url: Option<&str>) -> LlmConfig {
        LlmConfig {
            api_key: "test-key".to_string(),
            model: "test-model".to_string(),
            provider,
            base_url: base_url.map(str::to_string),
        }
    }

    #[test]
    fn test_default_base_urls() {
        let openai = LlmClient::new(&config(LlmProvider::OpenAi, None)).unwrap();
        assert_eq!(openai.base_url(), "https://api.openai.com/v1");

        let claude = LlmClient::new(&config(LlmProvider::Claude, None)).unwrap();
        assert_eq!(claude.base_url(), "https://api.anthropic.com/v1");
    }

    #[test]
    fn test_custom_base_url_trailing_slash() {
        let client =
            LlmClient::new(&config(LlmProvider::OpenAi, Some("http://localhost:8080/v1/"))).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080/v1");
        assert_eq!(client.model(), "test-model");
        assert_eq!(client.provider(), &LlmProvider::OpenAi);
    }

    #[tokio::test]
    async fn test_openai_generate_uses_json_mode() {
        use wiremock::matchers::{body_partial_json, header, method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer test-key"))
            .and(body_partial_json(serde_json::json!({
                "model": "test-model",
                "response_format": {"type": "json_object"}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "chatcmpl-1",
                "model": "test-model",
                "choices": [{
                    "index": 0,
                    "message": {"role": "assistant", "content": "{\"title\": \"Tides\"}"},
                    "finish_reason": "stop"
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = LlmClient::new(&config(LlmProvider::OpenAi, Some(&server.uri()))).unwrap();
        let reply = client
            .generate(CompletionRequest::new("system", "plan it"))
            .await
            .unwrap();
        assert_eq!(reply, r#"{"title": "Tides"}"#);
    }

    #[tokio::test]
    async fn test_claude_generate() {
        use wiremock::matchers::{header, method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/messages"))
            .and(header("x-api-key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "msg_1",
                "model": "test-model",
                "content": [{"type": "text", "text": "{\"body\": \"Waves.\"}"}],
                "stop_reason": "end_turn",
                "usage": {"input_tokens": 10, "output_tokens": 5}
            })))
            .mount(&server)
            .await;

        let client = LlmClient::new(&config(LlmProvider::Claude, Some(&server.uri()))).unwrap();
        let reply = client
            .generate(CompletionRequest::new("system", "write it"))
            .await
            .unwrap();
        assert_eq!(reply, r#"{"body": "Waves."}"#);
    }

    #[tokio::test]
    async fn test_error_status_and_empty_reply() {
        use wiremock::matchers::method;
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
            .mount(&server)
            .await;

        let client = LlmClient::new(&config(LlmProvider::OpenAi, Some(&server.uri()))).unwrap();
        let err = client
            .generate(CompletionRequest::new("system", "x"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::LlmApi(ref msg) if msg.contains("rate limited")));

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"role": "assistant", "content": ""}}]
            })))
            .mount(&server)
            .await;

        let client = LlmClient::new(&config(LlmProvider::OpenAi, Some(&server.uri()))).unwrap();
        let err = client
            .generate(CompletionRequest::new("system", "x"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ProviderResponse(_)));
    }
}
