use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use pulse_core::ProviderError;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::debug;

use crate::provider::{GenerateRequest, Provider};
use crate::wire::{
    ApiError, Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig,
    GoogleSearch, RequestPart, Tool,
};

pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

const API_KEY_HEADER: &str = "x-goog-api-key";
const JSON_MIME: &str = "application/json";

/// Gemini REST client.
///
/// Without an API key every call fails with
/// [`ProviderError::MissingCredential`] and no request is sent.
#[derive(Clone)]
pub struct GeminiClient {
    http: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiClient")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl GeminiClient {
    pub fn builder() -> GeminiClientBuilder {
        GeminiClientBuilder::default()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

#[derive(Debug, Clone)]
pub struct GeminiClientBuilder {
    api_key: Option<String>,
    model: String,
    base_url: String,
    timeout: Duration,
}

impl Default for GeminiClientBuilder {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_owned(),
            base_url: DEFAULT_BASE_URL.to_owned(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl GeminiClientBuilder {
    /// Blank keys count as missing.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        let key = key.into();
        self.api_key = (!key.trim().is_empty()).then_some(key);
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Whole-request timeout applied by the HTTP transport.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build(self) -> Result<GeminiClient, ProviderError> {
        let http = Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| ProviderError::Transport(e.to_string()))?;
        Ok(GeminiClient {
            http,
            base_url: self.base_url,
            model: self.model,
            api_key: self.api_key,
        })
    }
}

fn status_error(status: StatusCode, body: &str) -> ProviderError {
    let message = serde_json::from_str::<ApiError>(body)
        .ok()
        .and_then(|api_error| api_error.error.describe())
        .unwrap_or_else(|| {
            if body.trim().is_empty() {
                status.canonical_reason().unwrap_or_default().to_owned()
            } else {
                body.to_owned()
            }
        });
    ProviderError::Status {
        status: status.as_u16(),
        message,
    }
}

#[async_trait]
impl Provider for GeminiClient {
    async fn generate(&self, request: &GenerateRequest) -> Result<Value, ProviderError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ProviderError::MissingCredential)?;

        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![RequestPart {
                    text: &request.prompt,
                }],
            }],
            tools: if request.grounded {
                vec![Tool {
                    google_search: GoogleSearch {},
                }]
            } else {
                Vec::new()
            },
            generation_config: request.response_schema.as_ref().map(|schema| GenerationConfig {
                response_mime_type: JSON_MIME,
                response_schema: schema,
            }),
        };

        debug!(model = %self.model, grounded = request.grounded, "sending generateContent");
        let response = self
            .http
            .post(self.endpoint())
            .header(API_KEY_HEADER, api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;
        debug!(model = %self.model, status = status.as_u16(), "generateContent answered");

        if !status.is_success() {
            return Err(status_error(status, &text));
        }

        let answer = serde_json::from_str::<GenerateContentResponse>(&text)
            .map_err(|e| ProviderError::Parse(e.to_string()))?
            .text();
        if answer.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&answer).map_err(|e| ProviderError::Parse(e.to_string()))
    }

    fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }
}
