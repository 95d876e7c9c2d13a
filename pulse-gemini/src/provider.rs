use std::sync::Arc;

use async_trait::async_trait;
use pulse_core::ProviderError;
use serde_json::Value;

/// One generation request.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateRequest {
    /// Free-text instruction.
    pub prompt: String,
    /// JSON schema the answer must follow. Requests JSON output when set.
    pub response_schema: Option<Value>,
    /// Whether the model may ground its answer with web search.
    pub grounded: bool,
}

impl GenerateRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            response_schema: None,
            grounded: false,
        }
    }

    pub fn schema(mut self, schema: Value) -> Self {
        self.response_schema = Some(schema);
        self
    }

    pub fn grounded(mut self) -> Self {
        self.grounded = true;
        self
    }
}

/// The content-generation provider.
///
/// Returns the parsed JSON answer, or `Value::Null` when the provider
/// answered with no text at all.
#[async_trait]
pub trait Provider: Send + Sync {
    async fn generate(&self, request: &GenerateRequest) -> Result<Value, ProviderError>;

    /// `false` when calls would certainly fail for lack of an API key.
    fn has_credential(&self) -> bool {
        true
    }
}

#[async_trait]
impl<P: Provider + ?Sized> Provider for Arc<P> {
    async fn generate(&self, request: &GenerateRequest) -> Result<Value, ProviderError> {
        (**self).generate(request).await
    }

    fn has_credential(&self) -> bool {
        (**self).has_credential()
    }
}

#[async_trait]
impl Provider for Box<dyn Provider> {
    async fn generate(&self, request: &GenerateRequest) -> Result<Value, ProviderError> {
        (**self).generate(request).await
    }

    fn has_credential(&self) -> bool {
        (**self).has_credential()
    }
}
