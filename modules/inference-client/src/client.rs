use async_trait::async_trait;
use tracing::debug;

use crate::error::{InferenceError, Result};
use crate::types::*;
use crate::{Inference, SchemaRequest};

/// Client for any OpenAI-compatible chat completions endpoint. The default
/// base URL targets a local Ollama server; hosted providers work by swapping
/// the base URL and supplying an API key.
#[derive(Clone)]
pub struct InferenceClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

const DEFAULT_BASE_URL: &str = "http://localhost:11434/v1";

impl InferenceClient {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: model.into(),
            api_key: None,
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl Inference for InferenceClient {
    async fn structured(&self, request: SchemaRequest) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);

        let wire = StructuredRequest {
            model: self.model.clone(),
            messages: vec![
                WireMessage::system(request.system),
                WireMessage::user(request.user),
            ],
            temperature: Some(0.0),
            response_format: ResponseFormat {
                format_type: "json_schema".to_string(),
                json_schema: JsonSchemaFormat {
                    name: request.name,
                    strict: true,
                    schema: request.schema,
                },
            },
        };

        debug!(model = %wire.model, contract = %wire.response_format.json_schema.name, "Structured inference request");

        let mut builder = self.http.post(&url).json(&wire);
        if let Some(ref key) = self.api_key {
            builder = builder.bearer_auth(key);
        }
        let response = builder.send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(InferenceError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let chat: ChatResponse = response.json().await?;
        chat.first_content().ok_or(InferenceError::EmptyResponse)
    }
}
