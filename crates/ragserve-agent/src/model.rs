//! Responses-API model client

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use ragserve_core::{Error, Result, ToolSchema};

use crate::items::ConversationItem;

pub const DEFAULT_MODEL: &str = "gpt-5-nano";

/// The generation capability: instructions, accumulated input items and
/// tool schemas in, output items (messages and/or function calls) out.
#[async_trait]
pub trait ResponsesModel: Send + Sync {
    async fn respond(
        &self,
        instructions: &str,
        input: &[ConversationItem],
        tools: &[ToolSchema],
    ) -> Result<Vec<ConversationItem>>;
}

/// Client for the OpenAI `/v1/responses` endpoint
pub struct OpenAiResponsesModel {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

#[derive(Serialize)]
struct FunctionTool<'a> {
    r#type: &'static str,
    name: &'a str,
    description: &'a str,
    parameters: &'a serde_json::Value,
}

#[derive(Serialize)]
struct ResponsesRequest<'a> {
    model: &'a str,
    instructions: &'a str,
    input: &'a [ConversationItem],
    tools: Vec<FunctionTool<'a>>,
}

#[derive(Deserialize)]
struct ResponsesResponse {
    output: Vec<serde_json::Value>,
}

impl OpenAiResponsesModel {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into(),
            model: DEFAULT_MODEL.to_string(),
        })
    }

    /// Override the model id
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

#[async_trait]
impl ResponsesModel for OpenAiResponsesModel {
    async fn respond(
        &self,
        instructions: &str,
        input: &[ConversationItem],
        tools: &[ToolSchema],
    ) -> Result<Vec<ConversationItem>> {
        let request = ResponsesRequest {
            model: &self.model,
            instructions,
            input,
            tools: tools
                .iter()
                .map(|schema| FunctionTool {
                    r#type: "function",
                    name: &schema.name,
                    description: &schema.description,
                    parameters: &schema.parameters,
                })
                .collect(),
        };

        let url = format!("{}/v1/responses", self.base_url.trim_end_matches('/'));
        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(Error::Agent(format!(
                "model request failed with status {status}: {body}"
            )));
        }

        let parsed: ResponsesResponse = response
            .json()
            .await
            .map_err(|e| Error::Agent(e.to_string()))?;

        // The API emits item kinds we do not model (e.g. reasoning traces);
        // those are not part of the transcript we replay, so skip them.
        let items = parsed
            .output
            .into_iter()
            .filter_map(|value| match serde_json::from_value(value) {
                Ok(item) => Some(item),
                Err(e) => {
                    tracing::debug!("skipping unrecognized output item: {e}");
                    None
                }
            })
            .collect();

        Ok(items)
    }
}
