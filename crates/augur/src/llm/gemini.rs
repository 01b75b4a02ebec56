// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2024 Jonathan Lee
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License version 3
// as published by the Free Software Foundation.
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
// See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see https://www.gnu.org/licenses/.

use async_trait::async_trait;
use augur_contracts::{GenerationRequest, LlmError, LlmResult, ProviderResponse, Usage};
use chrono::Utc;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::{debug, info};

use super::ApiClient;

pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.5-pro";

#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    endpoint: String,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: String, endpoint: Option<String>, model: Option<String>) -> Self {
        Self {
            client: Client::new(),
            api_key,
            endpoint: endpoint.unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        }
    }

    /// Fail-fast construction: a missing API key refuses to initialise.
    pub fn from_env() -> LlmResult<Self> {
        let api_key = std::env::var("GEMINI_API_KEY").map_err(|_| {
            LlmError::Configuration("GEMINI_API_KEY environment variable not set".to_string())
        })?;
        let endpoint = std::env::var("GEMINI_ENDPOINT").ok();
        let model = std::env::var("GEMINI_MODEL").ok();
        Ok(Self::new(api_key, endpoint, model))
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn build_payload(&self, request: &GenerationRequest) -> Value {
        let mut payload = json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": request.prompt }]
            }]
        });

        if let Some(system_prompt) = &request.system_prompt {
            payload["systemInstruction"] = json!({
                "parts": [{ "text": system_prompt }]
            });
        }

        let mut generation_config = json!({});
        let config = &request.generation_config;
        if let Some(max_tokens) = config.max_tokens {
            generation_config["maxOutputTokens"] = json!(max_tokens);
        }
        if let Some(temperature) = config.temperature {
            generation_config["temperature"] = json!(temperature);
        }
        if let Some(mime_type) = &config.response_mime_type {
            generation_config["responseMimeType"] = json!(mime_type);
        }
        if let Some(stop) = &config.stop_sequences {
            generation_config["stopSequences"] = json!(stop);
        }
        payload["generationConfig"] = generation_config;

        payload
    }

    fn parse_gemini_response(&self, response_data: Value) -> LlmResult<ProviderResponse> {
        let content = response_data["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .ok_or_else(|| {
                LlmError::Provider("Failed to extract content from Gemini response".to_string())
            })?;

        let usage = if let Some(usage_data) = response_data.get("usageMetadata") {
            Usage {
                prompt_tokens: usage_data["promptTokenCount"].as_u64().unwrap_or(0) as u32,
                completion_tokens: usage_data["candidatesTokenCount"].as_u64().unwrap_or(0) as u32,
                total_tokens: usage_data["totalTokenCount"].as_u64().unwrap_or(0) as u32,
            }
        } else {
            Usage::default()
        };

        let finish_reason = response_data["candidates"][0]["finishReason"]
            .as_str()
            .map(str::to_string);

        Ok(ProviderResponse {
            content: content.to_string(),
            model: self.model.clone(),
            usage,
            finish_reason,
            raw_response: response_data,
            created_at: Utc::now(),
        })
    }

    async fn execute_request(&self, payload: Value) -> LlmResult<Value> {
        let url = format!("{}/models/{}:generateContent", self.endpoint, self.model);
        debug!(model = %self.model, "Sending request to Gemini API");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(&payload)
            .send()
            .await
            .map_err(|e| LlmError::Network(format!("Request failed: {e}")))?;

        let status = response.status();
        info!("Received response from Gemini API: {}", status);

        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Err(LlmError::Authentication(format!(
                "Gemini API rejected the credentials: {status}"
            )));
        }
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(LlmError::Provider(format!(
                "Gemini API error {status}: {error_body}"
            )));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| LlmError::Serialisation(format!("Failed to parse JSON response: {e}")))
    }
}

#[async_trait]
impl ApiClient for GeminiClient {
    async fn generate(&self, request: GenerationRequest) -> LlmResult<ProviderResponse> {
        let payload = self.build_payload(&request);
        let response_data = self.execute_request(payload).await?;
        self.parse_gemini_response(response_data)
    }

    fn provider_name(&self) -> &'static str {
        "gemini"
    }
}
