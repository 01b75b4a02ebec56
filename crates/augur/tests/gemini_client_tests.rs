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

use augur::llm::{ApiClient, GeminiClient};
use augur_contracts::{GenerationRequest, LlmError};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> GeminiClient {
    GeminiClient::new(
        "test-key".to_string(),
        Some(server.uri()),
        Some("gemini-2.5-pro".to_string()),
    )
}

#[tokio::test]
async fn test_generate_extracts_content_and_usage() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/gemini-2.5-pro:generateContent"))
        .and(header("x-goog-api-key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": { "parts": [{ "text": "{\"a\":1}" }] },
                "finishReason": "STOP"
            }],
            "usageMetadata": {
                "promptTokenCount": 120,
                "candidatesTokenCount": 30,
                "totalTokenCount": 150
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let response = client
        .generate(GenerationRequest::json("analyse this"))
        .await
        .unwrap();

    assert_eq!(response.content, "{\"a\":1}");
    assert_eq!(response.usage.prompt_tokens, 120);
    assert_eq!(response.usage.total_tokens, 150);
    assert_eq!(response.finish_reason.as_deref(), Some("STOP"));
    assert_eq!(response.model, "gemini-2.5-pro");
}

#[tokio::test]
async fn test_json_requests_carry_response_mime_type() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "generationConfig": { "responseMimeType": "application/json" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{ "content": { "parts": [{ "text": "{}" }] } }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    client
        .generate(GenerationRequest::json("analyse this"))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_authentication_failure_is_mapped() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let error = client
        .generate(GenerationRequest::new("hello"))
        .await
        .unwrap_err();
    assert!(matches!(error, LlmError::Authentication(_)));
}

#[tokio::test]
async fn test_server_error_is_mapped_to_provider() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let error = client
        .generate(GenerationRequest::new("hello"))
        .await
        .unwrap_err();
    assert!(matches!(error, LlmError::Provider(_)));
}

#[tokio::test]
async fn test_missing_candidates_is_a_provider_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let error = client
        .generate(GenerationRequest::new("hello"))
        .await
        .unwrap_err();
    assert!(matches!(error, LlmError::Provider(_)));
}
