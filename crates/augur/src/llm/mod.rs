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

pub mod gemini;

pub use gemini::GeminiClient;

use async_trait::async_trait;
use augur_contracts::{GenerationRequest, LlmResult, ProviderResponse};

#[async_trait]
pub trait ApiClient: Send + Sync {
    async fn generate(&self, request: GenerationRequest) -> LlmResult<ProviderResponse>;

    fn provider_name(&self) -> &'static str;
}

/// Extracts the JSON payload from model output. Prefers a fenced
/// ```json block; otherwise scans for the first balanced top-level object.
pub fn extract_json_from_response(content: &str) -> Option<String> {
    if let Some(start) = content.find("```json") {
        if let Some(end) = content[start + 7..].find("```") {
            let json_block = &content[start + 7..start + 7 + end];
            if serde_json::from_str::<serde_json::Value>(json_block.trim()).is_ok() {
                return Some(json_block.trim().to_string());
            }
        }
    }

    if let Some(start_pos) = content.find('{') {
        let mut brace_count = 0;
        let mut in_string = false;
        let mut escape_next = false;

        for (i, char) in content[start_pos..].char_indices() {
            if escape_next {
                escape_next = false;
                continue;
            }

            match char {
                '"' if !escape_next => in_string = !in_string,
                '\\' if in_string => escape_next = true,
                '{' if !in_string => brace_count += 1,
                '}' if !in_string => {
                    brace_count -= 1;
                    if brace_count == 0 {
                        let json_str = &content[start_pos..start_pos + i + 1];
                        if serde_json::from_str::<serde_json::Value>(json_str).is_ok() {
                            return Some(json_str.to_string());
                        }
                        break;
                    }
                }
                _ => {}
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_json_strips_fences() {
        let content = "```json\n{\"a\":1}\n```";
        assert_eq!(extract_json_from_response(content), Some("{\"a\":1}".to_string()));
    }

    #[test]
    fn test_extract_json_accepts_bare_object() {
        let content = "{\"statistics\":{},\"charts\":[]}";
        assert_eq!(
            extract_json_from_response(content),
            Some("{\"statistics\":{},\"charts\":[]}".to_string())
        );
    }

    #[test]
    fn test_extract_json_finds_object_inside_prose() {
        let content = "Here is the result: {\"a\": {\"b\": 2}} as requested.";
        assert_eq!(
            extract_json_from_response(content),
            Some("{\"a\": {\"b\": 2}}".to_string())
        );
    }

    #[test]
    fn test_extract_json_rejects_plain_prose() {
        assert_eq!(extract_json_from_response("I cannot analyse this dataset."), None);
    }

    #[test]
    fn test_extract_json_ignores_braces_inside_strings() {
        let content = "{\"a\": \"}{\", \"b\": 1}";
        assert_eq!(
            extract_json_from_response(content),
            Some("{\"a\": \"}{\", \"b\": 1}".to_string())
        );
    }
}
