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

use augur_contracts::{DescriptiveAnalysisResult, GenerationRequest, RegressionResult};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::analysis::prompts;
use crate::error::AugurError;
use crate::llm::{extract_json_from_response, ApiClient};

/// Requests descriptive statistics and chart suggestions for a dataset.
/// The model's answer is treated as untrusted: it must be parseable JSON
/// of the exact expected shape before it is accepted.
pub struct AnalysisRequester {
    client: Arc<dyn ApiClient>,
}

impl AnalysisRequester {
    pub fn new(client: Arc<dyn ApiClient>) -> Self {
        Self { client }
    }

    pub async fn descriptive_analysis(
        &self,
        csv_text: &str,
    ) -> Result<DescriptiveAnalysisResult, AugurError> {
        if csv_text.trim().is_empty() {
            return Err(AugurError::AnalysisRequest("dataset is empty".to_string()));
        }

        let prompt = prompts::descriptive_analysis_prompt(csv_text);
        let result: DescriptiveAnalysisResult = request_json(&*self.client, prompt)
            .await
            .map_err(AugurError::AnalysisRequest)?;
        result
            .validate()
            .map_err(|e| AugurError::AnalysisRequest(e.to_string()))?;
        Ok(result)
    }
}

/// Requests a multivariate linear regression fit. Variable validity is the
/// caller's responsibility; this component only enforces response shape.
pub struct RegressionRequester {
    client: Arc<dyn ApiClient>,
}

impl RegressionRequester {
    pub fn new(client: Arc<dyn ApiClient>) -> Self {
        Self { client }
    }

    pub async fn regression_model(
        &self,
        csv_text: &str,
        dependent: &str,
        independents: &[String],
    ) -> Result<RegressionResult, AugurError> {
        if csv_text.trim().is_empty() {
            return Err(AugurError::RegressionRequest("dataset is empty".to_string()));
        }

        let prompt = prompts::regression_prompt(csv_text, dependent, independents);
        let result: RegressionResult = request_json(&*self.client, prompt)
            .await
            .map_err(AugurError::RegressionRequest)?;
        result
            .validate()
            .map_err(|e| AugurError::RegressionRequest(e.to_string()))?;
        Ok(result)
    }
}

async fn request_json<T: DeserializeOwned>(
    client: &dyn ApiClient,
    prompt: String,
) -> Result<T, String> {
    let request = GenerationRequest::json(prompt);
    debug!(request_id = %request.id, provider = client.provider_name(), "issuing analysis request");

    let response = client.generate(request).await.map_err(|e| e.to_string())?;

    let json_text = extract_json_from_response(&response.content).ok_or_else(|| {
        warn!("model response did not contain a JSON object");
        "response did not contain a JSON object".to_string()
    })?;

    serde_json::from_str(&json_text).map_err(|e| format!("response shape mismatch: {e}"))
}
