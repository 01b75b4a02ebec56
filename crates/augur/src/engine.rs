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

use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use crate::analysis::{AnalysisRequester, RegressionRequester};
use crate::error::AugurError;
use crate::llm::ApiClient;
use crate::session::Session;
use crate::tabular;

/// Orchestrates one session: file parsing, the automatic descriptive
/// analysis that follows it, on-demand regression requests, and forecast
/// inputs. Each operation records its outcome in the session's own status
/// slot; a failure in one never disturbs its siblings.
pub struct AnalysisEngine {
    analysis_requester: AnalysisRequester,
    regression_requester: RegressionRequester,
    session: Session,
}

impl AnalysisEngine {
    pub fn new(client: Arc<dyn ApiClient>) -> Self {
        Self {
            analysis_requester: AnalysisRequester::new(client.clone()),
            regression_requester: RegressionRequester::new(client),
            session: Session::new(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    /// Loads and parses a file, then chains the descriptive analysis
    /// request. A parse failure resets the session and is returned; an
    /// analysis failure is recorded in the session only.
    pub async fn load_file(&mut self, path: &Path) -> Result<(), AugurError> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload")
            .to_string();

        self.session.begin_upload();
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                let error = AugurError::FileRead(e);
                self.session.fail_upload(error.to_string());
                return Err(error);
            }
        };
        self.load_bytes(&file_name, &bytes).await
    }

    pub async fn load_bytes(&mut self, file_name: &str, bytes: &[u8]) -> Result<(), AugurError> {
        if !self.session.upload().is_pending() {
            self.session.begin_upload();
        }
        match tabular::parse_upload(file_name, bytes) {
            Ok(table) => {
                self.session.complete_upload(table);
            }
            Err(error) => {
                self.session.fail_upload(error.to_string());
                return Err(error);
            }
        }

        if let Err(error) = self.run_analysis().await {
            warn!(%error, "descriptive analysis failed after upload");
        }
        Ok(())
    }

    pub async fn run_analysis(&mut self) -> Result<(), AugurError> {
        let csv_text = self
            .session
            .csv_text()
            .ok_or_else(|| AugurError::Validation("no dataset has been loaded".to_string()))?
            .to_string();

        self.session.begin_analysis();
        match self.analysis_requester.descriptive_analysis(&csv_text).await {
            Ok(result) => {
                info!(columns = result.statistics.len(), charts = result.charts.len(), "descriptive analysis complete");
                self.session.complete_analysis(result);
                Ok(())
            }
            Err(error) => {
                self.session.fail_analysis(error.to_string());
                Err(error)
            }
        }
    }

    /// Validates locally, then requests a regression fit. Validation
    /// failures short-circuit before any network activity.
    pub async fn run_regression(
        &mut self,
        dependent: &str,
        independents: &[String],
    ) -> Result<(), AugurError> {
        self.session
            .validate_regression_request(dependent, independents)?;

        let csv_text = self
            .session
            .csv_text()
            .ok_or_else(|| AugurError::Validation("no dataset has been loaded".to_string()))?
            .to_string();

        let seq = self.session.begin_regression();
        match self
            .regression_requester
            .regression_model(&csv_text, dependent, independents)
            .await
        {
            Ok(result) => {
                info!(coefficients = result.coefficients.len(), "regression model complete");
                self.session.complete_regression(seq, result);
                Ok(())
            }
            Err(error) => {
                self.session.fail_regression(seq, error.to_string());
                Err(error)
            }
        }
    }
}
