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

use augur_contracts::{DescriptiveAnalysisResult, RegressionResult};
use tracing::{debug, warn};

use crate::error::AugurError;
use crate::forecast::{self, ForecastInputs};
use crate::tabular::TabularFile;

/// Tagged per-operation status. Loading and error can never both be set.
#[derive(Debug, Clone, PartialEq)]
pub enum OperationState<T> {
    Idle,
    Pending,
    Succeeded(T),
    Failed(String),
}

impl<T> Default for OperationState<T> {
    fn default() -> Self {
        Self::Idle
    }
}

impl<T> OperationState<T> {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Succeeded(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed(message) => Some(message),
            _ => None,
        }
    }
}

/// One uploaded file's worth of state. The dataset and its serialized text
/// live for the duration of the upload; the analysis and regression results
/// are independently refreshable and always replaced wholesale.
#[derive(Debug, Default)]
pub struct Session {
    upload: OperationState<TabularFile>,
    analysis: OperationState<DescriptiveAnalysisResult>,
    regression: OperationState<RegressionResult>,
    forecast_inputs: ForecastInputs,
    regression_seq: u64,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upload(&self) -> &OperationState<TabularFile> {
        &self.upload
    }

    pub fn analysis(&self) -> &OperationState<DescriptiveAnalysisResult> {
        &self.analysis
    }

    pub fn regression(&self) -> &OperationState<RegressionResult> {
        &self.regression
    }

    pub fn headers(&self) -> &[String] {
        self.upload
            .value()
            .map(|table| table.dataset.headers.as_slice())
            .unwrap_or_default()
    }

    pub fn csv_text(&self) -> Option<&str> {
        self.upload.value().map(|table| table.csv_text.as_str())
    }

    pub fn forecast_inputs(&self) -> &ForecastInputs {
        &self.forecast_inputs
    }

    pub fn independent_variables(&self) -> Vec<String> {
        forecast::independent_variables(self.regression.value())
    }

    /// A new upload synchronously resets all derived state before parsing
    /// starts; nothing downstream of the previous file can be trusted.
    pub fn begin_upload(&mut self) {
        self.upload = OperationState::Pending;
        self.analysis = OperationState::Idle;
        self.regression = OperationState::Idle;
        self.forecast_inputs.clear();
    }

    pub fn complete_upload(&mut self, table: TabularFile) {
        debug!(file = %table.file_name, rows = table.dataset.row_count(), "upload complete");
        self.upload = OperationState::Succeeded(table);
    }

    /// A file-level failure clears the whole session.
    pub fn fail_upload(&mut self, message: impl Into<String>) {
        self.analysis = OperationState::Idle;
        self.regression = OperationState::Idle;
        self.forecast_inputs.clear();
        self.upload = OperationState::Failed(message.into());
    }

    pub fn begin_analysis(&mut self) {
        self.analysis = OperationState::Pending;
    }

    pub fn complete_analysis(&mut self, result: DescriptiveAnalysisResult) {
        self.analysis = OperationState::Succeeded(result);
        if self.regression.value().is_some() {
            self.refresh_forecast_inputs();
        }
    }

    /// An analysis failure clears only the analysis result.
    pub fn fail_analysis(&mut self, message: impl Into<String>) {
        self.analysis = OperationState::Failed(message.into());
    }

    /// Starts a regression submission and returns its sequence number. Any
    /// prior result is cleared immediately, as are the forecast inputs.
    pub fn begin_regression(&mut self) -> u64 {
        self.regression_seq += 1;
        self.regression = OperationState::Pending;
        self.forecast_inputs.clear();
        self.regression_seq
    }

    /// Applies a regression result. A result whose sequence is not the
    /// latest submission is discarded.
    pub fn complete_regression(&mut self, seq: u64, result: RegressionResult) -> bool {
        if seq != self.regression_seq {
            warn!(seq, latest = self.regression_seq, "discarding stale regression result");
            return false;
        }
        self.regression = OperationState::Succeeded(result);
        self.refresh_forecast_inputs();
        true
    }

    /// A regression failure clears only the regression result.
    pub fn fail_regression(&mut self, seq: u64, message: impl Into<String>) -> bool {
        if seq != self.regression_seq {
            warn!(seq, latest = self.regression_seq, "discarding stale regression failure");
            return false;
        }
        self.regression = OperationState::Failed(message.into());
        true
    }

    /// Local validation before any regression request is sent.
    pub fn validate_regression_request(
        &self,
        dependent: &str,
        independents: &[String],
    ) -> Result<(), AugurError> {
        let table = self
            .upload
            .value()
            .ok_or_else(|| AugurError::Validation("no dataset has been loaded".to_string()))?;

        if dependent.trim().is_empty() {
            return Err(AugurError::Validation(
                "a dependent variable must be selected".to_string(),
            ));
        }
        if !table.dataset.has_header(dependent) {
            return Err(AugurError::Validation(format!(
                "unknown dependent variable '{dependent}'"
            )));
        }
        if independents.is_empty() {
            return Err(AugurError::Validation(
                "at least one independent variable must be selected".to_string(),
            ));
        }
        for variable in independents {
            if !table.dataset.has_header(variable) {
                return Err(AugurError::Validation(format!(
                    "unknown independent variable '{variable}'"
                )));
            }
            if variable == dependent {
                return Err(AugurError::Validation(format!(
                    "'{variable}' cannot be both dependent and independent"
                )));
            }
        }
        Ok(())
    }

    pub fn set_forecast_input(&mut self, variable: impl Into<String>, value: f64) {
        let value = if value.is_finite() { value } else { 0.0 };
        self.forecast_inputs.insert(variable.into(), value);
    }

    pub fn predicted_value(&self) -> Option<f64> {
        forecast::predict(self.regression.value(), &self.forecast_inputs)
    }

    fn refresh_forecast_inputs(&mut self) {
        self.forecast_inputs =
            forecast::default_inputs(self.regression.value(), self.analysis.value());
    }
}
