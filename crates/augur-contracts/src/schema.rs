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

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::types::{LlmError, LlmResult};

pub const INTERCEPT_KEY: &str = "Intercept";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statistic {
    pub count: f64,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    #[serde(rename = "25%")]
    pub p25: f64,
    #[serde(rename = "50%")]
    pub p50: f64,
    #[serde(rename = "75%")]
    pub p75: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub range: String,
    pub frequency: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarEntry {
    pub name: String,
    pub count: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Chart {
    Histogram {
        title: String,
        #[serde(rename = "xLabel")]
        x_label: String,
        #[serde(rename = "yLabel")]
        y_label: String,
        data: Vec<HistogramBin>,
    },
    Bar {
        title: String,
        #[serde(rename = "xLabel")]
        x_label: String,
        #[serde(rename = "yLabel")]
        y_label: String,
        data: Vec<BarEntry>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DescriptiveAnalysisResult {
    pub statistics: IndexMap<String, Statistic>,
    pub charts: Vec<Chart>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelQuality {
    #[serde(rename = "rSquared")]
    pub r_squared: f64,
    #[serde(rename = "adjustedRSquared")]
    pub adjusted_r_squared: f64,
    #[serde(rename = "fStatistic")]
    pub f_statistic: f64,
    pub p_value_f_statistic: f64,
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionResult {
    #[serde(rename = "modelQuality")]
    pub model_quality: ModelQuality,
    pub coefficients: IndexMap<String, f64>,
    pub formula: String,
}

impl Statistic {
    pub fn validate(&self, column: &str) -> LlmResult<()> {
        let fields = [
            ("count", self.count),
            ("mean", self.mean),
            ("std", self.std),
            ("min", self.min),
            ("25%", self.p25),
            ("50%", self.p50),
            ("75%", self.p75),
            ("max", self.max),
        ];
        for (name, value) in fields {
            if !value.is_finite() {
                return Err(LlmError::Validation(format!(
                    "Statistic '{name}' for column '{column}' is not a finite number"
                )));
            }
        }
        Ok(())
    }
}

impl Chart {
    pub fn title(&self) -> &str {
        match self {
            Self::Histogram { title, .. } | Self::Bar { title, .. } => title,
        }
    }

    pub fn x_label(&self) -> &str {
        match self {
            Self::Histogram { x_label, .. } | Self::Bar { x_label, .. } => x_label,
        }
    }

    pub fn y_label(&self) -> &str {
        match self {
            Self::Histogram { y_label, .. } | Self::Bar { y_label, .. } => y_label,
        }
    }

    pub fn validate(&self) -> LlmResult<()> {
        match self {
            Self::Histogram { title, data, .. } => {
                for bin in data {
                    if !bin.frequency.is_finite() {
                        return Err(LlmError::Validation(format!(
                            "Histogram '{title}' contains a non-finite frequency"
                        )));
                    }
                }
            }
            Self::Bar { title, data, .. } => {
                for entry in data {
                    if !entry.count.is_finite() {
                        return Err(LlmError::Validation(format!(
                            "Bar chart '{title}' contains a non-finite count"
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}

impl DescriptiveAnalysisResult {
    pub fn validate(&self) -> LlmResult<()> {
        for (column, statistic) in &self.statistics {
            statistic.validate(column)?;
        }
        for chart in &self.charts {
            chart.validate()?;
        }
        Ok(())
    }
}

impl RegressionResult {
    pub fn validate(&self) -> LlmResult<()> {
        if self.coefficients.is_empty() {
            return Err(LlmError::Validation(
                "Regression response contains no coefficients".to_string(),
            ));
        }
        for (variable, coefficient) in &self.coefficients {
            if !coefficient.is_finite() {
                return Err(LlmError::Validation(format!(
                    "Coefficient for '{variable}' is not a finite number"
                )));
            }
        }
        if self.formula.trim().is_empty() {
            return Err(LlmError::Validation(
                "Regression response contains an empty formula".to_string(),
            ));
        }
        Ok(())
    }
}
