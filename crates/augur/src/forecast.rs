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

use augur_contracts::{DescriptiveAnalysisResult, RegressionResult, INTERCEPT_KEY};
use indexmap::IndexMap;

pub type ForecastInputs = IndexMap<String, f64>;

/// Coefficient keys excluding the intercept, in response order.
pub fn independent_variables(model: Option<&RegressionResult>) -> Vec<String> {
    match model {
        Some(model) => model
            .coefficients
            .keys()
            .filter(|key| key.as_str() != INTERCEPT_KEY)
            .cloned()
            .collect(),
        None => Vec::new(),
    }
}

/// Default forecast inputs: the median of each independent variable, or 0
/// when the analysis has no statistics entry for it.
pub fn default_inputs(
    model: Option<&RegressionResult>,
    analysis: Option<&DescriptiveAnalysisResult>,
) -> ForecastInputs {
    let mut inputs = ForecastInputs::new();
    for variable in independent_variables(model) {
        let default = analysis
            .and_then(|a| a.statistics.get(&variable))
            .map(|statistic| statistic.p50)
            .unwrap_or(0.0);
        inputs.insert(variable, default);
    }
    inputs
}

/// Point prediction: intercept plus the dot product of coefficients and
/// inputs, with 0-substitution for anything absent or non-finite. Pure and
/// infallible; `None` means no model is available.
pub fn predict(model: Option<&RegressionResult>, inputs: &ForecastInputs) -> Option<f64> {
    let model = model?;
    let mut prediction = model
        .coefficients
        .get(INTERCEPT_KEY)
        .copied()
        .unwrap_or(0.0);

    for variable in independent_variables(Some(model)) {
        let coefficient = model.coefficients.get(&variable).copied().unwrap_or(0.0);
        let value = inputs
            .get(&variable)
            .copied()
            .filter(|v| v.is_finite())
            .unwrap_or(0.0);
        prediction += coefficient * value;
    }

    Some(prediction)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliderSpec {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

/// Slider affordances for one variable: statistic bounds when available,
/// otherwise [0, 100] with unit steps.
pub fn slider_spec(analysis: Option<&DescriptiveAnalysisResult>, variable: &str) -> SliderSpec {
    match analysis.and_then(|a| a.statistics.get(variable)) {
        Some(statistic) => SliderSpec {
            min: statistic.min,
            max: statistic.max,
            step: (statistic.max - statistic.min) / 100.0,
        },
        None => SliderSpec {
            min: 0.0,
            max: 100.0,
            step: 1.0,
        },
    }
}
