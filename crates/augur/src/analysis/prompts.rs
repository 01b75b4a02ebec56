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

pub fn descriptive_analysis_prompt(csv_text: &str) -> String {
    format!(
        r#"You are a data analysis expert. Analyze the following dataset provided as a CSV string.

"""
{csv_text}
"""

Provide your analysis in a single, valid JSON object. Do not include any text before or after the JSON object. The JSON object must have two top-level keys: "statistics" and "charts".

1.  "statistics": This should be an object. For each NUMERIC column in the dataset, create a key with the column name. The value should be an object containing the following statistical measures: 'count', 'mean', 'std' (standard deviation), 'min', '25%' (1st quartile), '50%' (median), '75%' (3rd quartile), and 'max'.

2.  "charts": This should be an array of objects, where each object represents a recommended chart for visualizing the data.
    - For numeric columns, generate a 'histogram'. The object should have:
      - `type: "histogram"`
      - `title: "Distribution of [Column Name]"`
      - `xLabel: "[Column Name]"`
      - `yLabel: "Frequency"`
      - `data`: An array of objects, each with a 'range' (string, e.g., "10-20") and 'frequency' (number). Create about 10-15 bins.
    - For categorical columns with 10 or fewer unique values, generate a 'bar' chart. The object should have:
      - `type: "bar"`
      - `title: "Frequency of [Column Name]"`
      - `xLabel: "[Column Name]"`
      - `yLabel: "Count"`
      - `data`: An array of objects, each with a 'name' (the category) and 'count' (number).
"#
    )
}

pub fn regression_prompt(csv_text: &str, dependent: &str, independents: &[String]) -> String {
    let independents_json = serde_json::Value::from(independents.to_vec()).to_string();
    let first_independent = independents.first().map(String::as_str).unwrap_or("X1");

    format!(
        r#"You are a data analysis expert specializing in regression modeling. Given the following dataset as a CSV string, and the specified dependent and independent variables, perform a multivariate linear regression.

Dataset:
"""
{csv_text}
"""

Variables:
- Dependent Variable (Y): "{dependent}"
- Independent Variables (X): {independents_json}

Provide your analysis in a single, valid JSON object. Do not include any text before or after the JSON object. The JSON object must have three top-level keys: "modelQuality", "coefficients", and "formula".

1.  "modelQuality": An object containing key metrics:
    - `rSquared`: R-squared value (number).
    - `adjustedRSquared`: Adjusted R-squared value (number).
    - `fStatistic`: F-statistic of the model (number).
    - `p_value_f_statistic`: The p-value associated with the F-statistic (number).
    - `summary`: A brief, one-paragraph text summary explaining the model's performance based on these metrics.

2.  "coefficients": An object where each key is a variable name (including "Intercept") and the value is its corresponding coefficient (number).

3.  "formula": A string representing the final regression equation. Format it as: "{dependent} = [Intercept] + [Coeff1] * {first_independent} + ...". Use up to 4 decimal places for coefficients.
"#
    )
}
