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

use augur::tabular::parse_upload;
use augur::{AugurError, OperationState, Session};
use augur_contracts::{
    DescriptiveAnalysisResult, ModelQuality, RegressionResult, Statistic,
};
use indexmap::IndexMap;

fn loaded_session() -> Session {
    let mut session = Session::new();
    session.begin_upload();
    let table = parse_upload("data.csv", b"y,x,label\n1,2,a\n3,4,b\n").unwrap();
    session.complete_upload(table);
    session
}

fn sample_regression() -> RegressionResult {
    let mut coefficients = IndexMap::new();
    coefficients.insert("Intercept".to_string(), 5.0);
    coefficients.insert("x".to_string(), 2.0);
    RegressionResult {
        model_quality: ModelQuality {
            r_squared: 0.9,
            adjusted_r_squared: 0.88,
            f_statistic: 40.0,
            p_value_f_statistic: 0.001,
            summary: "test".to_string(),
        },
        coefficients,
        formula: "y = 5.0000 + 2.0000 * x".to_string(),
    }
}

fn sample_analysis() -> DescriptiveAnalysisResult {
    let mut statistics = IndexMap::new();
    statistics.insert(
        "x".to_string(),
        Statistic {
            count: 2.0,
            mean: 3.0,
            std: 1.4,
            min: 2.0,
            p25: 2.5,
            p50: 7.5,
            p75: 3.5,
            max: 4.0,
        },
    );
    DescriptiveAnalysisResult {
        statistics,
        charts: Vec::new(),
    }
}

#[test]
fn test_new_upload_resets_derived_state() {
    let mut session = loaded_session();
    session.begin_analysis();
    session.complete_analysis(sample_analysis());
    let seq = session.begin_regression();
    session.complete_regression(seq, sample_regression());

    session.begin_upload();
    assert!(session.upload().is_pending());
    assert!(session.analysis().is_idle());
    assert!(session.regression().is_idle());
    assert!(session.forecast_inputs().is_empty());
}

#[test]
fn test_file_failure_resets_whole_session() {
    let mut session = loaded_session();
    session.begin_analysis();
    session.complete_analysis(sample_analysis());

    session.fail_upload("bad file");
    assert_eq!(session.upload().error(), Some("bad file"));
    assert!(session.analysis().is_idle());
    assert!(session.regression().is_idle());
    assert!(session.headers().is_empty());
    assert!(session.csv_text().is_none());
}

#[test]
fn test_analysis_failure_clears_only_analysis() {
    let mut session = loaded_session();
    let seq = session.begin_regression();
    session.complete_regression(seq, sample_regression());

    session.begin_analysis();
    session.fail_analysis("no JSON");
    assert!(session.analysis().value().is_none());
    assert!(session.regression().value().is_some());
    assert!(session.upload().value().is_some());
}

#[test]
fn test_regression_success_initialises_inputs_to_medians() {
    let mut session = loaded_session();
    session.begin_analysis();
    session.complete_analysis(sample_analysis());

    let seq = session.begin_regression();
    assert!(session.complete_regression(seq, sample_regression()));
    assert_eq!(session.forecast_inputs()["x"], 7.5);
    assert_eq!(session.predicted_value(), Some(20.0));
}

#[test]
fn test_stale_regression_result_is_discarded() {
    let mut session = loaded_session();
    let first = session.begin_regression();
    let _second = session.begin_regression();

    assert!(!session.complete_regression(first, sample_regression()));
    assert!(session.regression().is_pending());

    assert!(!session.fail_regression(first, "stale failure"));
    assert!(session.regression().is_pending());
}

#[test]
fn test_new_regression_clears_prior_result_and_inputs() {
    let mut session = loaded_session();
    session.begin_analysis();
    session.complete_analysis(sample_analysis());
    let seq = session.begin_regression();
    session.complete_regression(seq, sample_regression());
    assert!(!session.forecast_inputs().is_empty());

    session.begin_regression();
    assert!(session.regression().is_pending());
    assert!(session.forecast_inputs().is_empty());
    assert_eq!(session.predicted_value(), None);
}

#[test]
fn test_set_forecast_input_replaces_non_finite_with_zero() {
    let mut session = loaded_session();
    let seq = session.begin_regression();
    session.complete_regression(seq, sample_regression());

    session.set_forecast_input("x", f64::INFINITY);
    assert_eq!(session.forecast_inputs()["x"], 0.0);
}

#[test]
fn test_validation_requires_dependent_variable() {
    let session = loaded_session();
    let result = session.validate_regression_request("", &["x".to_string()]);
    assert!(matches!(result, Err(AugurError::Validation(_))));
}

#[test]
fn test_validation_requires_known_headers() {
    let session = loaded_session();
    let result = session.validate_regression_request("nope", &["x".to_string()]);
    assert!(matches!(result, Err(AugurError::Validation(_))));

    let result = session.validate_regression_request("y", &["nope".to_string()]);
    assert!(matches!(result, Err(AugurError::Validation(_))));
}

#[test]
fn test_validation_requires_independent_variables() {
    let session = loaded_session();
    let result = session.validate_regression_request("y", &[]);
    assert!(matches!(result, Err(AugurError::Validation(_))));
}

#[test]
fn test_validation_rejects_dependent_among_independents() {
    let session = loaded_session();
    let result = session.validate_regression_request("y", &["x".to_string(), "y".to_string()]);
    assert!(matches!(result, Err(AugurError::Validation(_))));
}

#[test]
fn test_validation_accepts_well_formed_request() {
    let session = loaded_session();
    assert!(session
        .validate_regression_request("y", &["x".to_string(), "label".to_string()])
        .is_ok());
}

#[test]
fn test_operation_state_accessors() {
    let state: OperationState<u32> = OperationState::Idle;
    assert!(state.is_idle());
    assert!(OperationState::<u32>::Pending.is_pending());
    assert_eq!(OperationState::Succeeded(7).value(), Some(&7));
    assert_eq!(
        OperationState::<u32>::Failed("boom".to_string()).error(),
        Some("boom")
    );
}
