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

use augur::tabular::{parse_upload, parser::parse_delimited, CellValue};
use augur::AugurError;

#[test]
fn test_two_by_two_scenario() {
    let dataset = parse_delimited("a,b\n1,2\n3,4\n").unwrap();

    assert_eq!(dataset.headers, vec!["a", "b"]);
    assert_eq!(dataset.row_count(), 2);
    assert_eq!(dataset.rows[0]["a"], CellValue::Number(1.0));
    assert_eq!(dataset.rows[0]["b"], CellValue::Number(2.0));
    assert_eq!(dataset.rows[1]["a"], CellValue::Number(3.0));
    assert_eq!(dataset.rows[1]["b"], CellValue::Number(4.0));
}

#[test]
fn test_header_order_preserved() {
    let dataset = parse_delimited("zeta,alpha,mid\n1,2,3\n").unwrap();
    assert_eq!(dataset.headers, vec!["zeta", "alpha", "mid"]);
}

#[test]
fn test_blank_lines_are_skipped() {
    let dataset = parse_delimited("a,b\n1,2\n\n\n3,4\n\n").unwrap();
    assert_eq!(dataset.row_count(), 2);
}

#[test]
fn test_bare_delimiter_row_is_kept_as_nulls() {
    let dataset = parse_delimited("a,b\n1,2\n,\n3,4\n").unwrap();
    assert_eq!(dataset.row_count(), 3);
    assert_eq!(dataset.rows[1]["a"], CellValue::Null);
    assert_eq!(dataset.rows[1]["b"], CellValue::Null);
}

#[test]
fn test_dynamic_cell_typing() {
    let dataset = parse_delimited("n,s,e\n42,abc,\n").unwrap();
    let row = &dataset.rows[0];
    assert_eq!(row["n"], CellValue::Number(42.0));
    assert_eq!(row["s"], CellValue::Text("abc".to_string()));
    assert_eq!(row["e"], CellValue::Null);
}

#[test]
fn test_row_keys_match_headers() {
    let dataset = parse_delimited("a,b,c\n1,2,3\n").unwrap();
    let keys: Vec<&str> = dataset.rows[0].keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["a", "b", "c"]);
}

#[test]
fn test_ragged_row_rejects_whole_parse() {
    let result = parse_delimited("a,b\n1,2\n3\n");
    assert!(matches!(result, Err(AugurError::Parse(_))));
}

#[test]
fn test_duplicate_headers_rejected() {
    let result = parse_delimited("a,a\n1,2\n");
    assert!(matches!(result, Err(AugurError::Parse(_))));
}

#[test]
fn test_empty_input_rejected() {
    assert!(parse_delimited("").is_err());
}

#[test]
fn test_upload_retains_exact_text_for_delimited_files() {
    let text = "a,b\n1,2\n3,4\n";
    let table = parse_upload("data.csv", text.as_bytes()).unwrap();
    assert_eq!(table.csv_text, text);
    assert_eq!(table.file_name, "data.csv");
}

#[test]
fn test_txt_extension_is_treated_as_delimited_text() {
    let table = parse_upload("data.txt", b"x,y\n5,6\n").unwrap();
    assert_eq!(table.dataset.headers, vec!["x", "y"]);
    assert_eq!(table.dataset.row_count(), 1);
}

#[test]
fn test_serialized_dataset_round_trips() {
    let text = "name,score\nalice,91.5\nbob,\n";
    let table = parse_upload("scores.csv", text.as_bytes()).unwrap();
    let reparsed = parse_delimited(&table.csv_text).unwrap();
    assert_eq!(reparsed, table.dataset);
}

#[test]
fn test_invalid_utf8_rejected() {
    let result = parse_upload("data.csv", &[0xff, 0xfe, 0x00]);
    assert!(matches!(result, Err(AugurError::Parse(_))));
}

#[test]
fn test_quoted_fields_with_commas() {
    let dataset = parse_delimited("a,b\n\"1,5\",two\n").unwrap();
    assert_eq!(dataset.rows[0]["a"], CellValue::Text("1,5".to_string()));
    assert_eq!(dataset.rows[0]["b"], CellValue::Text("two".to_string()));
}
