// ABOUTME: Integration tests for model output extraction and chat text cleanup
// ABOUTME: Covers JSON block extraction, weekly plan validation, and display formatting
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Kinetic Edge Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use kinetic_edge::errors::ErrorCode;
use kinetic_edge::llm::{clean_ai_response, extract_json_strict, parse_weekly_plan};
use serde_json::json;

#[test]
fn test_extracts_object_surrounded_by_prose() {
    let text = r#"Sure! Here you go: {"week": {"monday": "rest"}} Let me know if you need more."#;
    let value = extract_json_strict(text).unwrap();
    assert_eq!(value, json!({"week": {"monday": "rest"}}));
}

#[test]
fn test_returns_none_without_any_object() {
    assert!(extract_json_strict("I cannot help with that today.").is_none());
    assert!(extract_json_strict("   ").is_none());
    assert!(extract_json_strict("").is_none());
}

#[test]
fn test_returns_none_for_broken_json() {
    assert!(extract_json_strict(r#"{"week": {"monday": "rest""#).is_none());
    assert!(extract_json_strict("{week: monday}").is_none());
}

#[test]
fn test_fenced_json_block() {
    let text = "```json\n{\"week\": {\"friday\": {\"cardio\": \"30 min\"}}}\n```";
    let value = extract_json_strict(text).unwrap();
    assert_eq!(value["week"]["friday"]["cardio"], "30 min");
}

#[test]
fn test_two_objects_in_one_reply_do_not_parse() {
    // The block runs from the first '{' to the last '}'
    let text = r#"{"a": 1} and also {"b": 2}"#;
    assert!(extract_json_strict(text).is_none());
}

#[test]
fn test_nested_object_is_kept_whole() {
    let text = r#"Plan: {"week": {"monday": {"breakfast": "Oats"}}, "notes": "drink water"}"#;
    let value = extract_json_strict(text).unwrap();
    assert_eq!(value["notes"], "drink water");
    assert_eq!(value["week"]["monday"]["breakfast"], "Oats");
}

#[test]
fn test_parse_weekly_plan_accepts_week_key() {
    let plan = parse_weekly_plan(r#"{"week": {"monday": {"breakfast": "Oats"}}}"#).unwrap();
    assert_eq!(plan.week()["monday"]["breakfast"], "Oats");
}

#[test]
fn test_parse_weekly_plan_rejects_missing_week() {
    let err = parse_weekly_plan(r#"{"days": []}"#).unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidModelOutput);
}

#[test]
fn test_parse_weekly_plan_rejects_non_json() {
    let err = parse_weekly_plan("Eat more vegetables.").unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidModelOutput);
}

#[test]
fn test_clean_ai_response_formats_markdown() {
    assert_eq!(
        clean_ai_response("**Great** job!\n- Walk daily\n- Sleep well"),
        "<strong>Great</strong> job!<br>• Walk daily<br>• Sleep well"
    );
}

#[test]
fn test_clean_ai_response_drops_stray_stars() {
    assert_eq!(clean_ai_response("Keep going ★★ *you* can"), "Keep going  you can");
    assert_eq!(clean_ai_response("line one\nline two"), "line one<br>line two");
}
