//! Builds a [`ViewModel`] from the service's schema-less analysis payload.
//!
//! Field names drifted across backend revisions, so every text slot is
//! resolved through an ordered fallback chain. The chains are part of the
//! client's compatibility contract and must not be reordered.

use serde_json::{Map, Value};
use shared::domain::AnalysisMode;

use crate::{
    error::NormalizationError,
    transport::RawPayload,
    view_model::{
        ChartPoint, ComparisonRow, ViewModel, DEFAULT_FAVORABILITY, PRIMARY_CHART_LABEL,
        SECONDARY_CHART_LABEL,
    },
};

const DEFAULT_FEATURE: &str = "Aspect";

const FEATURE_KEYS: &[&str] = &["aspect", "name"];
const SUMMARY_VALUE_KEYS: &[&str] = &["doc", "value"];
const LEFT_VALUE_KEYS: &[&str] = &["doc1", "left", "value1"];
const RIGHT_VALUE_KEYS: &[&str] = &["doc2", "right", "value2"];

pub fn normalize(mode: AnalysisMode, raw: &RawPayload) -> Result<ViewModel, NormalizationError> {
    let value: Value = serde_json::from_str(raw.as_str())?;
    normalize_value(mode, &value)
}

pub fn normalize_value(mode: AnalysisMode, value: &Value) -> Result<ViewModel, NormalizationError> {
    let Value::Object(payload) = value else {
        return Err(NormalizationError::NotAnObject(json_kind(value)));
    };

    let status_line = text(payload.get("main"));
    let view = match mode {
        AnalysisMode::Summarize => ViewModel {
            mode,
            summary_primary: text(payload.get("summary")).unwrap_or_default(),
            summary_secondary: None,
            timeline: timeline(payload.get("timeline")),
            comparison_table: summary_rows(payload.get("comparison")),
            chart_data: None,
            status_line,
        },
        AnalysisMode::Compare => ViewModel {
            mode,
            summary_primary: text(payload.get("summary1")).unwrap_or_default(),
            summary_secondary: Some(text(payload.get("summary2")).unwrap_or_default()),
            timeline: None,
            comparison_table: compare_rows(payload.get("comparison")),
            chart_data: Some(favorability(payload.get("favorability"))),
            status_line,
        },
    };
    Ok(view)
}

/// Scalar text in a slot. Missing, `null`, arrays and objects are absent.
fn text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn first_text(entry: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| text(entry.get(*key)))
}

fn timeline(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Array(items) => {
            let lines: Vec<String> = items.iter().filter_map(|item| text(Some(item))).collect();
            Some(lines.join("\n"))
        }
        other => text(Some(other)),
    }
}

fn rows<F>(value: Option<&Value>, build: F) -> Vec<ComparisonRow>
where
    F: Fn(&Map<String, Value>) -> ComparisonRow,
{
    let empty = Map::new();
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| build(item.as_object().unwrap_or(&empty)))
            .collect(),
        _ => Vec::new(),
    }
}

fn feature(entry: &Map<String, Value>) -> String {
    first_text(entry, FEATURE_KEYS).unwrap_or_else(|| DEFAULT_FEATURE.to_string())
}

fn summary_rows(value: Option<&Value>) -> Vec<ComparisonRow> {
    // Older services answer with a free-text red-flag paragraph.
    if let Some(Value::String(paragraph)) = value {
        if paragraph.trim().is_empty() {
            return Vec::new();
        }
        return vec![ComparisonRow {
            feature: DEFAULT_FEATURE.to_string(),
            file1: paragraph.clone(),
            file2: String::new(),
        }];
    }

    rows(value, |entry| ComparisonRow {
        feature: feature(entry),
        file1: first_text(entry, SUMMARY_VALUE_KEYS).unwrap_or_default(),
        file2: String::new(),
    })
}

fn compare_rows(value: Option<&Value>) -> Vec<ComparisonRow> {
    rows(value, |entry| ComparisonRow {
        feature: feature(entry),
        file1: first_text(entry, LEFT_VALUE_KEYS).unwrap_or_default(),
        file2: first_text(entry, RIGHT_VALUE_KEYS).unwrap_or_default(),
    })
}

fn score(scores: Option<&Map<String, Value>>, key: &str) -> f64 {
    scores
        .and_then(|scores| scores.get(key))
        .and_then(Value::as_f64)
        .filter(|v| v.is_finite())
        .unwrap_or(DEFAULT_FAVORABILITY)
}

fn favorability(value: Option<&Value>) -> Vec<ChartPoint> {
    let scores = value.and_then(Value::as_object);
    vec![
        ChartPoint {
            name: PRIMARY_CHART_LABEL.to_string(),
            value: score(scores, "doc1"),
        },
        ChartPoint {
            name: SECONDARY_CHART_LABEL.to_string(),
            value: score(scores, "doc2"),
        },
    ]
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
#[path = "tests/normalize_tests.rs"]
mod tests;
