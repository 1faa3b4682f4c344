//! Canonical, mode-independent result shape handed to the presentation layer.

use serde::Serialize;
use shared::domain::AnalysisMode;

pub const PRIMARY_CHART_LABEL: &str = "File 1";
pub const SECONDARY_CHART_LABEL: &str = "File 2";
pub const DEFAULT_FAVORABILITY: f64 = 50.0;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComparisonRow {
    pub feature: String,
    pub file1: String,
    pub file2: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub name: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelineEntry {
    pub date: String,
    pub event: String,
}

/// Every field is populated once built; optional parts are explicit `None`.
/// `mode` records which request shape produced the model so renderers never
/// read a compare-shaped model as a summary or vice versa.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewModel {
    pub mode: AnalysisMode,
    pub summary_primary: String,
    pub summary_secondary: Option<String>,
    pub timeline: Option<String>,
    pub comparison_table: Vec<ComparisonRow>,
    pub chart_data: Option<Vec<ChartPoint>>,
    pub status_line: Option<String>,
}

impl ViewModel {
    /// Splits the timeline text into `date: event` entries. Lines without a
    /// colon keep their text as the event with an empty date.
    pub fn timeline_entries(&self) -> Vec<TimelineEntry> {
        let Some(timeline) = &self.timeline else {
            return Vec::new();
        };

        timeline
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| match line.split_once(':') {
                Some((date, event)) => TimelineEntry {
                    date: date.trim().to_string(),
                    event: event.trim().to_string(),
                },
                None => TimelineEntry {
                    date: String::new(),
                    event: line.to_string(),
                },
            })
            .collect()
    }

    /// The side favored by the chart, if any. Ties favor neither.
    pub fn favored(&self) -> Option<&ChartPoint> {
        let [first, second] = self.chart_data.as_deref()? else {
            return None;
        };
        if first.value > second.value {
            Some(first)
        } else if second.value > first.value {
            Some(second)
        } else {
            None
        }
    }
}
