//! Plain-text rendering of analysis results for the terminal.

use std::fmt::Write as _;

use client_core::{ChartPoint, UploadSnapshot, ViewModel, WhatIfExchange, WhatIfResponse};
use shared::domain::AnalysisMode;

use crate::controller::events::UiError;

const BAR_WIDTH: usize = 20;
const NONE: &str = "-";

// ── Result card ──

pub fn render_view(view: &ViewModel) -> String {
    let mut out = String::new();
    match view.mode {
        AnalysisMode::Summarize => render_summary(&mut out, view),
        AnalysisMode::Compare => render_comparison(&mut out, view),
    }
    if let Some(status) = &view.status_line {
        let _ = writeln!(out, "\n{status}");
    }
    out
}

fn render_summary(out: &mut String, view: &ViewModel) {
    let _ = writeln!(out, "== Summary ==");
    let _ = writeln!(out, "{}", or_dash(&view.summary_primary));

    let entries = view.timeline_entries();
    if !entries.is_empty() {
        let _ = writeln!(out, "\n== Timeline ==");
        for entry in entries {
            if entry.date.is_empty() {
                let _ = writeln!(out, "  - {}", entry.event);
            } else {
                let _ = writeln!(out, "  {}: {}", entry.date, entry.event);
            }
        }
    }

    if !view.comparison_table.is_empty() {
        let _ = writeln!(out);
        render_table(out, view);
    }
}

fn render_comparison(out: &mut String, view: &ViewModel) {
    let _ = writeln!(out, "== File 1 ==");
    let _ = writeln!(out, "{}", or_dash(&view.summary_primary));
    let _ = writeln!(out, "\n== File 2 ==");
    let _ = writeln!(
        out,
        "{}",
        or_dash(view.summary_secondary.as_deref().unwrap_or_default())
    );

    let _ = writeln!(out);
    render_table(out, view);

    if let Some(points) = &view.chart_data {
        let _ = writeln!(out, "\n== Favorability ==");
        for point in points {
            let _ = writeln!(out, "  {}", bar(point));
        }
        if let Some(favored) = view.favored() {
            let _ = writeln!(out, "  favors {}", favored.name);
        }
    }
}

fn render_table(out: &mut String, view: &ViewModel) {
    let _ = writeln!(out, "== Comparison ==");
    if view.comparison_table.is_empty() {
        let _ = writeln!(out, "  (no rows)");
        return;
    }

    let feature_width = view
        .comparison_table
        .iter()
        .map(|row| row.feature.chars().count())
        .max()
        .unwrap_or(0)
        .max("Feature".len());
    let _ = writeln!(out, "  {:<feature_width$} | File 1 | File 2", "Feature");
    for row in &view.comparison_table {
        let _ = writeln!(
            out,
            "  {:<feature_width$} | {} | {}",
            row.feature,
            or_dash(&row.file1),
            or_dash(&row.file2)
        );
    }
}

/// `File 1 [########............]  40`
fn bar(point: &ChartPoint) -> String {
    let clamped = point.value.clamp(0.0, 100.0);
    let filled = ((clamped / 100.0) * BAR_WIDTH as f64).round() as usize;
    format!(
        "{:<6} [{}{}] {:>3}",
        point.name,
        "#".repeat(filled),
        ".".repeat(BAR_WIDTH - filled),
        point.value.round()
    )
}

fn or_dash(text: &str) -> &str {
    if text.trim().is_empty() {
        NONE
    } else {
        text
    }
}

// ── Side panels ──

pub fn render_exchange(exchange: &WhatIfExchange) -> String {
    match &exchange.response {
        WhatIfResponse::Answer(answer) => format!("Q: {}\nA: {answer}", exchange.query),
        WhatIfResponse::Failed(reason) => {
            format!("Q: {}\n(no answer) {reason}", exchange.query)
        }
    }
}

pub fn render_snapshot(snapshot: &UploadSnapshot) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "mode:     {}", snapshot.mode);
    let _ = writeln!(
        out,
        "file 1:   {}",
        snapshot.primary.as_deref().unwrap_or(NONE)
    );
    if snapshot.mode.required_documents() > 1 || snapshot.secondary.is_some() {
        let _ = writeln!(
            out,
            "file 2:   {}",
            snapshot.secondary.as_deref().unwrap_or(NONE)
        );
    }
    let _ = writeln!(out, "language: {}", snapshot.language);
    let _ = writeln!(out, "detail:   {}", snapshot.detail);
    let _ = writeln!(out, "phase:    {:?}", snapshot.phase);
    match &snapshot.published {
        Some(view) => {
            let _ = write!(out, "\n{}", render_view(view));
        }
        None => {
            let _ = writeln!(out, "(no result yet)");
        }
    }
    out
}

pub fn render_error(err: &UiError) -> String {
    let hint = if err.is_retryable() {
        " (is the analysis service running?)"
    } else {
        ""
    };
    format!("{} failed: {}{hint}", err.context().label(), err.message())
}
