//! Fixed-width console report for a concurrent run.

use std::fmt::Write;

use crate::{LatencySummary, RequestOutcome};

/// Width of the horizontal rules framing the table
pub const REPORT_WIDTH: usize = 80;

/// Sort `outcomes` by request id and render them as a table.
///
/// There is exactly one row per outcome, whatever order they completed in.
pub fn render_table(outcomes: &mut [RequestOutcome]) -> String {
    outcomes.sort_by_key(|o| o.id);

    let mut out = String::new();
    let _ = writeln!(out, "{}", "=".repeat(REPORT_WIDTH));
    let _ = writeln!(
        out,
        "{:<5} {:<10} {:<15} {:<15} {}",
        "ID", "Status", "TTFB (ms)", "Total (s)", "Error"
    );
    let _ = writeln!(out, "{}", "-".repeat(REPORT_WIDTH));

    for outcome in outcomes.iter() {
        let status = if outcome.is_success() { "✅ OK" } else { "❌ Fail" };
        let ttfb = outcome
            .ttfb()
            .map(|d| format!("{:.1}", d.as_secs_f64() * 1000.0))
            .unwrap_or_else(|| "-".to_string());
        let total = outcome
            .total()
            .map(|d| format!("{:.2}", d.as_secs_f64()))
            .unwrap_or_else(|| "-".to_string());
        let error = outcome.error_text().unwrap_or_default();
        let line = format!("{:<5} {:<10} {:<15} {:<15} {}", outcome.id, status, ttfb, total, error);
        let _ = writeln!(out, "{}", line.trim_end());
    }

    let _ = writeln!(out, "{}", "-".repeat(REPORT_WIDTH));
    out
}

/// Aggregate lines printed under the table.
///
/// TTFB figures read `-` when no successful stream delivered a byte.
pub fn render_summary(summary: Option<&LatencySummary>) -> String {
    let Some(s) = summary else {
        return "❌ No successful requests.\n".to_string();
    };

    let ms = |value: Option<f64>| match value {
        Some(v) => format!("{v:.1} ms"),
        None => "-".to_string(),
    };
    let mut out = String::new();
    let _ = writeln!(out, "📉 Min TTFB: {}", ms(s.ttfb.map(|t| t.min_ms)));
    let _ = writeln!(out, "📈 Max TTFB: {}", ms(s.ttfb.map(|t| t.max_ms)));
    let _ = writeln!(out, "✨ Avg TTFB: {}", ms(s.ttfb.map(|t| t.avg_ms)));
    let _ = writeln!(out, "Avg Total: {:.2} s", s.avg_total_secs);
    let _ = writeln!(out, "Succeeded: {}/{}", s.succeeded, s.total);
    out
}
