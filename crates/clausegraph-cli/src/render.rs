use std::fmt::Write;

use clausegraph_core::api_types::AnalysisReport;
use clausegraph_core::reasoning::{Anomaly, Severity};

const RULE_WIDTH: usize = 60;

pub fn render_json(report: &AnalysisReport) -> serde_json::Result<String> {
    serde_json::to_string_pretty(report)
}

/// Human-readable report, grouped by severity, most severe first.
///
/// Each finding is prefixed with its `file:line:` locations so editors can
/// jump to it.
pub fn render_text(report: &AnalysisReport) -> String {
    let meta = &report.metadata;
    let mut out = String::new();

    let _ = writeln!(out, "Contract Analysis Report");
    let _ = writeln!(out, "{}", "=".repeat(RULE_WIDTH));
    let _ = writeln!(
        out,
        "Source: {} ({} clauses, {} parties)",
        meta.source_file, meta.clause_count, meta.party_count
    );
    let _ = writeln!(out);

    for severity in Severity::DESCENDING {
        let items: Vec<&Anomaly> = report
            .anomalies
            .iter()
            .filter(|a| a.severity == severity)
            .collect();
        if items.is_empty() {
            continue;
        }

        let _ = writeln!(
            out,
            "{} ({})",
            severity.as_str().to_uppercase(),
            items.len()
        );
        for (i, anomaly) in items.iter().enumerate() {
            let _ = writeln!(
                out,
                "  {} [{}{}] {}",
                location(&meta.source_file, anomaly),
                prefix(severity),
                i + 1,
                anomaly.description
            );
            if let Some(recommendation) = &anomaly.recommendation {
                let _ = writeln!(out, "       Recommendation: {recommendation}");
            }
        }
        let _ = writeln!(out);
    }

    let summary = &report.summary;
    let _ = write!(
        out,
        "Summary: {} critical/high, {} medium, {} low anomalies found.",
        summary.count(Severity::Critical) + summary.count(Severity::High),
        summary.count(Severity::Medium),
        summary.count(Severity::Low)
    );

    out
}

fn location(source: &str, anomaly: &Anomaly) -> String {
    if anomaly.lines.is_empty() {
        return format!("{source}:");
    }
    anomaly
        .lines
        .iter()
        .map(|line| format!("{source}:{line}:"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn prefix(severity: Severity) -> char {
    match severity {
        Severity::Critical => 'C',
        Severity::High => 'H',
        Severity::Medium => 'M',
        Severity::Low => 'L',
    }
}
