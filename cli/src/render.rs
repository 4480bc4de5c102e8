//! Plain-text rendering of records and history for the terminal.

use std::fmt::Write;

use a11y_contracts::record::{AuditOutcome, AuditRecord};
use a11y_history::AuditHistory;

/// Multi-line summary of one audit: counts per category, violations per
/// impact, then one line per violation.
pub fn render_summary(record: &AuditRecord) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Audit {} of {}", record.id, record.url);
    let _ = writeln!(out, "Status: {}", record.status());

    match record.outcome() {
        AuditOutcome::Completed(report) => {
            let summary = report.summary();
            let _ = writeln!(
                out,
                "Violations: {}  Passes: {}  Incomplete: {}  Inapplicable: {}",
                summary.violations, summary.passes, summary.incomplete, summary.inapplicable
            );
            if summary.violations == 0 {
                let _ = writeln!(out, "No accessibility violations found.");
                return out;
            }

            let by_impact: Vec<String> = summary
                .by_impact
                .iter()
                .rev()
                .map(|(impact, count)| format!("{} {}", count, impact.as_str()))
                .collect();
            if !by_impact.is_empty() {
                let _ = writeln!(out, "By impact: {}", by_impact.join(", "));
            }
            let _ = writeln!(out, "Affected elements: {}", summary.affected_nodes);
            let _ = writeln!(out);

            for violation in report.violations() {
                let impact = violation.impact.map_or("unknown", |i| i.as_str());
                let _ = write!(out, "  [{}] {}", impact, violation.id);
                if let Some(help) = &violation.help {
                    let _ = write!(out, ": {}", help);
                }
                let nodes = violation.nodes.len();
                let _ = writeln!(
                    out,
                    " ({} element{})",
                    nodes,
                    if nodes == 1 { "" } else { "s" }
                );
            }
        }
        AuditOutcome::Failed(failure) => {
            let _ = writeln!(out, "Error: {}", failure.message);
        }
        AuditOutcome::Pending | AuditOutcome::Processing => {}
    }

    out
}

/// The stored history, newest first.
pub fn render_history(history: &AuditHistory) -> String {
    if history.is_empty() {
        return "No audits yet.\n".to_string();
    }

    let mut out = String::new();
    for (n, entry) in history.entries().iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>2}. {}  {} violation{}  ({})",
            n + 1,
            entry.url,
            entry.violations,
            if entry.violations == 1 { "" } else { "s" },
            entry.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
        );
    }
    out
}

/// The server's rejection, printed verbatim.
pub fn render_rejection(message: &str, error: Option<&str>) -> String {
    match error {
        Some(error) => format!("{}\n{}", message, error),
        None => message.to_string(),
    }
}
