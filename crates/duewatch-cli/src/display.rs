//! Plain-text rendering of deadline lists and change reports.

use std::fmt::Write;

use duewatch_changes::ChangeReport;
use duewatch_core::{Deadline, Snapshot};

const TITLE_WIDTH: usize = 32;

// ── Public API ──

/// One line per deadline: date, type icon, title, confidence.
pub fn render_deadlines(deadlines: &[Deadline]) -> String {
    if deadlines.is_empty() {
        return "No deadlines found.\n".to_string();
    }
    let mut out = String::new();
    for d in deadlines {
        push_line(&mut out, "", d);
    }
    out
}

/// Change report grouped into added / removed / modified sections.
pub fn render_report(course_id: &str, report: &ChangeReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== {course_id} ===");

    if let Some(err) = &report.error {
        let _ = writeln!(out, "Change detection failed: {err}");
        return out;
    }
    if report.is_first_scrape {
        let _ = writeln!(out, "First scrape: {} deadline(s) stored.", report.added.len());
    } else if !report.has_changes {
        let _ = writeln!(out, "No changes since last scrape.");
        return out;
    }
    out.push('\n');

    if !report.added.is_empty() {
        out.push_str("Added\n");
        for d in &report.added {
            push_line(&mut out, "+ ", d);
        }
        out.push('\n');
    }
    if !report.removed.is_empty() {
        out.push_str("Removed\n");
        for d in &report.removed {
            push_line(&mut out, "- ", d);
        }
        out.push('\n');
    }
    if !report.modified.is_empty() {
        out.push_str("Modified\n");
        for m in &report.modified {
            let _ = writeln!(
                out,
                "  ~ {:<width$} {} -> {}",
                m.new.title,
                date_or_dash(&m.old),
                date_or_dash(&m.new),
                width = TITLE_WIDTH,
            );
        }
        out.push('\n');
    }
    out
}

/// Stored snapshot header plus its deadlines.
pub fn render_snapshot(course_id: &str, snapshot: &Snapshot) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== {course_id} ===");
    let _ = writeln!(out, "  {:<10} {}", "stored", snapshot.timestamp.to_rfc3339());
    let _ = writeln!(out, "  {:<10} {}", "hash", snapshot.hash);
    out.push('\n');
    out.push_str(&render_deadlines(&snapshot.deadlines));
    out
}

// ── Helpers ──

fn push_line(out: &mut String, marker: &str, d: &Deadline) {
    let _ = writeln!(
        out,
        "  {marker}{}  {} {:<width$} ({}, {:.1})",
        date_or_dash(d),
        d.kind.icon(),
        d.title,
        d.kind,
        d.confidence,
        width = TITLE_WIDTH,
    );
}

fn date_or_dash(d: &Deadline) -> String {
    d.due_date
        .map(|date| date.to_string())
        .unwrap_or_else(|| "----------".to_string())
}
