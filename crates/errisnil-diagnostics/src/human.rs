//! Human-readable diagnostic output formatter.
//!
//! Uses ariadne for rich terminal output with source context.

use crate::diagnostic::{Diagnostic, Severity};
use ariadne::{Color, Config, Label, Report, ReportKind, Source};
use std::collections::HashMap;

/// Format diagnostics for human-readable terminal output.
pub fn format_human(diags: &[Diagnostic], use_color: bool) -> String {
    if diags.is_empty() {
        return "No issues found\n".to_string();
    }

    let mut output = Vec::new();
    let mut source_cache: HashMap<String, String> = HashMap::new();

    let config = Config::default().with_color(use_color);

    for diag in diags {
        let file = &diag.location.file;

        let source_text = source_cache
            .entry(file.clone())
            .or_insert_with(|| std::fs::read_to_string(file).unwrap_or_default());

        if source_text.is_empty() {
            output.push(format_fallback(diag));
            continue;
        }

        let kind = match diag.severity {
            Severity::Critical | Severity::Error => ReportKind::Error,
            Severity::Warning => ReportKind::Warning,
            Severity::Info => ReportKind::Advice,
        };

        let offset = line_col_to_offset(source_text, diag.location.line, diag.location.column);
        let label_end = (offset + 1).min(source_text.len());

        let color = match diag.severity {
            Severity::Critical | Severity::Error => Color::Red,
            Severity::Warning => Color::Yellow,
            Severity::Info => Color::Cyan,
        };

        let report = Report::build(kind, (file.as_str(), offset..label_end))
            .with_config(config)
            .with_code(&diag.rule)
            .with_message(&diag.message)
            .with_label(
                Label::new((file.as_str(), offset..label_end))
                    .with_message(&diag.explanation)
                    .with_color(color),
            );

        let mut buf = Vec::new();
        report
            .finish()
            .write(
                (file.as_str(), Source::from(source_text.as_str())),
                &mut buf,
            )
            .ok();

        output.push(String::from_utf8_lossy(&buf).to_string());
    }

    output.push(summary_line(diags));
    output.join("\n")
}

fn summary_line(diags: &[Diagnostic]) -> String {
    let errors = diags
        .iter()
        .filter(|d| d.severity >= Severity::Error)
        .count();
    let warnings = diags
        .iter()
        .filter(|d| d.severity == Severity::Warning)
        .count();

    format!(
        "\nFound {} issue(s): {} error, {} warning\n",
        diags.len(),
        errors,
        warnings,
    )
}

/// Convert 1-based line:column to byte offset in source text.
fn line_col_to_offset(source: &str, line: u32, col: u32) -> usize {
    let line = line.saturating_sub(1) as usize;
    let col = col.saturating_sub(1) as usize;

    let offset: usize = source
        .lines()
        .take(line)
        .map(|l| l.len() + 1) // +1 for newline
        .sum();

    (offset + col).min(source.len().saturating_sub(1))
}

/// Fallback format when source file is not available.
fn format_fallback(diag: &Diagnostic) -> String {
    format!(
        "{}:{}:{}: {} [{}] {}\n    {}\n",
        diag.location.file,
        diag.location.line,
        diag.location.column,
        diag.severity,
        diag.rule,
        diag.message,
        diag.explanation,
    )
}
