//! Report formatting and printing utilities.
//!
//! This module displays issues and command summaries in cargo-style
//! format. Separate from core logic to allow locsync to be used as a
//! library.

use std::io::{self, Write};

use colored::Colorize;
use unicode_width::UnicodeWidthStr;

use super::commands::{CommandResult, CommandSummary, LocaleCoverage};
use crate::config::CONFIG_FILE_NAME;
use crate::issues::{Issue, Severity};

/// Success mark for consistent output formatting.
pub const SUCCESS_MARK: &str = "\u{2713}"; // ✓

/// Failure mark for consistent output formatting.
pub const FAILURE_MARK: &str = "\u{2718}"; // ✘

/// Print issues in cargo-style format to stdout.
pub fn report(issues: &[Issue]) {
    report_to(issues, &mut io::stdout().lock());
}

/// Print issues to a custom writer.
///
/// Useful for testing or redirecting output.
pub fn report_to<W: Write>(issues: &[Issue], writer: &mut W) {
    if issues.is_empty() {
        return;
    }

    let mut sorted = issues.to_vec();
    sorted.sort_by(|a, b| {
        a.locale
            .cmp(&b.locale)
            .then_with(|| a.key.cmp(&b.key))
            .then_with(|| a.value.cmp(&b.value))
    });

    // Align the rule column on the widest offending value.
    let max_value_width = sorted
        .iter()
        .map(|issue| UnicodeWidthStr::width(issue.value.as_str()))
        .max()
        .unwrap_or(0);

    for issue in &sorted {
        print_issue(issue, writer, max_value_width);
    }
    print_totals(&sorted, writer);
}

fn print_issue<W: Write>(issue: &Issue, writer: &mut W, max_value_width: usize) {
    let severity_str = match issue.severity {
        Severity::Error => "error".bold().red(),
        Severity::Warning => "warning".bold().yellow(),
    };
    let padding = " ".repeat(max_value_width - UnicodeWidthStr::width(issue.value.as_str()));

    let _ = writeln!(
        writer,
        "{}: \"{}\"{}  {}",
        severity_str,
        issue.value,
        padding,
        issue.rule.to_string().dimmed().cyan()
    );
    let _ = writeln!(
        writer,
        "  {} {}:{}",
        "-->".blue(),
        issue.locale,
        issue.key
    );
    let _ = writeln!(writer, "  {}", issue.message.dimmed());
    let _ = writeln!(writer);
}

fn print_totals<W: Write>(issues: &[Issue], writer: &mut W) {
    let warnings = issues
        .iter()
        .filter(|issue| issue.severity == Severity::Warning)
        .count();
    let _ = writeln!(
        writer,
        "{} {}",
        FAILURE_MARK.yellow(),
        format!(
            "{} {} emitted",
            warnings,
            if warnings == 1 { "warning" } else { "warnings" }
        )
        .yellow()
    );
}

/// Print the per-command summary to stdout.
pub fn print_summary(result: &CommandResult) {
    print_summary_to(result, &mut io::stdout().lock());
}

/// Print the per-command summary to a custom writer.
pub fn print_summary_to<W: Write>(result: &CommandResult, writer: &mut W) {
    match &result.summary {
        CommandSummary::Export(summary) => {
            let _ = writeln!(
                writer,
                "{} {}",
                SUCCESS_MARK.green(),
                format!(
                    "Exported {} {} to '{}'",
                    summary.message_count,
                    if summary.message_count == 1 {
                        "message"
                    } else {
                        "messages"
                    },
                    summary.payload_path.display()
                )
                .green()
            );
        }
        CommandSummary::Import(summary) => {
            print_coverage(&summary.coverage, writer);
            let action = if summary.is_dry_run {
                "Would write"
            } else {
                "Wrote"
            };
            let _ = writeln!(
                writer,
                "{} {}",
                SUCCESS_MARK.green(),
                format!(
                    "{} {} locale file(s) and {} component file(s)",
                    action, summary.locale_file_count, summary.component_file_count
                )
                .green()
            );
        }
        CommandSummary::Check(summary) => {
            print_coverage(&summary.coverage, writer);
            let _ = writeln!(
                writer,
                "{} {}",
                SUCCESS_MARK.green(),
                "Catalogs and payloads are valid".green()
            );
        }
        CommandSummary::Init(summary) => {
            if summary.created {
                let _ = writeln!(
                    writer,
                    "{} {}",
                    SUCCESS_MARK.green(),
                    format!("Created {}", CONFIG_FILE_NAME).green()
                );
            }
        }
    }
}

fn print_coverage<W: Write>(coverage: &[LocaleCoverage], writer: &mut W) {
    let code_width = coverage
        .iter()
        .map(|entry| UnicodeWidthStr::width(entry.locale.as_str()))
        .max()
        .unwrap_or(0);
    for entry in coverage {
        let padding = " ".repeat(code_width - UnicodeWidthStr::width(entry.locale.as_str()));
        let _ = writeln!(
            writer,
            "  {}{}  {}/{} translated",
            entry.locale.cyan(),
            padding,
            entry.translated,
            entry.total
        );
    }
}
