//! Output formatting for run summaries

use clap::ValueEnum;
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use pmcheck_e2e::{TestResult, TestSuiteResult};

/// Output format
#[derive(Debug, Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable table format
    #[default]
    Table,
    /// JSON format
    Json,
    /// Plain text format
    Plain,
}

fn status(result: &TestResult) -> &'static str {
    if result.success {
        "passed"
    } else {
        "failed"
    }
}

/// Print per-test rows followed by the totals line
pub fn print_summary(summary: &TestSuiteResult, format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic);

            table.set_header(vec!["Suite", "Test", "Status", "Duration", "Error"]);
            for result in &summary.results {
                table.add_row(vec![
                    result.suite.to_string(),
                    result.name.clone(),
                    status(result).to_string(),
                    format!("{} ms", result.duration_ms),
                    result.error.clone().unwrap_or_default(),
                ]);
            }

            println!("{table}");
            print_totals(summary);
        }
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(summary).unwrap_or_default()
            );
        }
        OutputFormat::Plain => {
            for result in &summary.results {
                println!("{} {} {}", result.suite, result.name, status(result));
                if let Some(path) = &result.screenshot {
                    println!("  screenshot: {}", path.display());
                }
            }
            print_totals(summary);
        }
    }
}

fn print_totals(summary: &TestSuiteResult) {
    let line = format!(
        "{} passed, {} failed, {} skipped in {:.1}s",
        summary.passed,
        summary.failed,
        summary.skipped,
        summary.duration_ms as f64 / 1000.0
    );
    if summary.is_success() {
        println!("{}", line.green().bold());
    } else {
        println!("{}", line.red().bold());
    }
}
