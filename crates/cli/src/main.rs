//! pmcheck CLI - Main Entry Point
//!
//! Runs the UI suite, the API suite or both, writes results and
//! optionally builds and opens the Allure report.

use clap::{Parser, ValueEnum};
use colored::Colorize;
use pmcheck_common::{Settings, TestData, TOKEN_VARS};
use pmcheck_e2e::{report, RunMode, TestRunner};
use tracing::info;

mod output;

/// Which suites to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Browser scenarios only
    Ui,
    /// API scenarios only
    Api,
    /// Both suites
    All,
}

impl From<Mode> for RunMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Ui => RunMode::Ui,
            Mode::Api => RunMode::Api,
            Mode::All => RunMode::All,
        }
    }
}

/// pmcheck - end-to-end checks for the project-management service
#[derive(Parser, Debug)]
#[command(name = "pmcheck")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Suites to run
    #[arg(value_enum)]
    mode: Mode,

    /// Generate and open the Allure report after a passing run
    #[arg(long)]
    report: bool,

    /// Open the existing Allure report without running anything
    #[arg(long)]
    open: bool,

    /// Output format for the run summary
    #[arg(long, default_value = "table")]
    format: output::OutputFormat,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_target(false)
        .init();

    let settings = Settings::from_env()?;
    let report_dir = report::report_dir(&settings.reports_dir);

    if cli.open && !cli.report {
        report::open(&report_dir)?;
        return Ok(());
    }

    let mode = RunMode::from(cli.mode);
    if mode.needs_api_token() && !settings.has_api_token() {
        println!(
            "{}",
            format!("❌ No API token found in {}", TOKEN_VARS.join(" or ")).red().bold()
        );
        println!("Set it before running API tests:");
        println!("  export API_TOKEN=your_token_here");
        std::process::exit(1);
    }

    let data = TestData::load(&settings)?;
    let mut runner = TestRunner::new(settings, data);

    let summary = runner.run(mode).await?;
    let results_file = runner.write_results(&summary)?;
    info!("Results written to {}", results_file.display());

    let results_dir = runner.settings().allure_results_dir.clone();
    report::write_allure_results(&results_dir, &summary)?;

    output::print_summary(&summary, cli.format);

    if !summary.is_success() {
        println!("❌ {} test(s) failed", summary.failed);
        std::process::exit(1);
    }
    println!("✅ All {} test(s) passed", summary.passed);

    if cli.report {
        report::generate(&results_dir, &report_dir)?;
        println!("Report generated at {}", report_dir.display());
        report::open(&report_dir)?;
    }

    Ok(())
}
