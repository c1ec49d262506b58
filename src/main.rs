use anyhow::{Context, Result};
use clap::Parser;
use index_report::{
    models::{ReportOptions, DEFAULT_EXTENSION, DEFAULT_INDEX_PATH, DEFAULT_OUTPUT_PATH},
    report::ReportGenerator,
    utils,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "index-report")]
#[command(author, version, about = "Report the largest files of one extension", long_about = None)]
struct Cli {
    /// Parquet index produced by the indexer
    #[arg(short, long, default_value = DEFAULT_INDEX_PATH)]
    index: PathBuf,

    /// Output CSV file path
    #[arg(short, long, default_value = DEFAULT_OUTPUT_PATH)]
    output: PathBuf,

    /// Extension to report on (exact, case-sensitive, no leading dot)
    #[arg(short, long, default_value = DEFAULT_EXTENSION)]
    extension: String,

    /// Only keep the N largest files
    #[arg(short = 'n', long)]
    limit: Option<usize>,

    /// Header of the leading row-number column
    #[arg(long)]
    index_label: Option<String>,

    /// Also write a JSON summary of the run
    #[arg(long)]
    summary: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    setup_logging(cli.verbose)?;

    run_report(cli)
}

fn setup_logging(verbose: bool) -> Result<()> {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();

    Ok(())
}

fn run_report(cli: Cli) -> Result<()> {
    info!("Index Report v{}", env!("CARGO_PKG_VERSION"));

    let options = ReportOptions {
        index_path: cli.index,
        output_path: cli.output,
        extension: cli.extension,
        limit: cli.limit,
        index_label: cli.index_label.unwrap_or_default(),
    };

    info!("Report configuration:");
    info!("  Index file: {}", options.index_path.display());
    info!("  Output file: {}", options.output_path.display());
    info!("  Extension: {}", options.extension);
    if let Some(limit) = options.limit {
        info!("  Limit: {}", utils::format_number(limit as u64));
    }

    let progress = ProgressBar::new_spinner();
    progress.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .context("Invalid progress template")?,
    );
    progress.set_message("Generating report");
    progress.enable_steady_tick(Duration::from_millis(120));

    let generator = ReportGenerator::new(options);
    let result = generator.run();
    progress.finish_and_clear();

    let summary = result.with_context(|| {
        format!(
            "Failed to generate report from {}",
            generator.options().index_path.display()
        )
    })?;

    if let Some(summary_path) = cli.summary {
        summary
            .save_to_file(&summary_path)
            .context("Failed to save summary")?;
        info!("Summary written to {}", summary_path.display());
    }

    println!();
    println!("Report completed successfully");
    println!("---");
    println!("Rows in index:   {}", utils::format_number(summary.rows_read));
    println!(
        "Rows matched:    {} ({:.2}% of index, extension '{}')",
        utils::format_number(summary.rows_matched),
        summary.match_percentage(),
        summary.extension
    );
    println!("Rows written:    {}", utils::format_number(summary.rows_written));
    println!("Total size:      {}", utils::format_bytes(summary.total_size));
    if let Some(largest) = summary.largest_size {
        println!("Largest file:    {}", utils::format_bytes(largest));
    }
    println!("Duration:        {}", utils::format_duration(summary.duration_secs));
    println!();
    println!("Output written to: {}", summary.output_path);

    Ok(())
}
