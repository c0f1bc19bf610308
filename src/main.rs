use anyhow::Result;
use sheet_sentiment::{config::Config, logging, RunSummary, SentimentPipeline, VaderScorer};

fn main() {
    // Nothing would reach the terminal through tracing without a subscriber.
    if let Err(e) = logging::init_logging() {
        eprintln!("Error: failed to initialize logging: {:#}", e);
        std::process::exit(1);
    }

    if let Err(e) = run() {
        tracing::error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    // Load configuration
    let config = Config::load()?;
    tracing::debug!("Configuration: {:?}", config);

    let scorer = VaderScorer::new()?;
    let summary = SentimentPipeline::new(&config, &scorer).run()?;
    report(&summary);

    Ok(())
}

fn report(summary: &RunSummary) {
    tracing::info!(
        "Scored {} rows from column '{}'",
        summary.row_count,
        summary.text_column
    );
    tracing::info!(
        "Wrote {} columns to {}: {}",
        summary.columns.len(),
        summary.output_path.display(),
        summary.columns.join(", ")
    );
    tracing::info!("Label counts:");
    for (label, count) in summary.label_counts.ranked() {
        tracing::info!("  {:<8} {}", label.as_str(), count);
    }
}
