use mood_stats::{AnalysisConfig, OutputFormat, build_summary, load_entries};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = AnalysisConfig::from_env();
    info!("reading entries from {}", config.data_path.display());

    let intake = load_entries(&config.data_path).await;
    if !intake.rejected.is_empty() {
        warn!(
            rejected = intake.rejected.len(),
            "some entries were malformed and left out"
        );
    }

    let summary = build_summary(&intake.entries, config.summary_options());
    info!(
        entries = summary.total_entries,
        days = summary.distinct_days,
        "summary built"
    );

    match config.output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
        OutputFormat::Digest => print!("{}", summary.digest()),
    }

    Ok(())
}
