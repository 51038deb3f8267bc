use clap::Parser;
use energy_report::config::parse_timezone;
use energy_report::fetcher::{read_records_file, ReportFetcher};
use energy_report::services::{InvalidDatePolicy, ReportService};
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "daily-report")]
#[command(about = "Print daily energy consumption from a converted energy report", long_about = None)]
#[command(group(clap::ArgGroup::new("source").required(true).args(["url", "file"])))]
struct Cli {
    /// URL of the served report, e.g. http://localhost:8080/assets/energy-report.json
    #[arg(long, env = "ENERGY_REPORT_URL")]
    url: Option<String>,

    /// Local JSON report written by create-json
    #[arg(long)]
    file: Option<PathBuf>,

    /// IANA timezone used to cut days
    #[arg(long, env = "DISPLAY_TIMEZONE", default_value = "Europe/Vienna")]
    timezone: String,

    /// What to do with rows whose date could not be parsed: 'drop' or 'sentinel'
    #[arg(long, env = "INVALID_DATE_POLICY", default_value = "drop")]
    invalid_dates: InvalidDatePolicy,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let timezone = parse_timezone("--timezone", &cli.timezone)?;

    let records = if let Some(url) = &cli.url {
        ReportFetcher::new(url.clone()).fetch_or_empty().await
    } else if let Some(file) = &cli.file {
        read_records_file(file).unwrap_or_else(|e| {
            error!("Failed to load energy report: {}", e);
            Vec::new()
        })
    } else {
        Vec::new()
    };

    if records.is_empty() {
        println!("No energy data available.");
        return Ok(());
    }

    let service = ReportService::new(records)
        .with_display_timezone(timezone)
        .with_invalid_date_policy(cli.invalid_dates);

    let daily = service.daily_consumption();
    info!("Aggregated {} days", daily.len());

    println!("\nEntries: {}", service.record_count().count);
    println!("\n{:<14} {:>14}", "Day", "Consumption");
    for day in &daily {
        println!("{:<14} {:>14.3}", day.label, day.total_consumption);
    }
    let total: f64 = daily.iter().map(|d| d.total_consumption).sum();
    println!("{:<14} {:>14.3}\n", "Total", total);

    Ok(())
}
