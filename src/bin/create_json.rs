use clap::Parser;
use energy_report::config::parse_timezone;
use energy_report::converter::convert;
use energy_report::importers::energy_extractor::{DEFAULT_HEADER_ROWS, DEFAULT_SHEET_NAME};
use energy_report::importers::ExtractorConfig;
use energy_report::sinks::JsonFileSink;
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "create-json")]
#[command(about = "Convert an energy usage spreadsheet export into JSON", long_about = None)]
struct Cli {
    /// Path to the spreadsheet export (xlsx, xls, xlsb or ods)
    #[arg(long, env = "ENERGY_REPORT_INPUT", default_value = "energy-report.xlsx")]
    input: PathBuf,

    /// Sheet holding the energy data
    #[arg(long, env = "ENERGY_REPORT_SHEET", default_value = DEFAULT_SHEET_NAME)]
    sheet: String,

    /// IANA timezone the spreadsheet timestamps are written in
    #[arg(long, env = "ENERGY_REPORT_TIMEZONE", default_value = "Europe/Vienna")]
    timezone: String,

    /// Metadata rows above the data region
    #[arg(long, default_value_t = DEFAULT_HEADER_ROWS)]
    header_rows: usize,

    /// Where to write the JSON array
    #[arg(long, env = "ENERGY_REPORT_OUTPUT", default_value = "energy-report.json")]
    output: PathBuf,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if it exists (ignore errors if not found)
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let timezone = parse_timezone("--timezone", &cli.timezone)?;
    let config = ExtractorConfig::new(cli.sheet)
        .with_timezone(timezone)
        .with_header_rows(cli.header_rows);

    info!(
        "Converting {} (sheet '{}', timezone {}) -> {}",
        cli.input.display(),
        config.sheet_name,
        timezone.name(),
        cli.output.display()
    );

    let mut sink = JsonFileSink::new(&cli.output);
    match convert(&cli.input, &mut sink, config) {
        Ok(count) => {
            info!("Wrote {} records to {}", count, cli.output.display());
            Ok(())
        }
        Err(e) => {
            error!("Error parsing Excel file: {}", e);
            std::process::exit(1);
        }
    }
}
