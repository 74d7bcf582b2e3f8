//! Command-line interface for geobatch.

use std::path::PathBuf;
use std::process;
use std::sync::Mutex;

use clap::{ArgGroup, Parser, ValueEnum};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use geobatch::{AddressFormat, Geocoder, GeocoderConfig, output};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(group(ArgGroup::new("mode").required(true).args(["address", "csv_file"])))]
struct Cli {
    /// Raw address to resolve (single-address mode)
    #[arg(long)]
    address: Option<String>,

    /// Headerless input CSV (batch mode); column 0 is the raw address,
    /// remaining columns are carried through to the output
    #[arg(long, value_name = "PATH")]
    csv_file: Option<PathBuf>,

    /// Log verbosity
    #[arg(long, value_enum, default_value = "warning")]
    log_level: LogLevel,

    /// Log destination file
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Geocoding endpoint URL
    #[arg(long, value_name = "URL", default_value = geobatch::DEFAULT_ENDPOINT)]
    endpoint: String,

    /// Cap on concurrently in-flight batch requests (default: whole batch
    /// at once)
    #[arg(long, value_name = "N")]
    max_in_flight: Option<usize>,

    /// Country qualifier prepended to every raw address
    #[arg(long, default_value = "Russia")]
    country: String,

    /// Province qualifier prepended to every raw address
    #[arg(long, default_value = "Kirov Oblast")]
    province: String,

    /// City qualifier prepended to every raw address
    #[arg(long, default_value = "Kirov")]
    city: String,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl LogLevel {
    fn to_filter(self) -> LevelFilter {
        match self {
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warning => LevelFilter::WARN,
            // tracing has no critical level
            LogLevel::Error | LogLevel::Critical => LevelFilter::ERROR,
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> geobatch::Result<()> {
    init_logging(&cli)?;

    let address_format = AddressFormat::new()
        .with_country(cli.country.as_str())
        .with_province(cli.province.as_str())
        .with_city(cli.city.as_str());
    let mut config = GeocoderConfig::builder()
        .endpoint(cli.endpoint.as_str())
        .address_format(address_format);
    if let Some(max_in_flight) = cli.max_in_flight {
        config = config.max_in_flight(max_in_flight);
    }
    let geocoder = Geocoder::with_config(config.build());

    if let Some(address) = &cli.address {
        let records = geocoder.resolve(address).await?;
        output::print_records(&records);
    } else if let Some(input) = &cli.csv_file {
        let output_path = output::output_path_for(input);
        geocoder.run_batch(input, &output_path).await?;
    } else {
        // clap's mode group guarantees one of the two is present
        unreachable!();
    }

    Ok(())
}

fn init_logging(cli: &Cli) -> geobatch::Result<()> {
    let path = cli
        .log_file
        .clone()
        .unwrap_or_else(|| PathBuf::from(concat!(env!("CARGO_PKG_NAME"), ".log")));
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)?;

    let filter = EnvFilter::builder()
        .with_default_directive(cli.log_level.to_filter().into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}
