use chrono::Datelike;
use clap::{Args as ClapArgs, Parser, Subcommand};
use fire_risk_core::{
    ArtifactCell, CarriedIndices, Coordinates, FireIndexEngine, MeteorologicalRiskService,
    RiskConfig, WeatherObservation,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::EnvFilter;

static ARTIFACTS: ArtifactCell = ArtifactCell::new();

/// Wildfire meteorological risk from current weather
#[derive(Parser, Debug)]
#[command(name = "fire-risk")]
#[command(about = "Fire Weather Index and wildfire risk probability", long_about = None)]
struct Args {
    /// TOML config file (defaults and FIRE_RISK_* variables apply otherwise)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch current weather and classify the wildfire risk at a point
    Evaluate {
        /// Latitude in degrees
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,

        /// Longitude in degrees
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,

        #[command(flatten)]
        carried: CarriedArgs,
    },

    /// Compute the FWI chain offline from given weather
    Indices {
        /// Temperature in °C
        #[arg(short, long, allow_negative_numbers = true)]
        temperature: f64,

        /// Relative humidity in %
        #[arg(long)]
        humidity: f64,

        /// Wind speed in km/h
        #[arg(short, long)]
        wind: f64,

        /// Rain in mm
        #[arg(short, long, default_value_t = 0.0)]
        rain: f64,

        #[command(flatten)]
        carried: CarriedArgs,
    },
}

/// Yesterday's codes; anything omitted falls back to the configured baseline
#[derive(ClapArgs, Debug, Default)]
struct CarriedArgs {
    #[arg(long)]
    ffmc_prev: Option<f64>,

    #[arg(long)]
    dmc_prev: Option<f64>,

    #[arg(long)]
    dc_prev: Option<f64>,

    /// Month (1-12) of the day being computed
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=12))]
    month: Option<u8>,
}

impl CarriedArgs {
    fn is_empty(&self) -> bool {
        self.ffmc_prev.is_none()
            && self.dmc_prev.is_none()
            && self.dc_prev.is_none()
            && self.month.is_none()
    }

    fn resolve(&self, config: &RiskConfig) -> CarriedIndices {
        let baseline = &config.baseline;
        let month = self
            .month
            .unwrap_or_else(|| chrono::Local::now().month() as u8);
        CarriedIndices::new(
            self.ffmc_prev.unwrap_or(baseline.ffmc_prev),
            self.dmc_prev.unwrap_or(baseline.dmc_prev),
            self.dc_prev.unwrap_or(baseline.dc_prev),
            month,
        )
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match run(args).await {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "fire-risk failed");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<String, Box<dyn std::error::Error>> {
    let config = RiskConfig::load(args.config.as_deref())?;

    match args.command {
        Command::Evaluate { lat, lon, carried } => {
            let service = MeteorologicalRiskService::from_config(&config, &ARTIFACTS)?;
            let assessment = if carried.is_empty() {
                service.evaluate_meteorological_risk(lat, lon).await?
            } else {
                let coords = Coordinates::new(lat, lon)?;
                service
                    .evaluate_with(coords, Some(carried.resolve(&config)))
                    .await?
            };
            Ok(serde_json::to_string_pretty(&assessment)?)
        }
        Command::Indices {
            temperature,
            humidity,
            wind,
            rain,
            carried,
        } => {
            let obs = WeatherObservation::new(temperature, humidity, wind, rain)?;
            let indices = FireIndexEngine::compute(&obs, &carried.resolve(&config))?;
            Ok(serde_json::to_string_pretty(&indices)?)
        }
    }
}
