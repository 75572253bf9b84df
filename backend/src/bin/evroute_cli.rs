use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use evroute::{
    catalog::StationCatalog,
    charging::{DurationUnit, session_duration_in},
    models::{ChargingSessionParams, Coordinate},
    polyline, simulator,
    stations::rank_by_preference,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(author, version, about = "Offline EV trip planning and charging estimates")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Simulate a trip over an already-encoded route polyline
    Plan {
        /// Encoded polyline, or a file containing one
        #[arg(long)]
        polyline: String,
        /// Starting battery percentage
        #[arg(long)]
        battery: f64,
        /// Vehicle efficiency in km/kWh
        #[arg(long)]
        efficiency: f64,
        /// Station catalog JSON
        #[arg(long)]
        stations: PathBuf,
    },
    /// Rank stations for a driver at the given position
    Nearest {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lng: f64,
        #[arg(long)]
        battery: f64,
        #[arg(long)]
        stations: PathBuf,
    },
    /// Estimate how long a charging session takes
    ChargeTime {
        /// Battery capacity in kWh
        #[arg(long)]
        capacity: f64,
        /// Current charge percentage
        #[arg(long)]
        current: f64,
        /// Target charge percentage
        #[arg(long)]
        target: f64,
        /// Charger power in kW
        #[arg(long)]
        power: f64,
        /// Ignore charging losses
        #[arg(long)]
        no_loss: bool,
        /// Print hours instead of minutes
        #[arg(long)]
        hours: bool,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match Args::parse().command {
        Command::Plan {
            polyline: encoded,
            battery,
            efficiency,
            stations,
        } => {
            let encoded = read_polyline(&encoded)?;
            let path = polyline::decode(encoded.trim())?;
            let catalog = StationCatalog::from_file(&stations)?;
            tracing::info!(
                "simulating {} point(s) against {} station(s)",
                path.len(),
                catalog.len()
            );

            let plan = simulator::plan(&path, battery, efficiency, catalog.stations())?;
            if plan.range_at_risk() {
                tracing::warn!("battery runs low with no charging station in reach");
            }
            println!("{}", serde_json::to_string_pretty(&plan)?);
        }
        Command::Nearest {
            lat,
            lng,
            battery,
            stations,
        } => {
            let catalog = StationCatalog::from_file(&stations)?;
            let ranked = rank_by_preference(Coordinate::new(lat, lng), catalog.stations(), battery)?;
            println!("{}", serde_json::to_string_pretty(&ranked)?);
        }
        Command::ChargeTime {
            capacity,
            current,
            target,
            power,
            no_loss,
            hours,
        } => {
            let params = ChargingSessionParams {
                battery_capacity_kwh: capacity,
                current_charge_percent: current,
                target_charge_percent: target,
                charging_power_kw: power,
                include_loss: !no_loss,
            };
            if hours {
                println!("{} h", session_duration_in(&params, DurationUnit::Hours)?);
            } else {
                println!("{} min", session_duration_in(&params, DurationUnit::Minutes)?);
            }
        }
    }

    Ok(())
}

fn read_polyline(arg: &str) -> std::io::Result<String> {
    let path = Path::new(arg);
    if path.is_file() {
        std::fs::read_to_string(path)
    } else {
        Ok(arg.to_string())
    }
}
