//! Evaluate route scenarios from the command line.

use anyhow::Result;
use clap::{Parser, Subcommand};
use safepath_cli::Scenario;
use safepath_core::{CancelToken, VehicleType};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Risk-aware route selection
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Score every route in a scenario file and pick one
    Evaluate {
        /// Scenario JSON with `routes`, `hazard_zones` and optional `policy`
        scenario: PathBuf,

        /// Prefer the safest route over the fastest
        #[arg(long)]
        avoid_high_risk: bool,

        /// Only consider routes for this vehicle (driving, walking, cycling)
        #[arg(long)]
        vehicle: Option<VehicleType>,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout stays valid JSON
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive("safepath_core=warn".parse()?))
        .init();

    let args = Args::parse();
    match args.command {
        Command::Evaluate {
            scenario,
            avoid_high_risk,
            vehicle,
            pretty,
        } => {
            let mut loaded = Scenario::load(&scenario)?;
            loaded.apply_overrides(avoid_high_risk, vehicle);

            let cancel = CancelToken::new();
            let on_interrupt = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    on_interrupt.cancel();
                }
            });

            let evaluation = loaded.evaluate(&cancel).await?;
            let output = if pretty {
                serde_json::to_string_pretty(&evaluation)?
            } else {
                serde_json::to_string(&evaluation)?
            };
            println!("{}", output);
        }
    }
    Ok(())
}
