#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line entry point for the resilience map.
//!
//! ```text
//! resilience_map_cli serve [--bind-addr 0.0.0.0] [--port 8080] [--preload]
//! resilience_map_cli convert [--source-dir raw]
//! resilience_map_cli report [--top 100] [--radius 500]
//! ```
//!
//! Running with no subcommand enters interactive mode.
//!
//! Uses `indicatif-log-bridge` (via [`resilience_map_cli_utils::init_logger`])
//! so that log lines and progress bars never fight for the terminal.

mod convert;
mod report;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use dialoguer::{Input, Select};
use resilience_map_cli_utils::{IndicatifProgress, MultiProgress};
use resilience_map_config::DashboardConfig;
use resilience_map_network_models::TREATMENT_COUNT;
use resilience_map_store::{DataCache, DataPaths};

#[derive(Parser)]
#[command(
    name = "resilience_map_cli",
    about = "Jakarta street network resilience dashboard and tools"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the dashboard server
    Serve {
        /// Address to bind (overrides config)
        #[arg(long)]
        bind_addr: Option<String>,
        /// Port to bind (overrides config)
        #[arg(long)]
        port: Option<u16>,
        /// Load every dataset before accepting requests
        #[arg(long)]
        preload: bool,
    },
    /// Convert the source shapefiles into the GeoJSON assets
    Convert {
        /// Directory holding the `.shp` files
        #[arg(long, default_value = "assets")]
        source_dir: PathBuf,
    },
    /// Print police and fire proximity counts for every treatment
    Report {
        /// Number of top-ranked intersections per treatment
        #[arg(long)]
        top: Option<usize>,
        /// Buffer radius in meters (overrides config)
        #[arg(long)]
        radius: Option<f64>,
    },
}

/// Top-level tool selection for interactive mode.
enum Tool {
    Server,
    Convert,
    Report,
}

impl Tool {
    const ALL: &[Self] = &[Self::Server, Self::Convert, Self::Report];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::Server => "Start server",
            Self::Convert => "Convert shapefiles to GeoJSON",
            Self::Report => "Print proximity report",
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = resilience_map_cli_utils::init_logger();
    let cli = Cli::parse();
    let mut config = DashboardConfig::load()?;

    let Some(command) = cli.command else {
        return interactive(&multi, config).await;
    };

    match command {
        Commands::Serve {
            bind_addr,
            port,
            preload,
        } => {
            if let Some(bind_addr) = bind_addr {
                config.server.bind_addr = bind_addr;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            config.server.preload |= preload;
            serve(&multi, config, false).await?;
        }
        Commands::Convert { source_dir } => {
            let progress = IndicatifProgress::load_bar(&multi, "Converting shapefiles");
            convert::run(&source_dir, &config.assets, progress.as_ref())?;
        }
        Commands::Report { top, radius } => {
            let top = top.unwrap_or(config.analysis.max_top_n).max(1);
            let radius = radius.unwrap_or(config.analysis.buffer_radius_m);
            print_report(&multi, &config, top, radius)?;
        }
    }

    Ok(())
}

async fn interactive(
    multi: &MultiProgress,
    config: DashboardConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", config.page.title);
    println!();

    let labels: Vec<&str> = Tool::ALL.iter().map(Tool::label).collect();

    let idx = Select::new()
        .with_prompt("What would you like to do?")
        .items(&labels)
        .default(0)
        .interact()?;

    match Tool::ALL[idx] {
        Tool::Server => serve(multi, config, true).await?,
        Tool::Convert => {
            let source_dir: String = Input::new()
                .with_prompt("Shapefile directory")
                .default(config.assets.dir.display().to_string())
                .interact_text()?;
            let progress = IndicatifProgress::load_bar(multi, "Converting shapefiles");
            convert::run(
                &PathBuf::from(source_dir),
                &config.assets,
                progress.as_ref(),
            )?;
        }
        Tool::Report => {
            let top: usize = Input::new()
                .with_prompt("Top intersections per treatment")
                .default(config.analysis.max_top_n)
                .interact_text()?;
            let radius = config.analysis.buffer_radius_m;
            print_report(multi, &config, top.max(1), radius)?;
        }
    }

    Ok(())
}

async fn serve(
    multi: &MultiProgress,
    config: DashboardConfig,
    prompt: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let progress = IndicatifProgress::load_bar(multi, "Loading datasets");

    // The server uses actix-web's runtime, so we need to run it in a
    // blocking task to avoid nesting tokio runtimes.
    tokio::task::spawn_blocking(move || {
        actix_web::rt::System::new().block_on(async move {
            if prompt {
                resilience_map_server::interactive::run(config, progress.as_ref()).await
            } else {
                resilience_map_server::run_server(config, progress.as_ref()).await
            }
        })
    })
    .await??;

    Ok(())
}

fn print_report(
    multi: &MultiProgress,
    config: &DashboardConfig,
    top: usize,
    radius_m: f64,
) -> Result<(), Box<dyn std::error::Error>> {
    let cache = DataCache::new(DataPaths::from_assets(&config.assets));

    let loading = IndicatifProgress::load_bar(multi, "Loading datasets");
    cache.preload(loading.as_ref())?;

    let scoring = IndicatifProgress::steps_bar(multi, "Treatments", TREATMENT_COUNT as u64);
    let report = report::run(&cache, radius_m, top, scoring.as_ref())?;

    println!(
        "Top {} intersections per treatment, {radius_m} m buffers",
        report.top
    );
    print!("{}", report.to_tsv());
    Ok(())
}
