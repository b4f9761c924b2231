#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web dashboard server for the resilience map.

use resilience_map_config::DashboardConfig;
use resilience_map_store::progress::NullProgress;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let config = DashboardConfig::load().map_err(std::io::Error::other)?;

    resilience_map_server::run_server(config, &NullProgress).await
}
