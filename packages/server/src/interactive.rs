//! Interactive mode for the server.
//!
//! Prompts for the bind address, port, and preload flag before starting
//! the server.

use dialoguer::{Confirm, Input};
use resilience_map_config::DashboardConfig;
use resilience_map_store::progress::ProgressCallback;

/// Runs the server in interactive mode, prompting for configuration.
///
/// The prompts default to the values already in `config`; a prompt that
/// cannot be answered (e.g. no terminal) keeps the configured value.
///
/// # Errors
///
/// Returns an `std::io::Result` error if the underlying server fails to
/// start.
#[allow(clippy::future_not_send)]
pub async fn run(
    mut config: DashboardConfig,
    progress: &dyn ProgressCallback,
) -> std::io::Result<()> {
    println!("{}", config.page.title);
    println!();

    config.server.bind_addr = Input::new()
        .with_prompt("Bind address")
        .default(config.server.bind_addr.clone())
        .interact_text()
        .unwrap_or_else(|_| config.server.bind_addr.clone());

    config.server.port = Input::new()
        .with_prompt("Port")
        .default(config.server.port)
        .interact_text()
        .unwrap_or(config.server.port);

    config.server.preload = Confirm::new()
        .with_prompt("Load all datasets before accepting requests?")
        .default(config.server.preload)
        .interact()
        .unwrap_or(config.server.preload);

    let bind_addr = &config.server.bind_addr;
    let port = config.server.port;
    if !Confirm::new()
        .with_prompt(format!("Start server on {bind_addr}:{port}?"))
        .default(true)
        .interact()
        .unwrap_or(true)
    {
        println!("Cancelled.");
        return Ok(());
    }

    super::run_server(config, progress).await
}
