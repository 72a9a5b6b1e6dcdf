pub mod cli;
pub mod config;
pub mod error;
pub mod llm;
pub mod models;
pub mod server;

use cli::Args;
use config::RelaySettings;
use llm::GeminiChatClient;
use log::info;
use server::Server;
use server::api::AppState;
use std::error::Error;
use std::sync::Arc;

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    let settings = RelaySettings::from_args(&args)?;

    info!("--- Core Configuration ---");
    info!("Server Address: {}", args.server_addr);
    info!("Gemini Model: {}", settings.model);
    info!("Gemini Base URL: {}", args.gemini_base_url);
    info!("Temperature: {}", settings.temperature);
    info!(
        "Persona: {}",
        args.persona_path.as_deref().unwrap_or("built-in")
    );
    info!("TLS Enabled: {}", args.enable_tls);
    info!("-------------------------");

    let client = Arc::new(GeminiChatClient::from_args(&args)?);
    let state = AppState::new(client, settings);

    let addr = args.server_addr.clone();
    info!("Starting server on: {}", addr);
    let server = Server::new(addr, state, args);
    server.run().await?;

    Ok(())
}
