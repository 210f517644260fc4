//! clipvox: ClipVox server binary
//!
//! Usage:
//!   clipvox            - Start the HTTP server
//!   clipvox --help     - Show help
//!   clipvox --version  - Show version

use std::sync::Arc;

use clipvox_api::AppState;
use clipvox_core::{Config, LlmClient, ScriptOrchestrator};
use clipvox_voice::{GoogleTtsClient, SpeechSynthesizer};
use tracing_subscriber::EnvFilter;

/// Run mode
enum RunMode {
    Server,
    Help,
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    match parse_args() {
        RunMode::Help => {
            print_help();
            return Ok(());
        }
        RunMode::Version => {
            println!("clipvox {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        RunMode::Server => {}
    }

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    dotenvy::dotenv().ok();

    let config = Config::load().map_err(|e| anyhow::anyhow!("Config error: {}", e))?;

    tracing::info!("Starting clipvox...");
    tracing::info!(
        "Text model: {} ({:?})",
        config.llm.model,
        config.llm.provider
    );

    run_server(config).await
}

/// Parse command line arguments
fn parse_args() -> RunMode {
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--help" | "-h" => return RunMode::Help,
            "--version" | "-v" => return RunMode::Version,
            _ => {}
        }
    }

    RunMode::Server
}

/// Print help message
fn print_help() {
    println!("clipvox - narrated video scripts and voice-over");
    println!();
    println!("Usage:");
    println!("  clipvox            Start the HTTP server");
    println!("  clipvox --help     Show this help message");
    println!("  clipvox --version  Show version");
    println!();
    println!("Configuration is read from ./clipvox.toml when present, then the environment.");
    println!();
    println!("Environment Variables:");
    println!("  LLM_API_KEY                    API key (required; OPENAI_API_KEY also accepted)");
    println!("  LLM_MODEL                      Model name (default: gpt-4o-mini)");
    println!("  LLM_PROVIDER                   Provider: openai or claude (default: openai)");
    println!("  LLM_BASE_URL                   Custom API endpoint");
    println!("  GOOGLE_TTS_CREDENTIALS_JSON    Service-account JSON");
    println!("  GOOGLE_TTS_CREDENTIALS_BASE64  Service-account JSON, base64-encoded");
    println!("  TTS_ENDPOINT                   Custom synthesize endpoint");
    println!("  PORT                           HTTP port (default: 3000)");
    println!("  ALLOWED_ORIGINS                Comma-separated CORS origins (default: any)");
}

/// Wire the clients together and serve until Ctrl+C
async fn run_server(config: Config) -> anyhow::Result<()> {
    let llm_client = LlmClient::new(&config.llm)
        .map_err(|e| anyhow::anyhow!("Failed to create LLM client: {}", e))?;
    let script = ScriptOrchestrator::new(Arc::new(llm_client));

    let tts_client = GoogleTtsClient::from_settings(&config.tts)
        .map_err(|e| anyhow::anyhow!("Failed to create TTS client: {}", e))?;
    tracing::info!("Speech endpoint: {}", tts_client.endpoint());
    let speech = SpeechSynthesizer::new(Arc::new(tts_client));

    let state = AppState::new(script, speech);
    tracing::info!("Press Ctrl+C to exit");

    tokio::select! {
        result = clipvox_api::start_server(&config.server, state) => {
            result.map_err(|e| anyhow::anyhow!("HTTP API error: {}", e))?;
        }
        signal = tokio::signal::ctrl_c() => {
            signal?;
            tracing::info!("Shutting down...");
        }
    }

    Ok(())
}
