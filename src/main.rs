mod cli;
mod config;
mod gemini_client;
mod search_client;

use std::io;
use std::process::ExitCode;

use clap::Parser;
use dotenv::dotenv;
use eyre::Result;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use crate::cli::chat::ChatContext;
use crate::cli::chat::pipeline::Pipeline;
use crate::config::Config;
use crate::gemini_client::GeminiClient;
use crate::search_client::DuckDuckGoClient;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Run a single search query instead of the interactive loop
    #[arg(short, long)]
    input: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Load environment variables from .env file
    dotenv().ok();

    let cli = Cli::parse();

    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            return Ok(ExitCode::FAILURE);
        }
    };

    info!("Starting travel search CLI");

    let pipeline = Pipeline::new(
        Box::new(GeminiClient::new(&config)),
        Box::new(DuckDuckGoClient::new(&config)),
    );

    let interactive = cli.input.is_none();
    let mut chat_context = ChatContext::new(
        Box::new(io::stdout()),
        cli.input,
        interactive,
        pipeline,
    );

    chat_context.run().await
}
