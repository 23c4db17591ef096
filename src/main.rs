use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use noema::analyzer::NoteAnalyzer;
use noema::client::{ApiClientBuilder, ApiClientError};
use noema::config::{ConfigError, ServerConfig};
use noema::graph::LayoutConfig;
use noema::openai::{OpenAiClientBuilder, OpenAiError};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// noema - capture loose thoughts and let a language model find the themes
#[derive(Parser)]
#[command(name = "noema")]
#[command(about = "Capture notes, discover themes, explore them as a graph")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand)]
enum Commands {
    /// Run the analysis API server
    Serve(ServeCommand),
    /// Launch the interactive notes and graph interface
    Tui(TuiCommand),
}

/// Run the analysis API server
#[derive(Parser)]
struct ServeCommand {
    /// Port to listen on (defaults to PORT, then 3000)
    #[arg(short, long, value_name = "PORT")]
    port: Option<u16>,
}

/// Launch the interactive interface
#[derive(Parser)]
struct TuiCommand {
    /// Analysis server URL (defaults to NOEMA_API_URL, then NOEMA_ENV)
    #[arg(long, value_name = "URL")]
    api_url: Option<String>,

    /// Graph layout used for placing notes around their themes
    #[arg(long, value_enum, default_value_t = LayoutKind::Arc)]
    layout: LayoutKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LayoutKind {
    /// Notes fan out along an arc beyond their theme
    Arc,
    /// Notes sit in a grid beside their theme
    Grid,
}

impl LayoutKind {
    fn config(self) -> LayoutConfig {
        match self {
            LayoutKind::Arc => LayoutConfig::arc(),
            LayoutKind::Grid => LayoutConfig::grid(),
        }
    }
}

fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let result = match &cli.command {
        Commands::Serve(cmd) => handle_serve(cmd),
        Commands::Tui(cmd) => handle_tui(cmd),
    };

    if let Err(e) = result {
        let exit_code = if is_user_error(&e) { 1 } else { 2 };
        eprintln!("Error: {e:#}");
        std::process::exit(exit_code);
    }
}

/// Determines if an error is a user error (vs internal error).
///
/// Configuration mistakes are user errors; runtime and I/O failures are
/// internal.
fn is_user_error(error: &anyhow::Error) -> bool {
    error.chain().any(|cause| {
        cause.downcast_ref::<ConfigError>().is_some()
            || matches!(
                cause.downcast_ref::<ApiClientError>(),
                Some(ApiClientError::Config(_) | ApiClientError::InvalidUrl(_))
            )
            || matches!(
                cause.downcast_ref::<OpenAiError>(),
                Some(OpenAiError::InvalidUrl(_))
            )
    })
}

/// Installs the fmt subscriber; `RUST_LOG` overrides the default filter.
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,noema=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn handle_serve(cmd: &ServeCommand) -> Result<()> {
    init_tracing();

    let config = ServerConfig::from_env()
        .context("Invalid server configuration")?
        .with_port(cmd.port);

    let client = OpenAiClientBuilder::new()
        .build()
        .context("Failed to configure OpenAI client")?;
    let key_configured = client.has_api_key();
    let model = client.model().to_string();
    let analyzer = NoteAnalyzer::new(Arc::new(client), model);

    noema::server::serve(&config, Arc::new(analyzer), key_configured)
}

fn handle_tui(cmd: &TuiCommand) -> Result<()> {
    let mut builder = ApiClientBuilder::new();
    if let Some(url) = &cmd.api_url {
        builder = builder.base_url(url);
    }
    let client = builder.build().context("Failed to configure API client")?;

    noema::tui::run(Arc::new(client), cmd.layout.config())
}
