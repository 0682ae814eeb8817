//! Ratinglens - Free-text Q&A over a session ratings spreadsheet
//!
//! This is the main entry point for the ratinglens analysis server, plus
//! companion commands for one-off questions and connectivity diagnostics.

use clap::{Parser, Subcommand};
use ratinglens_core::{
    analysis::analyze_locally,
    api::{ApiServer, ApiServerConfig},
    doctor::{self, CheckStatus},
    error::Result,
    sheets::{structure, SheetsApi},
    AnalysisOutcome, GoogleSheetsClient, Orchestrator, Settings, SheetSource,
};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, Level};
use tracing_subscriber::{self, EnvFilter};

#[derive(Parser)]
#[command(name = "ratinglens")]
#[command(about = "Free-text Q&A over a session ratings spreadsheet", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Set log level
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP analysis server
    Serve {
        /// Server address
        #[arg(long, default_value = "127.0.0.1:3000")]
        addr: String,
    },

    /// Answer a single question from the command line
    Ask {
        /// Question to answer
        query: String,

        /// Skip the completion API and answer with the local analyzer
        #[arg(long)]
        local: bool,
    },

    /// Check environment, spreadsheet access, and the header schema
    Doctor {
        /// Write the report as JSON to this path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Start the HTTP analysis server
async fn start_server(addr: &str) -> Result<()> {
    debug!("Starting analysis server...");

    let settings = Settings::from_env();
    settings.validate()?;

    let socket_addr: SocketAddr = addr
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid address '{}': {}", addr, e))?;

    let orchestrator = Orchestrator::from_settings(&settings)?;
    let server = ApiServer::new(ApiServerConfig { addr: socket_addr }, Arc::new(orchestrator));

    println!();
    println!("🔎 Ratinglens API Server");
    println!();
    println!("   Address: http://{}", socket_addr);
    println!();
    println!("   Endpoints:");
    println!("   • POST /analyze - Answer a question about the ratings sheet");
    println!("   • GET  /health - Health check");
    println!();

    // Run server with graceful shutdown on signals
    tokio::select! {
        result = server.serve() => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received shutdown signal, stopping server gracefully...");
        }
    }

    Ok(())
}

/// Answer one question and print the result
async fn run_ask(query: &str, local: bool) -> Result<()> {
    let settings = Settings::from_env();
    settings.validate()?;

    if local {
        debug!("Answering with the local analyzer...");

        let client = GoogleSheetsClient::new(&settings.sheets)?;
        let source = SheetSource::new(Arc::new(client), settings.sheets.clone());
        let sheet = source.fetch().await?;
        let records = structure(&sheet)?;

        println!("{}", analyze_locally(query, &records));
        return Ok(());
    }

    let orchestrator = Orchestrator::from_settings(&settings)?;
    match orchestrator.analyze_query(query).await {
        AnalysisOutcome::Answer(answer) => {
            println!("{}", answer);
            Ok(())
        }
        AnalysisOutcome::Failed(message) => {
            eprintln!("✗ {}", message);
            std::process::exit(1);
        }
    }
}

/// Run diagnostics and print the report
async fn run_diagnostics(output: Option<PathBuf>) -> Result<()> {
    let settings = Settings::from_env();

    // Connectivity checks need a client; without credentials only the
    // environment is reported.
    let api: Option<Arc<dyn SheetsApi>> = match GoogleSheetsClient::new(&settings.sheets) {
        Ok(client) => Some(Arc::new(client)),
        Err(_) => None,
    };

    let report = doctor::run_doctor(&settings, api).await;
    print!("{}", report.render());

    if let Some(path) = output {
        report.save(&path)?;
        println!("Report written to {}", path.display());
    }

    if report.status == CheckStatus::Fail {
        std::process::exit(1);
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let level = match cli.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // Use the specified level for our crates, but WARN for noisy middleware
    let level_str = level.as_str().to_lowercase();
    let filter = EnvFilter::new(format!(
        "ratinglens={},ratinglens_core={},tower_http=warn",
        level_str, level_str
    ));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr) // Write logs to stderr, not stdout
        .init();

    debug!("Ratinglens v{} starting...", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Serve { addr } => start_server(&addr).await,
        Commands::Ask { query, local } => run_ask(&query, local).await,
        Commands::Doctor { output } => run_diagnostics(output).await,
    }
}
