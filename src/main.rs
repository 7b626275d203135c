mod env;
mod error;
mod llm;
mod locale;
mod routes;
mod services;
mod state;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::llm::VisionChat;
use crate::llm::types::LlmError;
use crate::services::capture::{self, CaptureError};
use crate::services::diagnosis::{self, DiagnosisConfig, DiagnosisError};

#[derive(Debug, thiserror::Error)]
enum MainError {
    #[error("failed to bind port {port}: {source}")]
    Bind { port: u16, source: std::io::Error },
    #[error("server failed: {0}")]
    Serve(std::io::Error),
    #[error("LLM client not configured: {0}")]
    Llm(#[from] LlmError),
    #[error(transparent)]
    Capture(#[from] CaptureError),
    #[error(transparent)]
    Diagnosis(#[from] DiagnosisError),
    #[error("invalid JSON output: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "krishi-seba", about = "Crop diagnosis service for farmers")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP API (default).
    Serve {
        #[arg(long, env = "PORT", default_value_t = 3000)]
        port: u16,
    },
    /// Diagnose one photo from disk and print the rendered result as JSON.
    Diagnose { path: PathBuf },
}

#[tokio::main]
async fn main() -> Result<(), MainError> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let diagnosis = DiagnosisConfig::from_env();
    match cli.command {
        Some(Command::Diagnose { path }) => run_diagnose(&path, diagnosis).await,
        Some(Command::Serve { port }) => run_serve(port, diagnosis).await,
        None => run_serve(env::env_parse("PORT", 3000), diagnosis).await,
    }
}

async fn run_serve(port: u16, diagnosis: DiagnosisConfig) -> Result<(), MainError> {
    // Initialize the diagnosis backend (non-fatal: analysis answers 503 if config missing).
    let llm: Option<Arc<dyn VisionChat>> = match llm::LlmClient::from_env() {
        Ok(client) => {
            tracing::info!(model = client.model(), "LLM client initialized");
            Some(Arc::new(client))
        }
        Err(e) => {
            tracing::warn!(error = %e, "LLM client not configured, crop diagnosis disabled");
            None
        }
    };
    tracing::info!(
        timeout_secs = diagnosis.timeout.as_secs(),
        mime_label = ?diagnosis.mime_label,
        max_image_bytes = capture::max_image_bytes(),
        "diagnosis configured"
    );

    let state = state::AppState::new(llm, diagnosis);
    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .map_err(|source| MainError::Bind { port, source })?;

    tracing::info!(%port, app = locale::APP_NAME, "krishi-seba listening");
    axum::serve(listener, app).await.map_err(MainError::Serve)
}

async fn run_diagnose(path: &std::path::Path, diagnosis: DiagnosisConfig) -> Result<(), MainError> {
    let llm: Arc<dyn VisionChat> = Arc::new(llm::LlmClient::from_env()?);
    let image = capture::encode_file(path, capture::max_image_bytes()).await?;
    let result = diagnosis::analyze(&llm, &diagnosis, &image).await?;
    println!("{}", serde_json::to_string_pretty(&services::render::render(&result))?);
    Ok(())
}
