use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use instadash_core::ClientConfig;

mod client;
mod logging;
mod preview;
mod session;

use client::ApiClient;
use session::{Outcome, Session};

#[derive(Parser)]
#[command(name = "instadash")]
#[command(about = "Turn JSON data and a plain-language instruction into a dashboard preview")]
struct Cli {
    /// Backend base URL (defaults to INSTADASH_API_URL, then http://localhost:3000)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a dashboard and write a sandboxed preview page
    Generate {
        /// File with the JSON data, or "-" for stdin
        #[arg(short, long)]
        json: String,
        /// What the dashboard should show
        #[arg(short, long)]
        prompt: String,
        /// Where to write the preview page
        #[arg(short, long, default_value = "dashboard-preview.html")]
        out: PathBuf,
        /// Open the preview in the default browser
        #[arg(long)]
        open: bool,
    },
    /// Write the empty preview page
    Placeholder {
        #[arg(short, long, default_value = "dashboard-preview.html")]
        out: PathBuf,
    },
    /// Check that the backend is up
    Health,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let base_url = cli
        .api_url
        .unwrap_or_else(|| ClientConfig::from_env().api_base_url);

    match cli.command {
        Commands::Generate { json, prompt, out, open } => {
            let json_text = read_json_text(&json)?;
            let session = Session::new(ApiClient::new(&base_url));
            generate(&session, &json_text, &prompt, &out, open).await
        }
        Commands::Placeholder { out } => {
            preview::write_preview(&out, &preview::render_preview(None))?;
            println!("Wrote empty preview to {}", out.display());
            Ok(ExitCode::SUCCESS)
        }
        Commands::Health => {
            let body = ApiClient::new(&base_url).health().await?;
            println!("{}", serde_json::to_string_pretty(&body)?);
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn generate(
    session: &Session,
    json_text: &str,
    prompt: &str,
    out: &Path,
    open: bool,
) -> Result<ExitCode> {
    match session.trigger(json_text, prompt).await {
        Outcome::Rendered => {
            let page = preview::render_preview(session.html().as_deref());
            preview::write_preview(out, &page)
                .with_context(|| format!("Failed to write preview to {}", out.display()))?;
            println!("Wrote dashboard preview to {}", out.display());

            if open {
                if let Err(e) = preview::open_preview(out) {
                    tracing::warn!("Could not open browser: {}", e);
                }
            }
            Ok(ExitCode::SUCCESS)
        }
        Outcome::Rejected(_) | Outcome::Failed(_) => {
            if let Some(message) = session.error() {
                eprintln!("Error: {}", message);
            }
            Ok(ExitCode::FAILURE)
        }
        Outcome::Busy => {
            eprintln!("A dashboard is already being generated");
            Ok(ExitCode::FAILURE)
        }
    }
}

fn read_json_text(source: &str) -> Result<String> {
    if source == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read JSON from stdin")?;
        return Ok(text);
    }
    std::fs::read_to_string(source).with_context(|| format!("Failed to read {}", source))
}
