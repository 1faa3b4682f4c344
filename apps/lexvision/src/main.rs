mod config;
mod controller;
mod display;
mod download;

use std::{path::PathBuf, sync::Arc};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    AnalysisClient, AskOutcome, Document, ExportOutcome, HttpTransport, SubmitOutcome,
    WhatIfResponse,
};
use shared::domain::{AnalysisMode, DetailLevel};
use tracing_subscriber::EnvFilter;

use config::{load_settings, Settings, DEFAULT_CONFIG_FILE};
use controller::events::UiError;
use download::DownloadDirSink;

#[derive(Parser, Debug)]
#[command(name = "lexvision", about = "Summarize and compare legal documents")]
struct Args {
    /// Flat TOML file with server_url, download_dir, export_file_name, language, detail_level
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,
    #[arg(long, global = true)]
    server_url: Option<String>,
    #[arg(long, global = true)]
    download_dir: Option<PathBuf>,
    /// Print results as JSON instead of text
    #[arg(long, global = true)]
    json: bool,
    /// -v for info, -vv for debug (RUST_LOG wins when set)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Upload one document for a summary, or two for a comparison
    Analyze {
        #[arg(long, default_value_t = AnalysisMode::Summarize)]
        mode: AnalysisMode,
        #[arg(long)]
        file1: Option<PathBuf>,
        #[arg(long)]
        file2: Option<PathBuf>,
        #[arg(long)]
        language: Option<String>,
        #[arg(long)]
        detail: Option<DetailLevel>,
    },
    /// Ask a hypothetical question about the last analyzed document
    WhatIf {
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },
    /// Download the PDF report of the service's most recent analysis
    Export,
    /// Interactive prompt with background requests
    Session,
}

fn init_tracing(verbose: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(match verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        })
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let mut settings = load_settings(&args.config);
    if let Some(url) = args.server_url {
        settings.server_url = url;
    }
    if let Some(dir) = args.download_dir {
        settings.download_dir = dir;
    }
    tracing::debug!(?settings, "resolved settings");

    let transport = HttpTransport::new(&settings.server_url)
        .with_context(|| format!("invalid server url '{}'", settings.server_url))?;
    let client = AnalysisClient::new(
        Arc::new(transport),
        Arc::new(DownloadDirSink::new(&settings.download_dir)),
        settings.export_file_name.clone(),
    );

    match args.command {
        Command::Analyze {
            mode,
            file1,
            file2,
            language,
            detail,
        } => {
            let request = AnalyzeArgs {
                mode,
                file1,
                file2,
                language,
                detail,
            };
            analyze(&client, &settings, request, args.json).await
        }
        Command::WhatIf { query } => what_if(&client, &query.join(" "), args.json).await,
        Command::Export => export(&client, args.json).await,
        Command::Session => {
            client.upload.set_language(&settings.language).await;
            client.upload.set_detail_level(settings.detail_level).await;
            controller::run_session(client).await
        }
    }
}

struct AnalyzeArgs {
    mode: AnalysisMode,
    file1: Option<PathBuf>,
    file2: Option<PathBuf>,
    language: Option<String>,
    detail: Option<DetailLevel>,
}

async fn analyze(
    client: &AnalysisClient<HttpTransport>,
    settings: &Settings,
    request: AnalyzeArgs,
    json: bool,
) -> Result<()> {
    let upload = &client.upload;
    upload.select_mode(request.mode).await;
    upload
        .set_language(request.language.as_deref().unwrap_or(&settings.language))
        .await;
    upload
        .set_detail_level(request.detail.unwrap_or(settings.detail_level))
        .await;
    if let Some(path) = &request.file1 {
        upload.select_primary(Document::load(path).await?).await;
    }
    if let Some(path) = &request.file2 {
        upload.select_secondary(Document::load(path).await?).await;
    }

    match upload.submit().await {
        Ok(SubmitOutcome::Published(view)) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&view)?);
            } else {
                print!("{}", display::render_view(&view));
            }
            Ok(())
        }
        Ok(SubmitOutcome::Busy) => Err(anyhow!("an analysis is already running")),
        Err(err) => {
            let ui = UiError::from_analysis_error(&err);
            Err(anyhow!(display::render_error(&ui)))
        }
    }
}

async fn what_if(client: &AnalysisClient<HttpTransport>, query: &str, json: bool) -> Result<()> {
    let exchange = match client.what_if.ask(query).await? {
        AskOutcome::Answered(exchange) => exchange,
        AskOutcome::Busy => return Err(anyhow!("a what-if question is already pending")),
    };

    if json {
        let body = match &exchange.response {
            WhatIfResponse::Answer(answer) => {
                serde_json::json!({ "query": exchange.query, "response": answer })
            }
            WhatIfResponse::Failed(reason) => {
                serde_json::json!({ "query": exchange.query, "error": reason })
            }
        };
        println!("{}", serde_json::to_string_pretty(&body)?);
    } else {
        println!("{}", display::render_exchange(&exchange));
    }

    match exchange.response {
        WhatIfResponse::Answer(_) => Ok(()),
        WhatIfResponse::Failed(reason) => Err(anyhow!("what-if failed: {reason}")),
    }
}

async fn export(client: &AnalysisClient<HttpTransport>, json: bool) -> Result<()> {
    match client.export.export_current_result().await {
        Ok(ExportOutcome::Saved(path)) => {
            if json {
                println!("{}", serde_json::json!({ "saved": path }));
            } else {
                println!("report saved to {}", path.display());
            }
            Ok(())
        }
        Ok(ExportOutcome::Busy) => Err(anyhow!("an export is already downloading")),
        Err(err) => {
            let ui = UiError::from_export_error(&err);
            Err(anyhow!(display::render_error(&ui)))
        }
    }
}
