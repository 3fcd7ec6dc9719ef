//! PaperLens: structured information extraction from research-paper PDFs.

use std::sync::Arc;

use paperlens_core::PaperLensConfig;
use paperlens_llm::{HttpModel, LLMConfig, LanguageModel};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod cli;
mod error;
mod routes;
mod state;

use state::AppState;

fn print_help() {
    println!("PaperLens: structured extraction from research papers");
    println!();
    println!("Usage: paperlens [command]");
    println!();
    println!("Commands:");
    println!("  (none)                                     Start the server");
    println!("  extract <file-or-url> [--title T] [--out DIR]");
    println!("                                             Extract one paper and write");
    println!("                                             paper_extraction.json and paper_summary.txt");
    println!("  help                                       Show this help message");
    println!();
    println!("Environment:");
    println!("  GOOGLE_API_KEY / OPENAI_API_KEY / ANTHROPIC_API_KEY / GROQ_API_KEY");
    println!("  PAPERLENS_PROVIDER (auto), PAPERLENS_MODEL, PAPERLENS_MAX_CHARS (12000),");
    println!("  PAPERLENS_MAX_PAGES (5), PORT (8080), RUST_LOG (info)");
}

/// Resolve the provider and build the model; a missing credential is fatal.
fn build_model(llm_config: &LLMConfig) -> anyhow::Result<Arc<dyn LanguageModel>> {
    let resolved = llm_config.require_provider()?;
    Ok(Arc::new(HttpModel::new(resolved, llm_config)?))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();

    // Handle CLI subcommands
    if args.len() > 1 {
        match args[1].as_str() {
            "extract" => {
                let extract_args = match cli::ExtractArgs::parse(&args[2..]) {
                    Ok(a) => a,
                    Err(msg) => {
                        eprintln!("{}", msg);
                        eprintln!("Usage: paperlens extract <file-or-url> [--title <hint>] [--out <dir>]");
                        std::process::exit(1);
                    }
                };
                let config = PaperLensConfig::from_env()?;
                let llm_config = LLMConfig::from_env();
                let model = build_model(&llm_config)?;
                return cli::run_extract(extract_args, &config, model).await;
            }
            "--help" | "-h" | "help" => {
                print_help();
                return Ok(());
            }
            _ => {
                eprintln!("Unknown command: {}. Use 'paperlens help' for usage.", args[1]);
                std::process::exit(1);
            }
        }
    }

    // Normal server startup
    let config = PaperLensConfig::from_env()?;
    let llm_config = LLMConfig::from_env();
    let model = build_model(&llm_config)?;
    let port = config.port;

    let state = Arc::new(AppState::new(config, llm_config, model)?);
    let app = routes::build_router(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("PaperLens server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
