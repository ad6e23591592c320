use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use statement_analyst::{
    chunk_document, read_statement, run_analysis, AnalysisError, AnalysisOptions, ChunkConfig,
    OllamaClient, OllamaConfig, RenderConfig, Stage1Config, Stage2Config, Stage3Config,
};

/// Characters of document text shown by `inspect`
const PREVIEW_CHARS: usize = 300;

#[derive(Parser)]
#[command(name = "statement-analyst")]
#[command(author, version, about = "Bank statement analysis with a local language model", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract, categorize and analyze the transactions of a statement PDF
    Analyze {
        /// Input statement (PDF)
        #[arg(short, long, default_value = "dummy_statement.pdf")]
        input: PathBuf,

        /// Output file for the PDF report
        #[arg(long, default_value = "financial_report.pdf")]
        pdf_output: PathBuf,

        /// Output file for the plain-text report
        #[arg(long, default_value = "financial_report.txt")]
        text_output: PathBuf,

        /// Base URL of the Ollama server
        #[arg(long, env = "OLLAMA_HOST", default_value = "http://localhost:11434")]
        ollama_url: String,

        /// Model used for every stage
        #[arg(long, env = "STATEMENT_ANALYST_MODEL", default_value = "llama3.2")]
        model: String,

        /// Sampling temperature (0-2)
        #[arg(long, default_value = "0.1")]
        temperature: f64,

        /// Seconds to wait for the connectivity probe
        #[arg(long, default_value = "5")]
        probe_timeout_secs: u64,

        /// Seconds to wait for each inference request (default: no limit)
        #[arg(long)]
        request_timeout_secs: Option<u64>,

        /// Maximum characters of statement text per extraction prompt
        #[arg(long, default_value = "2000")]
        chunk_chars: usize,

        /// Refuse documents that need more chunks than this
        #[arg(long, default_value = "16")]
        max_chunks: usize,

        /// Retries per prompt after a failed or malformed answer
        #[arg(long, default_value = "1")]
        max_retries: u32,

        /// Language the report is written in
        #[arg(long, default_value = "French")]
        language: String,

        /// Title printed at the top of the PDF report
        #[arg(long, default_value = "FINANCIAL ANALYSIS REPORT")]
        title: String,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Read a statement and report what would be sent, without contacting the model
    Inspect {
        /// Input statement (PDF)
        #[arg(short, long, default_value = "dummy_statement.pdf")]
        input: PathBuf,

        /// Maximum characters per chunk
        #[arg(long, default_value = "2000")]
        chunk_chars: usize,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Analyze {
            input,
            pdf_output,
            text_output,
            ollama_url,
            model,
            temperature,
            probe_timeout_secs,
            request_timeout_secs,
            chunk_chars,
            max_chunks,
            max_retries,
            language,
            title,
            verbose,
        } => {
            setup_logging(verbose);
            let backend = OllamaConfig {
                base_url: ollama_url,
                model,
                temperature,
                probe_timeout: Duration::from_secs(probe_timeout_secs),
                request_timeout: request_timeout_secs.map(Duration::from_secs),
            };
            let options = AnalysisOptions {
                input,
                pdf_output,
                text_output,
                chunking: ChunkConfig {
                    max_chunk_chars: chunk_chars,
                    max_chunks,
                },
                extraction: Stage1Config { max_retries },
                categorization: Stage2Config { max_retries },
                analysis: Stage3Config {
                    language,
                    max_retries,
                },
                render: RenderConfig {
                    title,
                    ..Default::default()
                },
            };
            analyze_statement(backend, options).await
        }
        Commands::Inspect {
            input,
            chunk_chars,
            verbose,
        } => {
            setup_logging(verbose);
            inspect_statement(input, chunk_chars)
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            let code = e
                .downcast_ref::<AnalysisError>()
                .map(AnalysisError::exit_code)
                .unwrap_or(1);
            ExitCode::from(code)
        }
    }
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_lowercase()));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();
}

async fn analyze_statement(backend: OllamaConfig, options: AnalysisOptions) -> Result<()> {
    backend.validate()?;
    info!(
        "Using model {} at {} (temperature {})",
        backend.model, backend.base_url, backend.temperature
    );
    let client = OllamaClient::new(backend).context("Failed to build HTTP client")?;

    let outcome = run_analysis(&client, &options).await?;

    println!("\n{}", "=".repeat(50));
    println!("FINAL REPORT");
    println!("{}", "=".repeat(50));
    println!("{}", outcome.report);
    println!("{}", "=".repeat(50));

    info!(
        "Complete: {} pages, {} chunks, {} transactions ({} category disagreements)",
        outcome.pages_read, outcome.chunks, outcome.transactions, outcome.category_disagreements
    );
    if let Some(path) = &outcome.render.pdf_path {
        info!(
            "PDF report written to {:?} ({} paragraphs, {} pages)",
            path, outcome.render.paragraphs, outcome.render.pages
        );
    }
    if let Some(path) = &outcome.render.text_path {
        info!("Text report written to {:?}", path);
    }

    Ok(())
}

fn inspect_statement(input: PathBuf, chunk_chars: usize) -> Result<()> {
    info!("Inspecting statement {:?}", input);
    let document = read_statement(&input)?;
    let config = ChunkConfig {
        max_chunk_chars: chunk_chars,
        max_chunks: usize::MAX,
    };
    let chunks = chunk_document(&document, &config)?;

    println!("Statement Inspection");
    println!("====================");
    println!("File: {}", document.source().display());
    println!("Pages: {}", document.page_count());
    println!("Characters: {}", document.char_count());
    println!(
        "Chunks at {} chars: {} ({} with text)",
        chunk_chars,
        chunks.total_chunks(),
        chunks.extractable_count()
    );
    if chunks.total_chunks() > ChunkConfig::default().max_chunks {
        println!(
            "Warning: exceeds the default limit of {} chunks; raise --max-chunks to analyze",
            ChunkConfig::default().max_chunks
        );
    }
    println!();
    println!("Preview");
    println!("-------");
    println!("{}...", document.preview(PREVIEW_CHARS));

    Ok(())
}
