//! The `scrape-extract` binary.

use anyhow::Context;
use clap::{Parser, Subcommand};
use scrape_extract::extraction::ExtractionConfig;
use scrape_extract_cli::{output, run_clean, run_extraction, AzureTransport, RunConfig};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract a record from a scraped HTML file
    Run {
        /// Scraped HTML input
        #[arg(long)]
        input: PathBuf,
        /// File containing the system prompt
        #[arg(long)]
        system_prompt: PathBuf,
        /// JSON Schema file describing the record
        #[arg(long)]
        schema: PathBuf,
        /// Correlation id (defaults to the input file name)
        #[arg(long)]
        id: Option<String>,
        /// Where sanitized inputs are saved
        #[arg(long, default_value = "intermediate")]
        intermediate_dir: PathBuf,
        /// CSV output path
        #[arg(long, default_value = "output.csv")]
        output: PathBuf,
        /// Sampling temperature
        #[arg(long, default_value_t = 0.2)]
        temperature: f32,
        /// Attempts allowed when the model times out
        #[arg(long, default_value_t = 3, env = "SCRAPE_EXTRACT_MAX_RETRIES")]
        max_retries: usize,
        /// Also validate replies against the schema locally
        #[arg(long)]
        validate: bool,
    },
    /// Print the sanitized text of an HTML file
    Clean {
        /// HTML input
        #[arg(long)]
        input: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Run {
            input,
            system_prompt,
            schema,
            id,
            intermediate_dir,
            output: csv_path,
            temperature,
            max_retries,
            validate,
        } => {
            let transport = AzureTransport::from_env()
                .context("Azure OpenAI is not configured")?
                .with_local_validation(validate);
            let config = RunConfig {
                input,
                system_prompt,
                schema,
                id,
                intermediate_dir,
                output: Some(csv_path),
                extraction: ExtractionConfig::default()
                    .with_temperature(temperature)
                    .with_max_retries(max_retries),
            };

            let record = run_extraction(&config, transport).await?;
            println!("{}", output::pretty(&record)?);
        }
        Commands::Clean { input } => {
            println!("{}", run_clean(&input)?);
        }
    }

    Ok(())
}
