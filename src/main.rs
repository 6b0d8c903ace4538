use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

use candidate_intake::config::Config;
use candidate_intake::logging;
use candidate_intake::pipeline::export::ExportWriter;
use candidate_intake::pipeline::storage::{CandidateStore, SqliteCandidateStore};
use candidate_intake::pipeline::UploadPipeline;
use candidate_intake::types::CandidateFilter;
use candidate_intake::web::{self, AppState};

#[derive(Parser)]
#[command(name = "candidate_intake")]
#[command(about = "Import lead-generation candidate CSVs and report on them")]
#[command(version)]
struct Cli {
    /// Path to a config file (defaults to ./config.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the upload form and report web server
    Serve {
        /// Port to listen on (overrides config and PORT)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Import a CSV file from disk
    Import {
        /// CSV file to import
        file: PathBuf,
        /// Source layout: direct or derived
        #[arg(long)]
        schema: Option<String>,
        /// Print the upload summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print stored candidates, optionally filtered by substring
    Report(ReportArgs),
}

#[derive(Args)]
struct ReportArgs {
    #[arg(long)]
    first_name: Option<String>,
    #[arg(long)]
    last_name: Option<String>,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    phone: Option<String>,
    #[arg(long)]
    job_title: Option<String>,
    #[arg(long)]
    company_name: Option<String>,
    #[arg(long)]
    country: Option<String>,
}

impl From<ReportArgs> for CandidateFilter {
    fn from(args: ReportArgs) -> Self {
        CandidateFilter {
            first_name: args.first_name,
            last_name: args.last_name,
            email: args.email,
            phone: args.phone,
            job_title: args.job_title,
            company_name: args.company_name,
            country: args.country,
        }
    }
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<Config> {
    let config = match path {
        Some(path) => Config::load_from(path)?.with_env_overrides()?,
        None => Config::load()?,
    };
    Ok(config)
}

fn build_pipeline(config: &Config) -> anyhow::Result<UploadPipeline> {
    let store = SqliteCandidateStore::open(&config.storage.database_path).with_context(|| {
        format!(
            "opening candidate store at {}",
            config.storage.database_path.display()
        )
    })?;
    let store: Arc<dyn CandidateStore> = Arc::new(store);
    Ok(UploadPipeline::new(store, ExportWriter::new(&config.export.output_dir)))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref())?;

    logging::init_logging(&config.logging.dir);

    match cli.command {
        Commands::Serve { port } => {
            candidate_intake::metrics::init_metrics(&config.metrics);
            let pipeline = build_pipeline(&config)?;
            let state = AppState::new(
                pipeline,
                config.import.default_schema.clone(),
                config.server.max_upload_bytes,
            );
            let port = port.unwrap_or(config.server.port);
            web::serve(state, &config.server.host, port).await?;
        }
        Commands::Import { file, schema, json } => {
            let pipeline = build_pipeline(&config)?;
            let bytes = std::fs::read(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            let file_name = file
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            let schema = schema.unwrap_or_else(|| config.import.default_schema.clone());

            match pipeline.process_upload(&file_name, &bytes, &schema).await {
                Ok(summary) => {
                    if json {
                        println!("{}", serde_json::to_string_pretty(&summary)?);
                    } else {
                        println!("File uploaded and processed successfully.");
                        println!("   Rows read: {}", summary.total_rows);
                        println!("   Saved: {}", summary.valid_rows);
                        println!("   Missing required fields: {}", summary.missing_rows);
                        println!("   Dropped (no email or phone): {}", summary.dropped_rows);
                        println!("   Ready export: {}", summary.ready_path.display());
                        println!("   Missing export: {}", summary.missing_path.display());
                    }
                    info!("Import of {} finished", file.display());
                }
                Err(e) => {
                    error!("Import failed: {}", e);
                    anyhow::bail!(e.user_message());
                }
            }
        }
        Commands::Report(args) => {
            let pipeline = build_pipeline(&config)?;
            let filter = CandidateFilter::from(args);
            let candidates = pipeline.store().query(&filter).await?;
            for candidate in &candidates {
                let r = &candidate.record;
                println!(
                    "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
                    candidate.id,
                    r.first_name,
                    r.last_name,
                    r.email,
                    r.phone,
                    r.job_title,
                    r.company_name,
                    r.country
                );
            }
            println!("{} candidates", candidates.len());
        }
    }
    Ok(())
}
