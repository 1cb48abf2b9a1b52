use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use common::{AppConfig, LogFormat, PlacementStatus};
use placement_client::{ApiClient, SessionContext};
use roster::SortKey;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Debug, Parser)]
#[command(name = "placement")]
#[command(about = "Placement cell console: students, batches, companies and position documents")]
struct Cli {
    #[arg(long, global = true, default_value = "placement.toml")]
    config: PathBuf,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Login {
        #[arg(long)]
        email: String,
        /// Falls back to PLACEMENT_PASSWORD.
        #[arg(long)]
        password: Option<String>,
    },
    Logout,
    Whoami,
    Batches {
        #[command(subcommand)]
        command: BatchCommands,
    },
    Students {
        #[command(subcommand)]
        command: StudentCommands,
    },
    Companies {
        #[command(subcommand)]
        command: CatalogCommands,
    },
    Offers {
        #[command(subcommand)]
        command: CatalogCommands,
    },
    Documents {
        #[command(subcommand)]
        command: DocumentCommands,
    },
    Schemas,
}

#[derive(Debug, Subcommand)]
enum BatchCommands {
    List,
    Select { year: i32 },
    Current,
}

#[derive(Debug, Subcommand)]
enum CatalogCommands {
    List {
        #[arg(long)]
        batch: Option<i32>,
    },
}

#[derive(Debug, Clone, Args)]
struct RosterArgs {
    #[arg(long)]
    batch: Option<i32>,
    /// Saved roster JSON; skips the network.
    #[arg(long)]
    input: Option<PathBuf>,
    #[arg(long)]
    search: Option<String>,
    #[arg(long)]
    department: Option<String>,
    #[arg(long)]
    status: Option<PlacementStatus>,
    #[arg(long)]
    min_cgpa: Option<f64>,
    #[arg(long, default_value = "name")]
    sort: SortKey,
    #[arg(long)]
    desc: bool,
}

#[derive(Debug, Subcommand)]
enum StudentCommands {
    List(RosterArgs),
    Stats(RosterArgs),
    Export {
        #[command(flatten)]
        roster: RosterArgs,
        #[arg(
            long,
            default_value = "name,roll_number,email,department,cgpa,placement_status,company_name,package_lpa"
        )]
        columns: String,
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[derive(Debug, Subcommand)]
enum DocumentCommands {
    /// Reconciles two local document lists without touching the backend.
    Plan {
        #[arg(long)]
        existing: PathBuf,
        /// JSON list or TOML manifest.
        #[arg(long)]
        local: PathBuf,
    },
    Sync {
        /// `ID=manifest.toml`; repeat for several positions.
        #[arg(long = "position", required = true, value_parser = parse_position_manifest)]
        positions: Vec<(i64, PathBuf)>,
        #[arg(long)]
        batch: Option<i32>,
    },
    Upload {
        #[arg(long = "position", required = true, value_parser = parse_position_manifest)]
        positions: Vec<(i64, PathBuf)>,
        #[arg(long)]
        batch: Option<i32>,
    },
}

fn parse_position_manifest(raw: &str) -> Result<(i64, PathBuf), String> {
    let (id, manifest) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected ID=manifest, got `{raw}`"))?;
    let id = id
        .trim()
        .parse::<i64>()
        .map_err(|err| format!("invalid position id `{id}`: {err}"))?;
    let manifest = manifest.trim();
    if manifest.is_empty() {
        return Err(format!("position {id} has no manifest path"));
    }
    Ok((id, PathBuf::from(manifest)))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cwd = std::env::current_dir().context("failed to resolve current directory")?;
    let config = AppConfig::load(&cwd.join(&cli.config))?;
    init_tracing(config.log_format);
    let mut ctx = SessionContext::load(config, cwd);

    match cli.command {
        Commands::Login { email, password } => {
            commands::account::login(&mut ctx, &email, password).await
        }
        Commands::Logout => commands::account::logout(&mut ctx),
        Commands::Whoami => commands::account::whoami(&ctx),
        Commands::Batches { command } => match command {
            BatchCommands::List => commands::account::list_batches(&ctx).await,
            BatchCommands::Select { year } => commands::account::select_batch(&mut ctx, year),
            BatchCommands::Current => commands::account::current_batch(&ctx).await,
        },
        Commands::Students { command } => match command {
            StudentCommands::List(args) => commands::students::list(&ctx, &args).await,
            StudentCommands::Stats(args) => commands::students::stats(&ctx, &args).await,
            StudentCommands::Export {
                roster,
                columns,
                output,
            } => commands::students::export(&ctx, &roster, &columns, output.as_deref()).await,
        },
        Commands::Companies {
            command: CatalogCommands::List { batch },
        } => commands::catalog::list_companies(&ctx, batch).await,
        Commands::Offers {
            command: CatalogCommands::List { batch },
        } => commands::catalog::list_offers(&ctx, batch).await,
        Commands::Documents { command } => match command {
            DocumentCommands::Plan { existing, local } => {
                commands::position_documents::plan(&existing, &local)
            }
            DocumentCommands::Sync { positions, batch } => {
                commands::position_documents::sync(&ctx, &positions, batch).await
            }
            DocumentCommands::Upload { positions, batch } => {
                commands::position_documents::upload(&ctx, &positions, batch).await
            }
        },
        Commands::Schemas => {
            println!(
                "{}",
                serde_json::to_string_pretty(&common::schema_bundle())?
            );
            Ok(())
        }
    }
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}

/// Explicit year, else the persisted selection if still offered, else the
/// latest batch.
async fn resolve_batch_year(
    ctx: &SessionContext,
    client: &ApiClient,
    explicit: Option<i32>,
) -> anyhow::Result<i32> {
    if let Some(year) = explicit {
        return Ok(year);
    }
    let batches = client.list_batches().await?;
    ctx.resolve_batch(&batches)
        .context("no batches available; pass --batch or create a batch first")
}
