use clap::Parser;
use database::{provisioning::OutboxProvisioner, services::import::ImportService};
use log::{error, info};
use models::import_data::ImportMode;
use std::{path::PathBuf, process::ExitCode};

/// Import disciplines, sections and rosters from a JSON file
#[derive(Debug, Parser)]
#[command(name = "import-sections", version, about)]
struct Args {
    /// JSON array of section records
    #[arg(short, long)]
    file: PathBuf,

    /// `create-missing` or `attach-to-existing`
    #[arg(short, long, default_value = "create-missing")]
    mode: ImportMode,

    #[arg(long, env = "DATABASE_URL")]
    database_url: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    env_logger::init();

    let args = Args::parse();
    match run(args).await {
        Ok(true) => ExitCode::SUCCESS,
        // Some records failed; the report says which
        Ok(false) => ExitCode::from(2),
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<bool, Box<dyn std::error::Error>> {
    let payload = tokio::fs::read(&args.file).await?;
    let db = database::db::connect(&args.database_url).await?;
    let provisioner = OutboxProvisioner::from_env();

    info!("Importing {} in {:?} mode", args.file.display(), args.mode);
    let report = ImportService::import_sections(&db, &payload, args.mode, &provisioner).await?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(report.error_list().is_empty())
}
