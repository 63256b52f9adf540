//! Stormlead maintenance tool: backups, retention, image housekeeping and storage
//! usage for a lead server's working tree.
//!
//! Reads the same environment (and `.env`) as the server.

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use stormlead_cli::{build_service, init_tracing};
use stormlead_core::Config;

#[derive(Parser)]
#[command(name = "stormlead-maintenance", about = "Stormlead file maintenance")]
struct Cli {
    /// Defaults to a full maintenance run
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Copy the lead file into the backups directory
    Backup,
    /// Delete old backups, then old maintenance logs
    Cleanup {
        /// Override MAX_BACKUP_AGE_DAYS
        #[arg(long)]
        backup_days: Option<u32>,
        /// Override MAX_LOG_AGE_DAYS
        #[arg(long)]
        log_days: Option<u32>,
    },
    /// Move uploaded images into the images directory
    Organize,
    /// Resize and re-encode images into images/optimized
    Optimize,
    /// Print disk usage of the managed directories
    Stats,
    /// Run every step in order
    Maintenance,
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize output")?;
    println!("{}", out);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("Failed to load configuration")?;
    init_tracing(&config.logging.level);

    let cli = Cli::parse();
    let service = build_service(&config)?;

    match cli.command.unwrap_or(Commands::Maintenance) {
        Commands::Backup => {
            service.ensure_directories().await;
            let path = service
                .backup_leads()
                .await
                .context("No backup was created")?;
            println!("{}", path.display());
        }
        Commands::Cleanup {
            backup_days,
            log_days,
        } => {
            let settings = service.settings();
            let backups = service
                .cleanup_old_backups(backup_days.unwrap_or(settings.max_backup_age_days))
                .await;
            let logs = service
                .cleanup_old_logs(log_days.unwrap_or(settings.max_log_age_days))
                .await;
            print_json(&serde_json::json!({ "backupsRemoved": backups, "logsRemoved": logs }))?;
        }
        Commands::Organize => {
            service.ensure_directories().await;
            let moved = service.organize_images().await;
            print_json(&serde_json::json!({ "imagesOrganized": moved }))?;
        }
        Commands::Optimize => {
            let optimized = service.optimize_images().await;
            print_json(&serde_json::json!({ "imagesOptimized": optimized }))?;
        }
        Commands::Stats => {
            let stats = service
                .get_storage_stats()
                .await
                .context("Failed to compute storage usage")?;
            print_json(&stats)?;
        }
        Commands::Maintenance => {
            let report = service.run_maintenance().await;
            print_json(&report)?;
        }
    }

    Ok(())
}
