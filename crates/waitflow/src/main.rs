mod commands;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "waitflow")]
#[command(about = "Declarative Cloudflare waiting room events", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a waiting room event resource block
    Render {
        /// Event name
        #[arg(long)]
        name: String,
        /// Zone the waiting room belongs to
        #[arg(long, env = "CLOUDFLARE_ZONE_ID")]
        zone_id: String,
        /// Waiting room the event is attached to
        #[arg(long)]
        waiting_room_id: String,
        /// Local name of the resource block
        #[arg(long, default_value = "main")]
        resource_name: String,
        /// Event start (RFC3339, defaults to now)
        #[arg(long)]
        start: Option<DateTime<Utc>>,
        /// Event length in minutes
        #[arg(long, default_value = "5")]
        duration_minutes: i64,
    },
    /// Apply a configuration file
    Apply {
        /// Configuration file (HCL)
        config: PathBuf,
        /// Directory holding `.waitflow/state.json`
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,
    },
    /// Destroy every recorded resource
    Destroy {
        /// Directory holding `.waitflow/state.json`
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,
    },
    /// Verify that recorded waiting room events no longer exist
    #[command(name = "check-destroy")]
    CheckDestroy {
        /// Directory holding `.waitflow/state.json`
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,
    },
    /// Record an existing waiting room event in state
    Import {
        /// Resource address (`cloudflare_waiting_room_event.<name>`)
        address: String,
        /// `<zone_id>/<waiting_room_id>/<event_id>`
        id: String,
        /// Directory holding `.waitflow/state.json`
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // stdout carries rendered configuration, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Render {
            name,
            zone_id,
            waiting_room_id,
            resource_name,
            start,
            duration_minutes,
        } => {
            commands::render::handle(
                &resource_name,
                &name,
                &zone_id,
                &waiting_room_id,
                start,
                duration_minutes,
            )?;
        }
        Commands::Apply { config, dir } => {
            commands::apply::handle(&config, &dir).await?;
        }
        Commands::Destroy { dir } => {
            commands::destroy::handle(&dir).await?;
        }
        Commands::CheckDestroy { dir } => {
            commands::check_destroy::handle(&dir).await?;
        }
        Commands::Import { address, id, dir } => {
            commands::import::handle(&address, &id, &dir).await?;
        }
    }

    Ok(())
}
