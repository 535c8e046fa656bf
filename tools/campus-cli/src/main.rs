//! Campus CLI - command line front-end for the campus services API.
//!
//! Commands:
//! - `campus whoami` - Sign in and show the current user
//! - `campus events` - List, show, react to and delete events
//! - `campus complaints` - List complaints and update their status
//! - `campus lost-found` - Browse lost-and-found reports
//! - `campus placements` - List placement drives and registrations
//! - `campus notifications` - Read complaint notifications
//! - `campus config` - Manage configuration

mod commands;
mod context;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{
    ComplaintsArgs, ConfigArgs, EventsArgs, LostFoundArgs, NotificationsArgs, PlacementsArgs,
};

/// Campus CLI - query and manage campus services
#[derive(Parser)]
#[command(name = "campus")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use JSON output format
    #[arg(long, global = true)]
    json: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// API base URL (overrides config)
    #[arg(long, global = true)]
    url: Option<String>,

    /// Username to sign in with (default: $CAMPUS_USERNAME)
    #[arg(short, long, global = true)]
    username: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and show the current user
    #[command(alias = "login-check")]
    Whoami,

    /// Campus events
    Events(EventsArgs),

    /// Complaints
    Complaints(ComplaintsArgs),

    /// Lost-and-found reports
    LostFound(LostFoundArgs),

    /// Placement drives
    Placements(PlacementsArgs),

    /// Complaint notifications
    Notifications(NotificationsArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    // Setup output formatting
    let output = output::Output::new(cli.verbose, cli.json);

    let options = context::LoadOptions {
        config_path: cli.config.as_deref(),
        base_url: cli.url.as_deref(),
        username: cli.username.clone(),
    };
    let ctx = context::Context::load(options, output)?;

    let result = match cli.command {
        Commands::Whoami => commands::auth::whoami(&ctx).await,
        Commands::Events(args) => commands::events::run(args, &ctx).await,
        Commands::Complaints(args) => commands::complaints::run(args, &ctx).await,
        Commands::LostFound(args) => commands::lost_found::run(args, &ctx).await,
        Commands::Placements(args) => commands::placements::run(args, &ctx).await,
        Commands::Notifications(args) => commands::notifications::run(args, &ctx).await,
        Commands::Config(args) => commands::config::run(args, &ctx).await,
    };

    if let Err(e) = result {
        ctx.output.error(&format!("{:#}", e));
        std::process::exit(1);
    }

    Ok(())
}
