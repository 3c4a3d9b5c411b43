//! Burg CLI - sign in to Burg Dashboard and inspect routing decisions.

mod commands;
mod output;

use clap::{Parser, Subcommand};

/// Burg CLI - manage your Burg Dashboard session.
#[derive(Parser)]
#[command(name = "burg")]
#[command(about = "Burg CLI for authentication and route checks")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format (text or json)
    #[arg(short, long, default_value = "text", global = true)]
    format: output::OutputFormat,

    /// Log level (trace, debug, info, warn, error). Defaults to the config value.
    #[arg(long, global = true, env = "BURG_LOG_LEVEL")]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Login with email and password
    Login,

    /// Logout and clear the stored session
    Logout,

    /// Check authentication status
    Status,

    /// Fetch the current user from the backend
    Whoami,

    /// Show where the route guard sends you for a path
    Route {
        /// App path, e.g. /checklist
        path: String,
    },

    /// Show where a scanned QR payload leads
    Scan {
        /// Scanned text
        text: String,
    },
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let ctx = commands::Context::load(cli.log_level.as_deref())?;
    let format = cli.format;

    let result = match cli.command {
        Commands::Login => commands::login(&ctx, &format).await,
        Commands::Logout => commands::logout(&ctx, &format).await,
        Commands::Status => commands::status(&ctx, &format).await,
        Commands::Whoami => commands::whoami(&ctx, &format).await,
        Commands::Route { path } => commands::route(&ctx, &path, &format).await,
        Commands::Scan { text } => commands::scan(&ctx, &text, &format).await,
    };

    ctx.store.close();
    result
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let format = cli.format;

    if let Err(e) = run(cli).await {
        output::print_error(&format!("{:#}", e), &format);
        std::process::exit(1);
    }
}
