use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(name = "donow")]
#[command(about = "DoNow - pomodoro timer, habit tracker and billable time reports")]
#[command(version)]
struct Cli {
    /// Path to the config file (defaults to ~/.donow/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the REST API server
    Serve {
        /// Port to listen on (overrides server.port)
        #[arg(short, long)]
        port: Option<u16>,

        /// Database file (overrides storage.db_path)
        #[arg(long)]
        db: Option<PathBuf>,
    },

    /// Write a default config file
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },

    /// Manage users and session tokens
    User {
        #[command(subcommand)]
        command: UserCommands,
    },

    /// Recompute the cached stats of every task
    Recalc {
        /// Database file (overrides storage.db_path)
        #[arg(long)]
        db: Option<PathBuf>,
    },

    /// Manage report views
    Views {
        #[command(subcommand)]
        command: ViewCommands,
    },
}

#[derive(Subcommand)]
enum UserCommands {
    /// Create a user and print a session token
    Add {
        #[arg(long)]
        email: String,

        /// Display name (defaults to the part of the email before '@')
        #[arg(long)]
        name: Option<String>,

        /// Database file (overrides storage.db_path)
        #[arg(long)]
        db: Option<PathBuf>,
    },

    /// Print a new session token for an existing user
    Token {
        #[arg(long)]
        email: String,

        /// Database file (overrides storage.db_path)
        #[arg(long)]
        db: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum ViewCommands {
    /// Delete and re-seed the built-in views
    Reset {
        /// Database file (overrides storage.db_path)
        #[arg(long)]
        db: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();

    let config_path = cli.config.as_deref();

    match cli.command {
        Some(Commands::Serve { port, db }) => {
            let config = cli::load_config(config_path, db)?;
            cli::serve::serve_command(config, port).await?;
        }
        Some(Commands::Init { force }) => {
            cli::init::init_command(cli.config.clone(), force)?;
        }
        Some(Commands::User { command }) => match command {
            UserCommands::Add { email, name, db } => {
                let config = cli::load_config(config_path, db)?;
                cli::user::add_command(&config, &email, name.as_deref())?;
            }
            UserCommands::Token { email, db } => {
                let config = cli::load_config(config_path, db)?;
                cli::user::token_command(&config, &email)?;
            }
        },
        Some(Commands::Recalc { db }) => {
            let config = cli::load_config(config_path, db)?;
            cli::maintenance::recalc_command(&config)?;
        }
        Some(Commands::Views { command }) => match command {
            ViewCommands::Reset { db } => {
                let config = cli::load_config(config_path, db)?;
                cli::maintenance::reset_views_command(&config)?;
            }
        },
        None => {
            // Default: run the server
            let config = cli::load_config(config_path, None)?;
            cli::serve::serve_command(config, None).await?;
        }
    }

    Ok(())
}
