//! Via Pública operator CLI
//!
//! Inspect the permission table, dry-run guarded routes against the
//! persisted session, and drive the demo account flows.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use viapublica_cli::commands::{self, access, account, matrix};
use viapublica_cli::CliConfig;

#[derive(Parser)]
#[command(name = "viapublica")]
#[command(about = "Via Pública - role-based access control tooling", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file path
    #[arg(short, long, global = true, default_value = "viapublica.toml")]
    config: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the role × capability table
    Matrix {
        #[arg(long, value_enum, default_value_t)]
        format: matrix::MatrixFormat,
    },

    /// Check one role/capability pair; exits non-zero when denied
    Check {
        /// Role id (standard_user, space_client, administrator)
        role: String,
        /// Capability name (e.g. publish-billboards or canPublishBillboards)
        capability: String,
    },

    /// Open a path as the current session would
    Visit {
        path: String,
    },

    /// List the account menu for the current session
    Menu,

    /// Sign in with a demo account
    Login {
        email: String,
        #[arg(long)]
        password: String,
    },

    /// Sign out and forget the persisted session
    Logout,

    /// Create an account (kept for this invocation only)
    Register(account::RegisterArgs),

    /// Show the current session and its permissions
    Whoami,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_writer(std::io::stderr)
        .init();

    let mut out = std::io::stdout().lock();

    match cli.command {
        Commands::Matrix { format } => {
            matrix::run(format, &mut out)?;
        }

        Commands::Check { role, capability } => {
            if !matrix::check(&role, &capability, &mut out)? {
                return Ok(ExitCode::FAILURE);
            }
        }

        Commands::Visit { path } => {
            let config = CliConfig::load(&cli.config).await?;
            let auth = commands::open_service(&config).await?;
            access::visit(&auth.context(), &path, &config.guard, &mut out).await?;
        }

        Commands::Menu => {
            let config = CliConfig::load(&cli.config).await?;
            let auth = commands::open_service(&config).await?;
            access::menu(&auth.context(), &mut out)?;
        }

        Commands::Login { email, password } => {
            let config = CliConfig::load(&cli.config).await?;
            let auth = commands::open_service(&config).await?;
            account::login(&auth, &email, &password, &mut out).await?;
        }

        Commands::Logout => {
            let config = CliConfig::load(&cli.config).await?;
            let auth = commands::open_service(&config).await?;
            account::logout(&auth, &mut out).await?;
        }

        Commands::Register(args) => {
            let config = CliConfig::load(&cli.config).await?;
            let auth = commands::open_service(&config).await?;
            account::register(&auth, args, &mut out).await?;
        }

        Commands::Whoami => {
            let config = CliConfig::load(&cli.config).await?;
            let auth = commands::open_service(&config).await?;
            account::whoami(&auth, &mut out)?;
        }
    }

    Ok(ExitCode::SUCCESS)
}
