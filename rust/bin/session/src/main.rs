//! `openerp-session`: inspect tokens and permission payloads, and watch a
//! context's session for expiry.

mod commands;
mod config;

use clap::{Parser, Subcommand};

/// OpenERP session tool.
#[derive(Parser, Debug)]
#[command(name = "openerp-session", about = "OpenERP session inspector and monitor")]
struct Cli {
    /// Path to client config file (default: ~/.openerp/config.toml).
    #[arg(long = "config", global = true)]
    config: Option<String>,

    /// Output format: table or json.
    #[arg(long = "output", short = 'o', global = true, default_value = "table")]
    output: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Decode a token and show its expiry.
    Inspect {
        /// Token to inspect (default: current context's token).
        token: Option<String>,
    },

    /// Build a permission snapshot from a `permissionRes` payload.
    Permissions {
        /// JSON body.
        #[arg(long = "json")]
        json_body: Option<String>,
        /// Read JSON from file.
        #[arg(short = 'f', long = "file")]
        file: Option<String>,
        /// Answer a single MODULE:ACTION query.
        #[arg(long)]
        check: Option<String>,
    },

    /// Watch the current context's session and sign out when it lapses.
    Watch {
        /// Exit after the first sign-out.
        #[arg(long)]
        exit_on_sign_out: bool,
    },

    /// Show version.
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    let config_path = cli
        .config
        .map(std::path::PathBuf::from)
        .unwrap_or_else(config::ClientConfig::default_path);
    let json_output = cli.output == "json";

    match cli.command {
        Commands::Inspect { token } => {
            commands::inspect::inspect(token.as_deref(), json_output, &config_path)?;
        }

        Commands::Permissions {
            json_body,
            file,
            check,
        } => {
            let body = if let Some(path) = file {
                std::fs::read_to_string(&path)?
            } else if let Some(json) = json_body {
                json
            } else {
                anyhow::bail!("Provide --json or -f <file>.");
            };
            commands::permissions::permissions(&body, check.as_deref(), json_output)?;
        }

        Commands::Watch { exit_on_sign_out } => {
            commands::watch::watch(exit_on_sign_out, &config_path).await?;
        }

        Commands::Version => {
            println!("openerp-session v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
