use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;

mod commands;
mod config;
mod logging;

use commands::errors::Lookup;
use config::ServerConfig;

/// Parley - chat community backend
#[derive(Parser)]
#[command(name = "parley")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API
    Serve {
        /// Port to listen on
        #[arg(short, long, env = "PARLEY_PORT")]
        port: Option<u16>,
    },

    /// Print the error taxonomy
    Errors {
        /// Output format (json, text)
        #[arg(short, long, default_value = "text")]
        format: String,

        /// Look up a single error by code
        #[arg(long, conflicts_with = "name")]
        code: Option<u16>,

        /// Look up a single error by name
        #[arg(long)]
        name: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Serve { port } => {
            let mut config = ServerConfig::from_env()?;
            if let Some(port) = port {
                config.port = port;
            }

            let _guard = logging::init_logging(&config)?;
            let result = commands::serve::execute(config).await;
            logging::log_shutdown();
            result
        }
        Commands::Errors { format, code, name } => {
            let lookup = match (code, name) {
                (Some(code), _) => Lookup::Code(code),
                (None, Some(name)) => Lookup::Name(name),
                (None, None) => Lookup::All,
            };
            commands::errors::execute(lookup, &format)
        }
    }
}
