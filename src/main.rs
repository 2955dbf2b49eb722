use clap::{Parser, Subcommand};
use hacs_data::core::format_error_with_help;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod cli;

#[derive(Parser)]
#[command(name = "hacs-data")]
#[command(about = "Generate HACS category data from GitHub")]
#[command(version)]
struct Cli {
    /// Read configuration from this file instead of the user config directory
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate data.json and repositories.json for a category
    Generate {
        /// Category to generate (integration, plugin, theme, ...)
        category: String,
        /// Only refresh this repository (owner/name)
        #[arg(short, long, value_name = "OWNER/NAME")]
        repository: Option<String>,
        /// Write artifacts under this directory
        #[arg(short, long, value_name = "DIR")]
        output_dir: Option<PathBuf>,
        /// Stop at the first repository that fails to fetch
        #[arg(long)]
        abort_on_error: bool,
    },
    /// Configuration commands
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print the effective configuration
    Show,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let config = match cli::config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", format_error_with_help(&e));
            return ExitCode::FAILURE;
        }
    };

    let result = match cli.command {
        Commands::Generate {
            category,
            repository,
            output_dir,
            abort_on_error,
        } => {
            cli::generate::run(
                config,
                cli::generate::GenerateOptions {
                    category,
                    repository,
                    output_dir,
                    abort_on_error,
                },
            )
            .await
        }
        Commands::Config(cmd) => match cmd {
            ConfigCommands::Show => cli::config::show(&config),
        },
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", format_error_with_help(&e));
            ExitCode::FAILURE
        }
    }
}
