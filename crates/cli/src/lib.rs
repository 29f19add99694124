pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

use ordena_core::config::{AppConfig, LoadOptions};

#[derive(Debug, Parser)]
#[command(
    name = "ordena",
    about = "Ordena operator CLI",
    long_about = "Inspect configuration, preview the demo catalog, and drive scripted conversations against an in-memory deployment.",
    after_help = "Examples:\n  ordena config\n  ordena catalog\n  ordena simulate \"hola\" \"quiero 2 cappuccino y 1 croisant\" \"confirmar\""
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Inspect effective configuration values after file and env resolution")]
    Config,
    #[command(about = "Parse and print the demo catalog snapshot")]
    Catalog,
    #[command(about = "Feed a scripted conversation through the full router, one reply per message")]
    Simulate {
        #[arg(required = true, help = "Messages to send, in order")]
        messages: Vec<String>,
        #[arg(long, default_value = "demo-customer", help = "Customer identifier")]
        customer: String,
        #[arg(long, default_value = "demo-branch", help = "Branch identifier")]
        branch: String,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            eprintln!("configuration error: {error}");
            return ExitCode::from(2);
        }
    };
    init_logging(&config);

    let result = match cli.command {
        Command::Config => commands::config::run(&config),
        Command::Catalog => commands::catalog::run(),
        Command::Simulate { messages, customer, branch } => {
            commands::simulate::run(&config, messages, customer, branch)
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

fn init_logging(config: &AppConfig) {
    use ordena_core::config::LogFormat::{Compact, Json, Pretty};
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    match config.logging.format {
        Compact => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).compact().init();
        }
        Pretty => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).pretty().init();
        }
        Json => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).json().init();
        }
    }
}
