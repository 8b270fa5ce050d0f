use clap::Parser;
use dotenv::dotenv;
use env_logger::Env;
use log::{error, info};
use std::process;

use console_bank::cli::{Menu, StdTerminal};
use console_bank::config;
use console_bank::operator::Registry;

/// Console Bank - an in-memory terminal bank simulator
#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    /// Sets the configuration file (TOML or JSON); defaults are used when omitted
    #[clap(short, long, value_name = "FILE")]
    config: Option<String>,

    /// Turn debugging information on
    #[clap(short, long, action = clap::ArgAction::Count)]
    debug: u8,
}

fn main() {
    // Load environment variables from .env file
    dotenv().ok();

    let cli = Cli::parse();

    // RUST_LOG wins over the -d flags
    let default_level = match cli.debug {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_level)).init();

    if let Some(path) = &cli.config {
        match config::load_config(path) {
            Ok(_) => info!("Configuration loaded from {}", path),
            Err(err) => {
                error!("Failed to load configuration: {:#}", err);
                process::exit(1);
            }
        }
    }

    let config = config::get_config();
    info!("Starting {} v{}", config.app_name, config.version);

    let mut registry = Registry::new();
    let mut terminal = StdTerminal::new();

    if let Err(err) = Menu::new(&mut terminal, &mut registry, config).run() {
        error!("Terminal error: {:#}", err);
        process::exit(1);
    }

    info!("Shutting down with {} registered user(s)", registry.user_count());
}
