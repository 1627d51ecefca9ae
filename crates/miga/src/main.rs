// SPDX-FileCopyrightText: 2026 Miga Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Miga - WhatsApp ordering assistant for the Miga bakery.
//!
//! Binary entry point: loads configuration, then dispatches to the serve
//! or seed commands.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use clap::{Parser, Subcommand};

mod seed;
mod serve;

/// Miga - WhatsApp ordering assistant for the Miga bakery.
#[derive(Parser, Debug)]
#[command(name = "miga", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the webhook server and conversation agent.
    Serve,
    /// Populate the catalog with the bakery's products and recipes.
    Seed,
    /// Print the effective configuration (secrets masked).
    Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match miga_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            miga_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Some(Commands::Serve) | None => serve::run_serve(config).await,
        Some(Commands::Seed) => seed::run_seed(config).await,
        Some(Commands::Config) => {
            print_config(config);
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

/// Prints the effective configuration as TOML with secrets masked.
fn print_config(mut config: miga_config::model::MigaConfig) {
    mask(&mut config.anthropic.api_key);
    mask(&mut config.whatsapp.access_token);
    mask(&mut config.whatsapp.verify_token);
    mask(&mut config.whatsapp.app_secret);

    match toml::to_string_pretty(&config) {
        Ok(rendered) => println!("{rendered}"),
        Err(e) => eprintln!("error: failed to render config: {e}"),
    }
}

fn mask(secret: &mut Option<String>) {
    if secret.is_some() {
        *secret = Some("***".to_string());
    }
}
