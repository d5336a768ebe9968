//! Rocket Cart CLI - inspect and edit the persisted cart.
//!
//! # Usage
//!
//! ```bash
//! # Show the cart
//! rocket-cart show
//!
//! # Print the stored JSON
//! rocket-cart show --json
//!
//! # Add one unit of product 3
//! rocket-cart add 3
//!
//! # Set product 3 to 2 units
//! rocket-cart set 3 2
//!
//! # Remove product 3
//! rocket-cart remove 3
//! ```
//!
//! Configuration comes from `CART_*` environment variables (see
//! `rocket_cart::config`).

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use rocket_cart_core::ProductId;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "rocket-cart")]
#[command(author, version, about = "Rocket Cart shopping cart tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the cart contents
    Show {
        /// Print the stored JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Add one unit of a product
    Add {
        /// Product ID
        product_id: ProductId,
    },
    /// Remove a product from the cart
    Remove {
        /// Product ID
        product_id: ProductId,
    },
    /// Set the quantity of a product already in the cart
    Set {
        /// Product ID
        product_id: ProductId,

        /// New quantity (values below 1 are ignored)
        #[arg(allow_negative_numbers = true)]
        amount: i32,
    },
}

#[tokio::main]
async fn main() {
    // Logs go to stderr so stdout stays clean for `show --json`
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "rocket_cart=warn,rocket_cart_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    let mut session = commands::Session::open()?;

    match cli.command {
        Commands::Show { json } => session.show(json)?,
        Commands::Add { product_id } => session.add(product_id).await,
        Commands::Remove { product_id } => session.remove(product_id).await,
        Commands::Set { product_id, amount } => session.set(product_id, amount).await,
    }
    Ok(())
}
