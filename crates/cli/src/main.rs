//! Heavyline CLI - the storefront cart and checkout from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # Sign in (password from HEAVYLINE_PASSWORD or --password)
//! hl login -e buyer@example.ru
//!
//! # Fill the cart
//! hl cart add 12
//! hl cart set 12 3
//! hl cart show
//!
//! # Place the order
//! hl checkout --full-name "Иванов Иван" --email buyer@example.ru \
//!     --phone "+7 900 000-00-00" --city Казань --payment card --delivery pickup
//! ```
//!
//! # Commands
//!
//! - `cart` - Show and change the persisted cart
//! - `login` / `logout` / `whoami` - Manage the signed-in session
//! - `checkout` - Submit the cart as an order request
//! - `orders` - List the signed-in user's order requests

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use heavyline_storefront::StorefrontConfig;
use heavyline_storefront::config::LogFormat;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::CliError;
use commands::checkout::CheckoutArgs;

#[derive(Parser)]
#[command(name = "hl")]
#[command(author, version, about = "Heavyline storefront CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show or change the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Sign in
    Login {
        /// Account email address
        #[arg(short, long)]
        email: String,

        /// Account password
        #[arg(short, long, env = "HEAVYLINE_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Sign out (clears the cart)
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Submit the cart as an order request
    Checkout(CheckoutArgs),
    /// List your order requests
    Orders,
}

#[derive(Subcommand)]
enum CartAction {
    /// Print the cart
    Show,
    /// Add one unit of a vehicle
    Add {
        /// Vehicle ID
        id: String,
    },
    /// Remove a vehicle from the cart
    Remove {
        /// Vehicle ID
        id: String,
    },
    /// Set the quantity of a vehicle already in the cart
    Set {
        /// Vehicle ID
        id: String,
        /// New quantity (at least 1)
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Empty the cart
    Clear,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            init_tracing(LogFormat::Pretty);
            tracing::error!("Configuration error: {e}");
            std::process::exit(1);
        }
    };
    init_tracing(config.log_format);

    if let Err(e) = run(cli, &config).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

/// Initialize tracing with `EnvFilter`, logging to stderr so command output
/// stays clean.
fn init_tracing(format: LogFormat) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "heavyline_storefront=info,heavyline_cli=info".into());

    let json_layer = (format == LogFormat::Json).then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_writer(std::io::stderr)
    });
    let text_layer = (format == LogFormat::Pretty)
        .then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .init();
}

async fn run(cli: Cli, config: &StorefrontConfig) -> Result<(), CliError> {
    let mut storefront = heavyline_storefront::Storefront::open(config)?;
    storefront.restore().await?;

    match cli.command {
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(&storefront)?,
            CartAction::Add { id } => commands::cart::add(&mut storefront, &id).await?,
            CartAction::Remove { id } => commands::cart::remove(&mut storefront, &id)?,
            CartAction::Set { id, quantity } => {
                commands::cart::set(&mut storefront, &id, quantity)?;
            }
            CartAction::Clear => commands::cart::clear(&mut storefront)?,
        },
        Commands::Login { email, password } => {
            commands::account::login(&mut storefront, &email, password).await?;
        }
        Commands::Logout => commands::account::logout(&mut storefront).await?,
        Commands::Whoami => commands::account::whoami(&mut storefront).await?,
        Commands::Checkout(args) => commands::checkout::run(&mut storefront, args).await?,
        Commands::Orders => commands::account::orders(&mut storefront).await?,
    }
    Ok(())
}
