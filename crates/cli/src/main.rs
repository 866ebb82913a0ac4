//! Digi CLI - terminal front end for the Digi storefront.
//!
//! # Usage
//!
//! ```bash
//! # Create an account, then verify it with the mailed OTP
//! digi register -n "Jane" -e jane@example.com
//! digi verify-otp -e jane@example.com 123456
//!
//! # Browse and buy
//! digi products home
//! digi cart add <product-id> <sku-id> -q 1
//! digi checkout
//!
//! # Keep one session (and its cookie) for several commands
//! digi shell
//! ```
//!
//! # Commands
//!
//! - `register`, `verify-otp`, `resend-otp`, `login`, `logout`,
//!   `forgot-password`, `whoami`, `profile` - account flows
//! - `orders list|show` - order history
//! - `products home|show|search` - catalog
//! - `cart list|add|update|remove|clear`, `checkout` - cart and payment
//! - `shell` - read commands from stdin against one context
//!
//! Configuration comes from the environment (see `DIGI_API_BASE_URL` and
//! friends); the cart and the logged-in user are kept in `DIGI_STORAGE_DIR`.

#![cfg_attr(not(test), forbid(unsafe_code))]
// Terminal output is this binary's job
#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::sync::Arc;

use clap::{Parser, Subcommand};
use digi_core::OrderStatus;
use digi_storefront::config::StorefrontConfig;
use digi_storefront::storage::FileStore;
use digi_storefront::{AppContext, AppError};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod terminal;

use terminal::TerminalNavigator;

#[derive(Debug, Parser)]
#[command(name = "digi")]
#[command(author, version, about = "Digi storefront in the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Create a customer account
    Register {
        /// Display name
        #[arg(short, long)]
        name: String,

        /// Account e-mail address
        #[arg(short, long)]
        email: String,

        /// Password (at least 6 characters)
        #[arg(short, long, env = "DIGI_PASSWORD", hide_env_values = true)]
        password: String,

        /// Password confirmation; defaults to the password
        #[arg(long)]
        confirm_password: Option<String>,
    },
    /// Verify an account with the mailed OTP
    VerifyOtp {
        #[arg(short, long)]
        email: String,

        /// One-time password from the e-mail
        otp: String,
    },
    /// Mail a new verification OTP
    ResendOtp {
        #[arg(short, long)]
        email: String,
    },
    /// Log in
    Login {
        #[arg(short, long)]
        email: String,

        #[arg(short, long, env = "DIGI_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Log out
    Logout,
    /// Mail a new password
    ForgotPassword {
        #[arg(short, long)]
        email: String,
    },
    /// Show the logged-in user
    Whoami,
    /// Change name and optionally password
    Profile {
        #[arg(short, long)]
        name: String,

        /// New password; omit to keep the current one
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Order history
    Orders {
        #[command(subcommand)]
        action: OrdersAction,
    },
    /// Product catalog
    Products {
        #[command(subcommand)]
        action: ProductsAction,
    },
    /// Shopping cart
    Cart {
        #[command(subcommand)]
        action: CartCommand,
    },
    /// Start a payment session for the cart
    Checkout,
    /// Run commands from stdin, one per line, sharing one session
    Shell,
}

#[derive(Debug, Subcommand)]
enum OrdersAction {
    /// List orders
    List {
        /// Only orders in this status (`pending`, `completed`)
        #[arg(short, long)]
        status: Option<OrderStatus>,
    },
    /// Show one order
    Show { id: String },
}

#[derive(Debug, Subcommand)]
enum ProductsAction {
    /// Latest and top rated products
    Home,
    /// Show one product with its SKUs
    Show { id: String },
    /// Search the catalog
    Search {
        query: String,

        #[arg(short, long)]
        limit: Option<u32>,
    },
}

#[derive(Debug, Subcommand)]
enum CartCommand {
    /// List cart lines
    List,
    /// Add a SKU of a product
    Add {
        product_id: String,
        sku_id: String,

        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Set the quantity of a line
    Update { sku_id: String, quantity: u32 },
    /// Remove a line
    Remove { sku_id: String },
    /// Empty the cart
    Clear,
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };

    // Sentry must be initialized before the tracing subscriber
    let _sentry_guard = init_sentry(&config);

    // Logs go to stderr so command output stays clean
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "digi_storefront=warn,digi=warn".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let ctx = match build_context(config) {
        Ok(ctx) => ctx,
        Err(e) => {
            commands::print_error(&e);
            std::process::exit(1);
        }
    };
    ctx.start().await;
    ctx.restore_cart();

    let ok = match cli.command {
        Commands::Shell => commands::shell::run(&ctx).await,
        command => commands::execute(&ctx, command).await,
    };

    if !ok {
        std::process::exit(1);
    }
}

fn build_context(config: StorefrontConfig) -> Result<AppContext, AppError> {
    let storage = Arc::new(FileStore::open(config.storage_dir.clone())?);
    AppContext::new(config, storage, Arc::new(TerminalNavigator))
}
