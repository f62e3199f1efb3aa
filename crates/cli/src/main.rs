//! Hardalum CLI - shop for aluminum hardware from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Browse the catalog
//! hardalum products --sort price-asc --page 2
//! hardalum products --search tubing
//! hardalum product 1
//!
//! # Work with the cart
//! hardalum cart add 1 --variant '1/2" Diameter' --quantity 2
//! hardalum cart update 1 0 --variant '1/2" Diameter'
//! hardalum cart show
//!
//! # Sign in and check out
//! hardalum login -e ada@example.com
//! hardalum checkout --name Ada --email ada@example.com --address "1 Main St" \
//!     --city Springfield --zip 12345 --phone 5551234567
//! ```
//!
//! # Environment Variables
//!
//! - `HARDALUM_ENV` - `development` (default) or `production`
//! - `HARDALUM_API_URL` - Storefront API base URL
//! - `HARDALUM_DATA_DIR` - Where the cart and session are kept
//! - `HARDALUM_PASSWORD` - Password for `login` and `signup`
//! - `SENTRY_DSN` - Enables error tracking

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use clap::{Parser, Subcommand};
use secrecy::SecretString;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hardalum_core::{CategoryId, ProductId};
use hardalum_storefront::catalog::SortOrder;
use hardalum_storefront::config::StorefrontConfig;
use hardalum_storefront::storage::MemoryStore;
use hardalum_storefront::{Storefront, StorefrontError};

mod commands;

#[derive(Parser)]
#[command(name = "hardalum")]
#[command(author, version, about = "Hardalum storefront")]
struct Cli {
    /// Keep the cart and session in memory only
    #[arg(long, global = true)]
    ephemeral: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List products
    Products {
        /// Search term
        #[arg(short, long)]
        search: Option<String>,

        /// Category ID to filter by
        #[arg(short, long)]
        category: Option<CategoryId>,

        /// `default`, `price-asc`, or `price-desc`
        #[arg(long, default_value = "default")]
        sort: SortOrder,

        /// Page number, starting at 1
        #[arg(short, long, default_value_t = 1)]
        page: usize,
    },
    /// Show one product and its variants
    Product { id: ProductId },
    /// List categories
    Categories,
    /// Manage the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Sign in
    Login {
        #[arg(short, long)]
        email: String,

        #[arg(long, env = "HARDALUM_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create an account and sign in
    Signup {
        #[arg(short, long)]
        username: String,

        #[arg(short, long)]
        email: String,

        #[arg(long, env = "HARDALUM_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Sign out
    Logout,
    /// Show the signed-in profile
    Profile,
    /// Show past orders
    Orders,
    /// Place an order for the cart, or buy one product directly
    Checkout(commands::checkout::CheckoutArgs),
    /// Send a message to the shop
    Contact {
        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        subject: String,

        #[arg(short, long)]
        message: String,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show cart contents and totals
    Show,
    /// Add a product
    Add {
        product_id: ProductId,

        /// Variant label; defaults to the product's first variant
        #[arg(short, long)]
        variant: Option<String>,

        #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        quantity: u32,
    },
    /// Move a line to another variant of the same product, keeping its quantity
    ChangeVariant {
        product_id: ProductId,

        /// Current variant label; omit for a line without a variant
        #[arg(long)]
        from: Option<String>,

        /// New variant label
        #[arg(long)]
        to: String,
    },
    /// Remove a product
    Remove {
        product_id: ProductId,

        #[arg(short, long)]
        variant: Option<String>,
    },
    /// Set a line's quantity; zero or less removes it
    Update {
        product_id: ProductId,

        #[arg(allow_negative_numbers = true)]
        quantity: i64,

        #[arg(short, long)]
        variant: Option<String>,
    },
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

    // Load configuration from environment (needed for Sentry init)
    let config = StorefrontConfig::from_env().expect("Failed to load configuration");

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "hardalum_storefront=warn,hardalum=warn".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let storefront = if cli.ephemeral {
        Storefront::with_storage(config, Arc::new(MemoryStore::new())).await
    } else {
        Storefront::open(config).await
    };

    let mut storefront = match storefront {
        Ok(storefront) => storefront,
        Err(e) => fail(&e),
    };

    let result = run(&mut storefront, cli.command).await;
    storefront.shutdown().await;

    if let Err(e) = result {
        fail(&e);
    }
}

#[allow(clippy::print_stderr)]
fn fail(e: &StorefrontError) -> ! {
    e.report();
    tracing::debug!("Command failed: {e}");
    eprintln!("Error: {}", e.user_message());
    std::process::exit(1);
}

async fn run(storefront: &mut Storefront, command: Commands) -> Result<(), StorefrontError> {
    match command {
        Commands::Products {
            search,
            category,
            sort,
            page,
        } => {
            commands::catalog::products(storefront, search.as_deref(), category, sort, page)
                .await;
        }
        Commands::Product { id } => commands::catalog::product(storefront, id).await?,
        Commands::Categories => commands::catalog::categories(storefront).await,
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(storefront.cart()),
            CartAction::Add {
                product_id,
                variant,
                quantity,
            } => {
                commands::cart::add(storefront, product_id, variant.as_deref(), quantity).await?;
            }
            CartAction::ChangeVariant {
                product_id,
                from,
                to,
            } => {
                commands::cart::change_variant(storefront, product_id, from.as_deref(), &to)
                    .await?;
            }
            CartAction::Remove {
                product_id,
                variant,
            } => commands::cart::remove(storefront, product_id, variant.as_deref()),
            CartAction::Update {
                product_id,
                quantity,
                variant,
            } => commands::cart::update(storefront, product_id, quantity, variant.as_deref()),
            CartAction::Clear => commands::cart::clear(storefront),
        },
        Commands::Login { email, password } => {
            commands::account::login(storefront, &email, SecretString::from(password)).await?;
        }
        Commands::Signup {
            username,
            email,
            password,
        } => {
            commands::account::signup(storefront, &username, &email, SecretString::from(password))
                .await?;
        }
        Commands::Logout => commands::account::logout(storefront),
        Commands::Profile => commands::account::profile(storefront).await?,
        Commands::Orders => commands::account::orders(storefront).await?,
        Commands::Checkout(args) => commands::checkout::checkout(storefront, args).await?,
        Commands::Contact {
            name,
            email,
            subject,
            message,
        } => {
            commands::contact::send(
                storefront,
                hardalum_storefront::contact::ContactForm {
                    name,
                    email,
                    subject,
                    message,
                },
            )
            .await?;
        }
    }
    Ok(())
}
