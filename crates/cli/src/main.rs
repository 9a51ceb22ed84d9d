//! Xaudi CLI - the storefront, driven from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # Browse beats, cheapest first, matching "afro"
//! xaudi catalog list beats --search afro --sort price-low
//!
//! # Browse against a running storefront's feed, falling back to local data
//! xaudi catalog list beats --remote http://127.0.0.1:3000/
//!
//! # Fill and pay for a cart
//! xaudi cart add beats beat-01
//! xaudi cart qty beat-01 2
//! xaudi checkout
//!
//! # Preview two beats, switching after five seconds
//! xaudi preview beats beat-01 beat-02 --switch-after 5
//! ```
//!
//! # Commands
//!
//! - `seed` - Write default catalogs where none exist
//! - `catalog` - List, feature, and add products
//! - `cart` - Add, remove, re-quantify, and show cart lines
//! - `checkout` - Simulated payment
//! - `preview` - Play previews through the headless channel
//!
//! Local data lives in `--data-dir` (or `XAUDI_DATA_DIR`), one JSON file per
//! storage key. Every command seeds missing catalogs first.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use url::Url;
use xaudi_core::{Category, FileStorage, Price, SortOrder};

mod commands;

#[derive(Parser)]
#[command(name = "xaudi")]
#[command(author, version, about = "Xaudi storefront CLI")]
struct Cli {
    /// Directory holding local storefront data
    #[arg(long, env = "XAUDI_DATA_DIR", default_value = ".xaudi")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write default catalogs for any category that has none
    Seed,
    /// Browse and extend the catalog
    Catalog {
        #[command(subcommand)]
        action: CatalogAction,
    },
    /// Manage the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Pay for everything in the cart (simulated)
    Checkout,
    /// Play product previews one after another
    Preview {
        /// Category of the products
        category: Category,

        /// Product ids, played in order
        #[arg(required = true)]
        ids: Vec<String>,

        /// Length of each preview clip, in seconds
        #[arg(long, default_value_t = 30.0)]
        seconds: f64,

        /// Request the next preview after this many seconds instead of
        /// waiting for the current one to end
        #[arg(long)]
        switch_after: Option<f64>,
    },
}

#[derive(Subcommand)]
enum CatalogAction {
    /// List one category's products
    List {
        /// Category to list
        category: Category,

        /// Case-insensitive match on title or tag
        #[arg(short, long, default_value = "")]
        search: String,

        /// `price-low`, `price-high`, or `newest`
        #[arg(long, default_value = "newest")]
        sort: SortOrder,

        /// Storefront base URL whose `products.json` replaces local data
        #[arg(long)]
        remote: Option<Url>,
    },
    /// Show the home page's featured beats
    Featured {
        #[arg(short, long, default_value_t = 3)]
        count: usize,
    },
    /// Add a product to the local catalog
    Add {
        category: Category,

        #[arg(long)]
        title: String,

        #[arg(long)]
        price: Price,

        #[arg(long)]
        bpm: Option<u32>,

        #[arg(long)]
        key: Option<String>,

        #[arg(long)]
        daw: Option<String>,

        #[arg(long)]
        files: Option<u32>,

        /// Comma-separated tags
        #[arg(long, default_value = "")]
        tags: String,

        /// Preview audio reference
        #[arg(long)]
        audio: Option<String>,

        #[arg(long, default_value = "")]
        cover: String,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Add one unit of a product
    Add { category: Category, id: String },
    /// Remove a product's line
    Remove { id: String },
    /// Set a line's quantity; zero or less removes it
    Qty {
        id: String,
        #[arg(allow_hyphen_values = true)]
        qty: i64,
    },
    /// Show lines and total
    Show,
}

#[tokio::main]
async fn main() {
    // Load .env file if present (so XAUDI_DATA_DIR can come from it)
    dotenvy::dotenv().ok();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "xaudi=info,xaudi_core=info".into());
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let storage = FileStorage::open(&cli.data_dir)?;
    let report = commands::seed::run(&storage)?;

    match cli.command {
        Commands::Seed => commands::seed::summarize(&report),
        Commands::Catalog { action } => match action {
            CatalogAction::List {
                category,
                search,
                sort,
                remote,
            } => {
                commands::catalog::list(&storage, category, search, sort, remote.as_ref()).await;
            }
            CatalogAction::Featured { count } => commands::catalog::featured(&storage, count),
            CatalogAction::Add {
                category,
                title,
                price,
                bpm,
                key,
                daw,
                files,
                tags,
                audio,
                cover,
            } => {
                let draft = commands::catalog::Draft {
                    category,
                    title,
                    price,
                    bpm,
                    key,
                    daw,
                    files,
                    tags,
                    audio,
                    cover,
                };
                commands::catalog::add(&storage, draft)?;
            }
        },
        Commands::Cart { action } => match action {
            CartAction::Add { category, id } => commands::cart::add(&storage, category, &id)?,
            CartAction::Remove { id } => commands::cart::remove(&storage, &id)?,
            CartAction::Qty { id, qty } => commands::cart::set_quantity(&storage, &id, qty)?,
            CartAction::Show => commands::cart::show(&storage),
        },
        Commands::Checkout => commands::cart::checkout(&storage)?,
        Commands::Preview {
            category,
            ids,
            seconds,
            switch_after,
        } => {
            let options = commands::preview::PreviewOptions::from_seconds(seconds, switch_after)?;
            commands::preview::run(&storage, category, &ids, &options).await?;
        }
    }
    Ok(())
}
