//! JFK Cannabis CLI - Catalog browsing and cart quotes.
//!
//! # Usage
//!
//! ```bash
//! # List the menu, optionally filtered and sorted
//! jfk-cli catalog list --category flower --sort price-asc
//!
//! # Search names, brands, descriptions and effects
//! jfk-cli catalog search "blue dream"
//!
//! # Show one product with its lab summary
//! jfk-cli catalog show 3
//!
//! # Price a cart: product 3 twice in 7g, product 9 once, delivered 12 miles in NJ
//! jfk-cli quote 3x2@7g 9 --state NJ --distance 12
//! ```
//!
//! # Commands
//!
//! - `catalog list` - Filtered, sorted menu
//! - `catalog search` - Free-text search
//! - `catalog show` - Product detail
//! - `quote` - Subtotal, tax, delivery fee and total for a set of items

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;

use jfk_cannabis_core::catalog::{Catalog, Category, ProductFilter, SortOrder};
use jfk_cannabis_core::pricing::Destination;

mod commands;

use commands::CliError;

#[derive(Parser)]
#[command(name = "jfk-cli")]
#[command(author, version, about = "JFK Cannabis CLI tools")]
struct Cli {
    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse the product catalog
    Catalog {
        #[command(subcommand)]
        action: CatalogAction,
    },
    /// Price a set of items
    Quote {
        /// Items as `ID[xQTY][@WEIGHT]`, e.g. `3x2@7g`
        #[arg(required = true)]
        items: Vec<String>,

        /// Two-letter state code for the tax lookup
        #[arg(short, long, default_value = "NY")]
        state: String,

        /// Delivery distance in miles
        #[arg(short, long, default_value_t = 0.0)]
        distance: f64,

        /// Store pickup (no delivery fee)
        #[arg(long)]
        pickup: bool,
    },
}

#[derive(Subcommand)]
enum CatalogAction {
    /// List products
    List {
        /// Category slug (flower, pre_rolls, vapes, ...)
        #[arg(short, long)]
        category: Option<Category>,

        /// Brand name (case-insensitive)
        #[arg(short, long)]
        brand: Option<String>,

        /// Maximum effective price
        #[arg(long)]
        max_price: Option<Decimal>,

        /// Only products in stock
        #[arg(long)]
        in_stock: bool,

        /// Only products on sale
        #[arg(long)]
        on_sale: bool,

        #[arg(long, value_enum, default_value_t = SortArg::Featured)]
        sort: SortArg,
    },
    /// Search products
    Search {
        query: String,
    },
    /// Show a product
    Show {
        id: i32,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum SortArg {
    Featured,
    PriceAsc,
    PriceDesc,
    Name,
    Thc,
}

impl From<SortArg> for SortOrder {
    fn from(sort: SortArg) -> Self {
        match sort {
            SortArg::Featured => Self::Featured,
            SortArg::PriceAsc => Self::PriceAsc,
            SortArg::PriceDesc => Self::PriceDesc,
            SortArg::Name => Self::Name,
            SortArg::Thc => Self::ThcDesc,
        }
    }
}

#[allow(clippy::print_stdout)]
fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(output) => println!("{output}"),
        Err(e) => {
            tracing::error!("Command failed: {e}");
            std::process::exit(1);
        }
    }
}

fn run(cli: Cli) -> Result<String, CliError> {
    let catalog = Catalog::from_fixtures()?;
    let json = cli.json;

    match cli.command {
        Commands::Catalog { action } => match action {
            CatalogAction::List {
                category,
                brand,
                max_price,
                in_stock,
                on_sale,
                sort,
            } => {
                let filter = ProductFilter {
                    category,
                    brand,
                    max_price,
                    in_stock_only: in_stock,
                    on_sale_only: on_sale,
                    sort: sort.into(),
                    ..ProductFilter::default()
                };
                commands::catalog::list(&catalog, &filter, json)
            }
            CatalogAction::Search { query } => commands::catalog::search(&catalog, &query, json),
            CatalogAction::Show { id } => commands::catalog::show(&catalog, id, json),
        },
        Commands::Quote {
            items,
            state,
            distance,
            pickup,
        } => {
            let destination = Destination {
                state: state.to_ascii_uppercase(),
                distance_miles: distance,
            };
            commands::quote::run(&catalog, &items, destination, pickup, json)
        }
    }
}
