//! Command-line interface definitions.
//!
//! Defines the CLI structure for the stockflow application using `clap`.
//! Catalog and order subcommands call the application services directly;
//! `run` starts the stock reconciler.

use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use std::path::PathBuf;

use crate::domain::{OrderFilter, OrderId, OrderLine, OrderStatus, ProductId, UserId};

/// Default configuration file, looked up in the working directory.
pub const DEFAULT_CONFIG: &str = "stockflow.toml";

/// Order fulfillment with event-driven stock reconciliation
#[derive(Parser, Debug)]
#[command(name = "stockflow")]
#[command(version)]
pub struct Cli {
    /// Path to the configuration file (defaults apply when it is missing)
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG)]
    pub config: PathBuf,

    /// Color output mode [auto, always, never]
    #[arg(
        long,
        global = true,
        default_value = "auto",
        hide_possible_values = true
    )]
    pub color: ColorChoice,

    /// JSON output for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Decrease output verbosity
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase output verbosity
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Color output mode for terminal rendering.
#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
pub enum ColorChoice {
    /// Detect automatically
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the stock reconciler until Ctrl+C
    Run(RunArgs),

    /// Manage catalog products
    #[command(subcommand)]
    Product(ProductCommand),

    /// Place and manage orders
    #[command(subcommand)]
    Order(OrderCommand),

    /// Inspect configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

/// Arguments for `stockflow run`.
#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Process whatever is pending, then exit
    #[arg(long)]
    pub once: bool,

    /// Override the configured log level
    #[arg(long)]
    pub log_level: Option<String>,

    /// Emit logs as JSON
    #[arg(long)]
    pub json_logs: bool,
}

/// Subcommands for `stockflow product`.
#[derive(Subcommand, Debug)]
pub enum ProductCommand {
    /// Create a product; the id is assigned
    Add(ProductAddArgs),
    /// Show one product (read through the cache)
    Get(ProductIdArg),
    /// List products, optionally filtered
    List(ProductListArgs),
    /// Change some fields of a product
    Update(ProductUpdateArgs),
    /// Remove a product
    Delete(ProductIdArg),
}

#[derive(Args, Debug)]
pub struct ProductIdArg {
    /// Product id
    pub id: u64,
}

impl ProductIdArg {
    #[must_use]
    pub fn id(&self) -> ProductId {
        ProductId::new(self.id)
    }
}

#[derive(Args, Debug)]
pub struct ProductAddArgs {
    #[arg(long)]
    pub name: String,

    #[arg(long, default_value = "")]
    pub category: String,

    /// Unit price, e.g. 19.99
    #[arg(long)]
    pub price: Decimal,

    /// Units in stock
    #[arg(long, default_value_t = 0)]
    pub stock: u64,
}

#[derive(Args, Debug)]
pub struct ProductListArgs {
    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub category: Option<String>,

    #[command(flatten)]
    pub page: PageArgs,
}

#[derive(Args, Debug)]
pub struct ProductUpdateArgs {
    /// Product id
    pub id: u64,

    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub category: Option<String>,

    #[arg(long)]
    pub price: Option<Decimal>,

    #[arg(long)]
    pub stock: Option<u64>,
}

/// 1-based page selection.
#[derive(Args, Debug, Clone, Copy)]
pub struct PageArgs {
    /// Page number, starting at 1
    #[arg(long, default_value_t = 1)]
    pub page: u64,

    /// Items per page
    #[arg(long, default_value_t = 10)]
    pub limit: u64,
}

/// Subcommands for `stockflow order`.
#[derive(Subcommand, Debug)]
pub enum OrderCommand {
    /// Create an order from PRODUCT:QUANTITY items
    Create(OrderCreateArgs),
    /// Show the first order matching the selector
    Get(OrderSelector),
    /// List orders matching the selector
    List(OrderListArgs),
    /// Set the status of the first matching order
    Update(OrderUpdateArgs),
    /// Delete the first matching order
    Delete(OrderSelector),
}

#[derive(Args, Debug)]
pub struct OrderCreateArgs {
    /// Ordering user id
    #[arg(long)]
    pub user: u64,

    /// Item as PRODUCT_ID:QUANTITY; repeat for more items
    #[arg(long = "item", required = true, value_parser = parse_line)]
    pub items: Vec<OrderLine>,
}

/// Equality filters selecting orders.
#[derive(Args, Debug, Default, Clone)]
pub struct OrderSelector {
    /// Order id
    #[arg(long)]
    pub id: Option<u64>,

    /// Ordering user id
    #[arg(long)]
    pub user: Option<u64>,

    /// Order status
    #[arg(long)]
    pub status: Option<OrderStatus>,
}

impl OrderSelector {
    #[must_use]
    pub fn filter(&self) -> OrderFilter {
        OrderFilter {
            id: self.id.map(OrderId::new),
            user_id: self.user.map(UserId::new),
            status: self.status,
        }
    }
}

#[derive(Args, Debug)]
pub struct OrderListArgs {
    #[command(flatten)]
    pub selector: OrderSelector,

    #[command(flatten)]
    pub page: PageArgs,
}

#[derive(Args, Debug)]
pub struct OrderUpdateArgs {
    #[command(flatten)]
    pub selector: OrderSelector,

    /// New status
    #[arg(id = "to", long = "to")]
    pub status: OrderStatus,
}

/// Subcommands for `stockflow config`.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Write a documented configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Display the effective configuration with defaults applied
    Show,
    /// Validate the configuration file
    Validate,
}

/// Parse `PRODUCT_ID:QUANTITY`. The quantity is kept signed so that zero and
/// negative quantities reach order validation and are reported there.
pub fn parse_line(raw: &str) -> Result<OrderLine, String> {
    let (product, quantity) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected PRODUCT_ID:QUANTITY, got `{raw}`"))?;
    let product_id = product
        .trim()
        .parse::<u64>()
        .map_err(|e| format!("invalid product id `{product}`: {e}"))?;
    let quantity = quantity
        .trim()
        .parse::<i64>()
        .map_err(|e| format!("invalid quantity `{quantity}`: {e}"))?;
    Ok(OrderLine {
        product_id: ProductId::new(product_id),
        quantity,
    })
}
