use clap::{Args, Parser, Subcommand};

use stockroom_core::DomainError;
use stockroom_inventory::{Category, CategoryFilter};

#[derive(Parser, Debug)]
#[command(name = "stockroom", about = "Track named stock items in a document database", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Where items live. `memory` starts empty on every run; pair it with `shell`.
    #[arg(long, global = true, value_enum)]
    pub backend: Option<Backend>,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

/// One line typed into `stockroom shell`.
#[derive(Parser, Debug)]
#[command(name = "stockroom", no_binary_name = true)]
pub struct ShellLine {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum Backend {
    Memory,
    Firestore,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List items, optionally filtered by category and name
    List(ListArgs),
    /// Add stock, creating the item if needed
    Add(AddArgs),
    /// Increase an item's quantity by one
    Inc(NameArg),
    /// Decrease an item's quantity by one (removes it at zero)
    Dec(NameArg),
    /// Delete an item
    Rm(NameArg),
    /// Set description, price or supplier
    Edit(EditArgs),
    /// Show one item with its details
    Show(NameArg),
    /// List the known categories
    Categories,
    /// Read commands from stdin, one per line
    Shell,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Category name or `All`
    #[arg(short, long, default_value = "All", value_parser = parse_filter)]
    pub category: CategoryFilter,

    /// Case-insensitive substring of the item name
    #[arg(short, long, default_value = "")]
    pub search: String,
}

#[derive(Args, Debug)]
pub struct AddArgs {
    pub name: String,

    /// Anything that is not a positive number counts as 1
    pub quantity: String,

    #[arg(value_parser = parse_category)]
    pub category: Category,
}

#[derive(Args, Debug)]
pub struct NameArg {
    pub name: String,
}

#[derive(Args, Debug)]
pub struct EditArgs {
    pub name: String,

    #[arg(long)]
    pub description: Option<String>,

    #[arg(long)]
    pub price: Option<f64>,

    #[arg(long)]
    pub supplier: Option<String>,
}

fn parse_category(s: &str) -> Result<Category, String> {
    s.parse().map_err(|e: DomainError| e.to_string())
}

fn parse_filter(s: &str) -> Result<CategoryFilter, String> {
    s.parse().map_err(|e: DomainError| e.to_string())
}
