use std::sync::Arc;

use anyhow::{Context, bail};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};

use stockroom_infra::store::DocumentStore;
use stockroom_infra::{AccessOptions, Config, InMemoryDocumentStore, InventoryAccess, InventoryError};
use stockroom_inventory::{Category, InventoryItem, ItemName, MetadataPatch, StockOutcome};
use stockroom_view::{display_name, parse_quantity};

use crate::cli::{AddArgs, Backend, Cli, Command, EditArgs, ListArgs, OutputFormat, ShellLine};

type Access = InventoryAccess<Arc<dyn DocumentStore>>;

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::from_env();
    let store = open_store(cli.backend, &config)?;
    let access = InventoryAccess::with_options(store, AccessOptions::from(&config));

    match cli.command {
        Command::Shell => shell(&access, cli.format).await,
        command => execute(&access, command, cli.format).await,
    }
}

fn open_store(backend: Option<Backend>, config: &Config) -> anyhow::Result<Arc<dyn DocumentStore>> {
    let backend = backend.unwrap_or(if config.firestore.project.is_some() {
        Backend::Firestore
    } else {
        Backend::Memory
    });

    match backend {
        Backend::Memory => {
            tracing::info!("using in-memory store; nothing is persisted");
            Ok(Arc::new(InMemoryDocumentStore::new()))
        }
        Backend::Firestore => firestore_store(config),
    }
}

#[cfg(feature = "firestore")]
fn firestore_store(config: &Config) -> anyhow::Result<Arc<dyn DocumentStore>> {
    let store = stockroom_infra::store::firestore::FirestoreStore::new(&config.firestore, &config.collection)
        .context("failed to set up firestore store (is STOCKROOM_FIRESTORE_PROJECT set?)")?;
    tracing::info!(collection = %config.collection, "using firestore store");
    Ok(Arc::new(store))
}

#[cfg(not(feature = "firestore"))]
fn firestore_store(_config: &Config) -> anyhow::Result<Arc<dyn DocumentStore>> {
    bail!("this build has no firestore support; rebuild with `--features firestore`")
}

async fn execute(access: &Access, command: Command, format: OutputFormat) -> anyhow::Result<()> {
    match command {
        Command::List(args) => list(access, args, format).await,
        Command::Add(args) => add(access, args, format).await,
        Command::Inc(arg) => {
            let outcome = access.increment_quantity(&ItemName::new(arg.name)).await?;
            print_outcome(outcome, format);
            Ok(())
        }
        Command::Dec(arg) => {
            let outcome = access.decrement_quantity(&ItemName::new(arg.name)).await?;
            print_outcome(outcome, format);
            Ok(())
        }
        Command::Rm(arg) => {
            access.remove(&ItemName::new(arg.name)).await?;
            print_outcome(StockOutcome::Remove, format);
            Ok(())
        }
        Command::Edit(args) => edit(access, args).await,
        Command::Show(arg) => show(access, ItemName::new(arg.name), format).await,
        Command::Categories => {
            let names: Vec<&str> = Category::ALL.iter().map(Category::as_str).collect();
            match format {
                OutputFormat::Text => names.iter().for_each(|n| println!("{n}")),
                OutputFormat::Json => println!("{}", serde_json::to_string(&names)?),
            }
            Ok(())
        }
        Command::Shell => bail!("already in a shell"),
    }
}

async fn list(access: &Access, args: ListArgs, format: OutputFormat) -> anyhow::Result<()> {
    let mut items = access.list(args.category).await?;
    let needle = args.search.to_lowercase();
    items.retain(|item| item.name.as_str().to_lowercase().contains(&needle));
    items.sort_by(|a, b| a.name.cmp(&b.name));

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&items)?),
        OutputFormat::Text if items.is_empty() => println!("(no items)"),
        OutputFormat::Text => {
            println!("{:<24} {:>8}  {:<16} {:>10}  {}", "NAME", "QTY", "CATEGORY", "PRICE", "SUPPLIER");
            for item in &items {
                print_row(item);
            }
        }
    }
    Ok(())
}

fn print_row(item: &InventoryItem) {
    println!(
        "{:<24} {:>8}  {:<16} {:>10}  {}",
        display_name(&item.name),
        item.quantity,
        item.category.as_str(),
        item.price.map(|p| format!("{p:.2}")).unwrap_or_default(),
        item.supplier.as_deref().unwrap_or(""),
    );
}

async fn add(access: &Access, args: AddArgs, format: OutputFormat) -> anyhow::Result<()> {
    let name = ItemName::new(args.name);
    if name.as_str().trim().is_empty() {
        bail!("item name must not be blank");
    }
    let outcome = access
        .add(&name, parse_quantity(&args.quantity), args.category)
        .await?;
    print_outcome(outcome, format);
    Ok(())
}

async fn edit(access: &Access, args: EditArgs) -> anyhow::Result<()> {
    let name = ItemName::new(args.name);
    let patch = MetadataPatch {
        description: args.description,
        price: args.price.filter(|p| p.is_finite()),
        supplier: args.supplier,
    };
    match access.update_metadata(&name, &patch).await {
        Ok(()) => Ok(()),
        Err(InventoryError::NotFound(name)) => bail!("no item named '{name}'"),
        Err(e) => Err(e.into()),
    }
}

async fn show(access: &Access, name: ItemName, format: OutputFormat) -> anyhow::Result<()> {
    let item = access
        .get(&name)
        .await?
        .with_context(|| format!("no item named '{name}'"))?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&item)?),
        OutputFormat::Text => {
            let details = item.details();
            println!("name:        {}", display_name(&item.name));
            println!("quantity:    {}", item.quantity);
            println!("category:    {}", item.category);
            println!("description: {}", details.description);
            println!("price:       {}", details.price);
            println!("supplier:    {}", details.supplier);
        }
    }
    Ok(())
}

fn print_outcome(outcome: StockOutcome, format: OutputFormat) {
    let (kind, quantity) = match outcome {
        StockOutcome::Unchanged => ("unchanged", None),
        StockOutcome::Create(q) => ("created", Some(q)),
        StockOutcome::Set(q) => ("updated", Some(q)),
        StockOutcome::Remove => ("removed", None),
    };
    match (format, quantity) {
        (OutputFormat::Json, _) => {
            println!("{}", serde_json::json!({ "outcome": kind, "quantity": quantity }))
        }
        (OutputFormat::Text, Some(q)) => println!("{kind} (quantity {q})"),
        (OutputFormat::Text, None) => println!("{kind}"),
    }
}

async fn shell(access: &Access, format: OutputFormat) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if matches!(line, "exit" | "quit") {
            break;
        }

        let words = match split_words(line) {
            Ok(words) => words,
            Err(e) => {
                eprintln!("error: {e}");
                continue;
            }
        };
        let parsed = match ShellLine::try_parse_from(words) {
            Ok(parsed) => parsed,
            Err(e) => {
                eprintln!("{e}");
                continue;
            }
        };
        if let Err(e) = execute(access, parsed.command, format).await {
            eprintln!("error: {e:#}");
        }
    }
    Ok(())
}

/// Split a shell line on whitespace, keeping single- or double-quoted runs
/// together so names like "Office Chair" survive.
fn split_words(line: &str) -> Result<Vec<String>, String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;

    for c in line.chars() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), c) => current.push(c),
            (None, '"' | '\'') => {
                quote = Some(c);
                in_word = true;
            }
            (None, c) if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            (None, c) => {
                current.push(c);
                in_word = true;
            }
        }
    }

    if let Some(q) = quote {
        return Err(format!("unterminated {q} quote"));
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}
