//! Bookstore CLI - manage the local book inventory

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use bookstore::client::InventoryClient;
use bookstore::config::{self, BookstoreConfig};
use bookstore::storage::{SqliteStore, StoreLocation};
use bookstore::ui::{self, Icons};
use bookstore::{BookChanges, BookProvider, NewBook, ResourceUri};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "bookstore")]
#[command(version)]
#[command(about = "Bookstore inventory - list, add, edit, sell and delete books")]
#[command(long_about = r#"
Bookstore keeps a small book inventory in a local SQLite file.

Example usage:
  bookstore init
  bookstore add --name "Fangirl" --price 40 --supplier "SuperNova" --quantity 15
  bookstore sell 1
  bookstore list --sort "price DESC"
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Path to the database file (overrides config)
    #[arg(short, long, global = true)]
    database: Option<PathBuf>,

    /// Print machine-readable JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a config file with explicit defaults
    Init {
        /// Overwrite an existing config
        #[arg(short, long)]
        force: bool,
    },

    /// List all books
    List {
        /// Sort expression, e.g. "price DESC, name"
        #[arg(short, long)]
        sort: Option<String>,
    },

    /// Show one book
    Show {
        id: i64,
    },

    /// Add a book
    Add {
        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        author: Option<String>,

        /// Price in the smallest currency unit
        #[arg(short, long)]
        price: i64,

        #[arg(short, long, default_value = "0")]
        quantity: i64,

        #[arg(short, long)]
        supplier: String,

        #[arg(long)]
        supplier_number: Option<String>,
    },

    /// Change fields of a book; omitted fields are left alone
    Edit {
        id: i64,

        #[arg(short, long)]
        name: Option<String>,

        #[arg(short, long)]
        author: Option<String>,

        #[arg(short, long)]
        price: Option<i64>,

        #[arg(short, long)]
        quantity: Option<i64>,

        #[arg(short, long)]
        supplier: Option<String>,

        #[arg(long)]
        supplier_number: Option<String>,
    },

    /// Sell one copy of a book
    Sell {
        id: i64,
    },

    /// Add stock to a book
    Restock {
        id: i64,

        #[arg(short, long, default_value = "1")]
        amount: i64,
    },

    /// Delete one book, or every book with --all
    Delete {
        #[arg(required_unless_present = "all", conflicts_with = "all")]
        id: Option<i64>,

        #[arg(long)]
        all: bool,
    },

    /// Insert a sample book
    Seed,

    /// Print the MIME type of a content URI
    Type {
        uri: String,
    },

    /// Show inventory statistics
    Stats,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let config_path = cli.config.clone().unwrap_or_else(config::default_config_path);

    if let Commands::Init { force } = cli.command {
        let config = BookstoreConfig {
            database: Some(
                cli.database
                    .unwrap_or_else(|| config::default_database_path_in(std::path::Path::new(".")))
                    .to_string_lossy()
                    .to_string(),
            ),
            migration: Some(Default::default()),
        };
        config::write_config(&config_path, &config, force)?;
        ui::success(&format!("Wrote {}", config_path.display()));
        return Ok(());
    }

    let config = config::load_config(Some(&config_path))?.unwrap_or_default();
    let database = cli.database.clone().unwrap_or_else(|| config.database_path());
    config::ensure_db_dir(&database)?;

    // Without storage nothing can be served; failing here ends the process.
    let store = SqliteStore::new(StoreLocation::File(database.clone()), config.migration_policy());
    store
        .ensure_open()
        .with_context(|| format!("cannot open database {}", database.display()))?;

    let provider = Arc::new(BookProvider::new(store));
    let client = InventoryClient::new(Arc::clone(&provider));

    match cli.command {
        Commands::Init { .. } => unreachable!("handled above"),

        Commands::List { sort } => {
            let books = match sort {
                Some(order) => client.books_sorted(&order)?,
                None => client.books()?,
            };
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&books)?);
            } else if books.is_empty() {
                println!("{} No books in the inventory.", Icons::EMPTY);
            } else {
                ui::header(&format!("{} book(s)", books.len()));
                println!("{}", ui::books_table(&books));
            }
        }

        Commands::Show { id } => {
            let Some(book) = client.book(id)? else {
                anyhow::bail!("no book with id {}", id);
            };
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&book)?);
            } else {
                println!("{} {}", Icons::BOOK, book.name);
                ui::summary_row("Author:", book.display_author());
                ui::summary_row("Price:", &book.price.to_string());
                ui::summary_row("Quantity:", &book.quantity.to_string());
                ui::summary_row("Supplier:", &book.supplier_name);
                if let Some(number) = &book.supplier_number {
                    ui::summary_row(&format!("{} Phone:", Icons::PHONE), number);
                }
                ui::summary_row("URI:", &bookstore::contract::item_uri(book.id).to_string());
            }
        }

        Commands::Add { name, author, price, quantity, supplier, supplier_number } => {
            let book = NewBook {
                name,
                author,
                price,
                quantity,
                supplier_name: supplier,
                supplier_number,
            };
            match client.add_book(&book)? {
                Some(id) => {
                    if cli.json {
                        println!("{}", serde_json::json!({ "id": id, "uri": bookstore::contract::item_uri(id) }));
                    } else {
                        ui::success(&format!("{} Book saved with id {}", Icons::NEW, id));
                    }
                }
                None => anyhow::bail!("save unsuccessful"),
            }
        }

        Commands::Edit { id, name, author, price, quantity, supplier, supplier_number } => {
            let changes = BookChanges {
                name,
                author,
                price,
                quantity,
                supplier_name: supplier,
                supplier_number,
            };
            if changes.is_empty() {
                ui::warn("Nothing to change");
                return Ok(());
            }
            let updated = client.edit(id, &changes)?;
            if updated == 0 {
                anyhow::bail!("no book with id {}", id);
            }
            ui::success("Book updated");
        }

        Commands::Sell { id } => {
            let Some(change) = client.adjust_quantity(id, -1)? else {
                anyhow::bail!("no book with id {}", id);
            };
            if cli.json {
                println!("{}", serde_json::to_string(&change)?);
            } else if !change.changed() {
                ui::warn("Out of stock");
            } else {
                ui::success(&format!("{} Sold one copy, {} left", Icons::CART, change.after));
            }
        }

        Commands::Restock { id, amount } => {
            if amount < 0 {
                anyhow::bail!("restock amount must not be negative");
            }
            let Some(change) = client.restock(id, amount)? else {
                anyhow::bail!("no book with id {}", id);
            };
            if cli.json {
                println!("{}", serde_json::to_string(&change)?);
            } else {
                ui::success(&format!("{} Stock {} -> {}", Icons::PACKAGE, change.before, change.after));
            }
        }

        Commands::Delete { id, all } => {
            let deleted = if all {
                client.delete_all()?
            } else {
                let id = id.context("an id or --all is required")?;
                usize::from(client.delete_book(id)?)
            };
            if cli.json {
                println!("{}", serde_json::json!({ "deleted": deleted }));
            } else if deleted == 0 {
                ui::warn("Delete unsuccessful");
            } else {
                ui::success(&format!("{} Deleted {} row(s)", Icons::DEL, deleted));
            }
        }

        Commands::Seed => match client.insert_sample_book()? {
            Some(id) => ui::success(&format!("Inserted sample book with id {}", id)),
            None => anyhow::bail!("could not insert sample book"),
        },

        Commands::Type { uri } => {
            let uri = ResourceUri::parse(&uri)?;
            println!("{}", provider.get_type(&uri)?);
        }

        Commands::Stats => {
            let books = client.books()?;
            let copies: i64 = books.iter().map(|b| b.quantity).sum();
            let out_of_stock = books.iter().filter(|b| b.quantity == 0).count();
            let stock_value: i64 = books.iter().map(|b| b.price.saturating_mul(b.quantity)).sum();
            let version = provider.store().schema_version()?;

            if cli.json {
                println!(
                    "{}",
                    serde_json::json!({
                        "database": database,
                        "schema_version": version,
                        "titles": books.len(),
                        "copies": copies,
                        "out_of_stock": out_of_stock,
                        "stock_value": stock_value,
                    })
                );
            } else {
                println!("{} Bookstore Statistics ({})", Icons::STATS, database.display());
                let titles = books.len().to_string();
                let copies = copies.to_string();
                let out_of_stock = out_of_stock.to_string();
                let stock_value = stock_value.to_string();
                let version = version.to_string();
                println!(
                    "{}",
                    ui::stats_table(&[
                        ("Titles", &titles),
                        ("Copies", &copies),
                        ("Out of stock", &out_of_stock),
                        ("Stock value", &stock_value),
                        ("Schema version", &version),
                    ])
                );
            }
        }
    }

    Ok(())
}
