//! Coffeehouse CLI - run the example table mappings and queries from a shell

mod commands;

use clap::{Parser, Subcommand};
use coffeehouse::config;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "coffeehouse")]
#[command(version)]
#[command(about = "Typed table mappings and composable queries over SQLite")]
#[command(long_about = r#"
Coffeehouse maps a SUPPLIERS and a COFFEES table onto Rust records and runs
example queries against them: filters, joins, unions, aggregates.

Example usage:
  coffeehouse setup
  coffeehouse coffees --max-price 9
  coffeehouse menu
  coffeehouse sql "SELECT COF_NAME, PRICE FROM COFFEES WHERE PRICE > 9"
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    /// Connection string (sqlite://path, sqlite::memory:, or a file path)
    #[arg(short, long, global = true)]
    database: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write coffeehouse.toml in the current directory
    Init {
        /// Overwrite an existing config
        #[arg(long)]
        force: bool,
    },

    /// Recreate the schema and insert the seed data
    Setup,

    /// List suppliers
    Suppliers {
        /// Sort by zip code, ascending
        #[arg(long)]
        sort_by_zip: bool,
    },

    /// List coffees
    Coffees {
        /// Only coffees priced at or below this value
        #[arg(long)]
        max_price: Option<f64>,

        /// Only coffees from this supplier id
        #[arg(long)]
        supplier: Option<i64>,
    },

    /// Coffee names with their supplier's name
    Menu,

    /// Cheapest and most expensive price
    Prices,

    /// Show row counts
    Stats,

    /// Run raw SQL and print the rows
    Sql {
        /// SQL text
        query: String,
    },

    /// Print version information
    Version,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
}

impl OutputMode {
    pub fn is_human(&self) -> bool {
        matches!(self, OutputMode::Human)
    }
}

/// Print the JSON envelope for a successful command
pub fn emit_success(mode: OutputMode, command: &str, data: serde_json::Value) -> anyhow::Result<()> {
    if mode == OutputMode::Json {
        let envelope = serde_json::json!({
            "ok": true,
            "command": command,
            "data": data,
        });
        println!("{}", serde_json::to_string_pretty(&envelope)?);
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let output_mode = if cli.json { OutputMode::Json } else { OutputMode::Human };

    let cwd = std::env::current_dir()?;
    let loaded = config::load_config(None)?;
    let target = config::resolve_target(cli.database.as_deref(), loaded.as_ref(), &cwd)?;
    tracing::debug!(%target, "resolved database");

    let result = match cli.command {
        Commands::Init { force } => commands::run_init(output_mode, &target, force),
        Commands::Setup => commands::run_setup(output_mode, &target),
        Commands::Suppliers { sort_by_zip } => commands::run_suppliers(output_mode, &target, sort_by_zip),
        Commands::Coffees { max_price, supplier } => {
            commands::run_coffees(output_mode, &target, max_price, supplier)
        }
        Commands::Menu => commands::run_menu(output_mode, &target),
        Commands::Prices => commands::run_prices(output_mode, &target),
        Commands::Stats => commands::run_stats(output_mode, &target),
        Commands::Sql { query } => commands::run_sql(output_mode, &target, &query),
        Commands::Version => commands::run_version(output_mode),
    };

    if let Err(err) = result {
        if output_mode.is_human() {
            coffeehouse::ui::printer().error(&format!("{:#}", err));
        } else {
            let envelope = serde_json::json!({ "ok": false, "error": format!("{:#}", err) });
            println!("{}", serde_json::to_string_pretty(&envelope)?);
        }
        std::process::exit(1);
    }
    Ok(())
}
