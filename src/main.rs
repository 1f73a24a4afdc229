#![deny(
    warnings,
    missing_debug_implementations,
    missing_docs,
    clippy::all,
    clippy::pedantic,
    clippy::nursery
)]
//! `FacetFind` - Filter a garment catalog by color and size with faceted counts.

use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser, Subcommand};
use clap_cargo::style::CLAP_STYLING;
use env_logger::{Builder, Env};
use facetfind::{Catalog, Dimension, FacetCount, FacetValue, Result, SearchOptions};
use log::{LevelFilter, debug};

/// CLI arguments for `FacetFind`
#[derive(Parser, Debug)]
#[command(author, version, about, styles = CLAP_STYLING)]
struct Cli {
    /// Increase log output (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Command {
    /// Filter the catalog and show facet counts
    Search {
        /// Catalog file (TOML); the sample catalog is used when omitted
        #[arg(short, long)]
        catalog: Option<PathBuf>,
        /// Colors to match, repeatable or comma separated (default: any)
        #[arg(long = "color", value_delimiter = ',')]
        colors:  Vec<String>,
        /// Sizes to match, repeatable or comma separated (default: any)
        #[arg(long = "size", value_delimiter = ',')]
        sizes:   Vec<String>,
    },
    /// List the known sizes and colors
    Values {
        /// Catalog file (TOML); the sample catalog is used when omitted
        #[arg(short, long)]
        catalog: Option<PathBuf>,
    },
}

/// Install the logger; `RUST_LOG` wins over `--verbose`
fn setup_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    let mut builder = Builder::new();
    builder.filter_level(level);
    builder.parse_env(Env::default());
    builder.format_timestamp(None);
    builder.init();
}

/// Load the catalog at `path`, or the sample catalog
fn load_catalog(path: Option<&Path>) -> Result<Catalog> {
    match path {
        Some(path) => Catalog::load(path),
        None => {
            debug!("No catalog given, using the sample catalog");
            Ok(Catalog::sample())
        },
    }
}

/// Print one facet count table
fn print_counts<V: FacetValue>(title: &str, dimension: &Dimension<V>, counts: &[FacetCount<V>]) {
    println!("\n{title}:");
    for entry in counts {
        println!("  {:<12} {:>5}", dimension.label(entry.value).unwrap_or("?"), entry.count);
    }
}

/// Search the catalog and print matches with facet counts
fn search_catalog(path: Option<&Path>, colors: &[String], sizes: &[String]) -> Result<()> {
    let catalog = load_catalog(path)?;
    let options = SearchOptions::from_labels(catalog.schema(), colors, sizes)?;
    let engine = catalog.into_engine();
    let schema = engine.schema();

    let results = engine.search(Some(&options))?;

    if results.items.is_empty() {
        println!("No matches found.");
        println!("Tips:");
        println!("  - Try fewer colors or sizes");
        println!("  - Run 'facet values' to see what the catalog knows");
    } else {
        println!("Found {} matches:", results.items.len());
        println!("{:<24} | {:<8} | {:<8} | Id", "Name", "Size", "Color");
        println!("{:-<24}-|-{:-<8}-|-{:-<8}-|-{:-<36}", "", "", "", "");
        for item in &results.items {
            println!(
                "{:<24} | {:<8} | {:<8} | {}",
                item.name,
                schema.sizes.label(item.size).unwrap_or("?"),
                schema.colors.label(item.color).unwrap_or("?"),
                item.id
            );
        }
    }

    print_counts("Sizes", &schema.sizes, &results.size_counts);
    print_counts("Colors", &schema.colors, &results.color_counts);

    Ok(())
}

/// Print every dimension value of the catalog
fn list_values(path: Option<&Path>) -> Result<()> {
    let catalog = load_catalog(path)?;
    let schema = catalog.schema();

    let sizes: Vec<&str> = schema.sizes.all().filter_map(|s| schema.sizes.label(s)).collect();
    let colors: Vec<&str> = schema.colors.all().filter_map(|c| schema.colors.label(c)).collect();
    println!("Sizes:  {}", sizes.join(", "));
    println!("Colors: {}", colors.join(", "));
    println!("Items:  {}", catalog.items().len());

    Ok(())
}

fn main() {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let result = match cli.command {
        Command::Search { catalog, colors, sizes } => {
            search_catalog(catalog.as_deref(), &colors, &sizes)
        },
        Command::Values { catalog } => list_values(catalog.as_deref()),
    };

    if let Err(e) = result {
        eprintln!("{}", e.user_message());
        std::process::exit(1);
    }
}
