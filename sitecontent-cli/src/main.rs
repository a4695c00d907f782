use clap::{Parser, Subcommand, ValueEnum};
use sitecontent::schema::load_collections;
use sitecontent::{CheckReport, CollectionDefinition, ContentStore, ContentWatcher};
use std::path::{Path, PathBuf};
use std::process;

/// sitecontent CLI: check and inspect a site's content collections
#[derive(Parser)]
#[command(name = "sitecontent", version, about)]
struct Cli {
    /// Site root directory (default: current directory)
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Collection config (default: <root>/content.yaml, else built-in collections)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, default_value = "yaml")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    Yaml,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Validate every collection and report all problems
    Check,

    /// List the entries of a collection
    List {
        /// Collection name
        collection: String,
    },

    /// Show a single entry
    Get {
        /// Collection name
        collection: String,
        /// Entry id
        id: String,
    },

    /// Show declared collections and their fields
    Schema {
        /// Only show this collection
        collection: Option<String>,
    },

    /// Export the whole content index
    Export,

    /// Re-run the check whenever content files change
    Watch,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match run(cli) {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("ERROR:{e}");
            process::exit(1);
        }
    }
}

/// Returns whether the content is valid, for commands where that matters.
fn run(cli: Cli) -> Result<bool, Box<dyn std::error::Error>> {
    let collections = load_collections(&cli.root, cli.config.as_deref())?;

    match cli.command {
        Command::Check => {
            let report = ContentStore::check(&cli.root, &collections);
            print_output(&serde_json::to_value(&report)?, &cli.format)?;
            log_summary(&report);
            return Ok(report.is_ok());
        }

        Command::List { collection } => {
            let store = ContentStore::load(&cli.root, &collections)?;
            let records = store.collection(&collection)?;
            print_output(&serde_json::to_value(records)?, &cli.format)?;
        }

        Command::Get { collection, id } => {
            let store = ContentStore::load(&cli.root, &collections)?;
            let record = store.entry(&collection, &id)?;
            print_output(&serde_json::to_value(record)?, &cli.format)?;
        }

        Command::Schema { collection } => {
            let selected: Vec<&CollectionDefinition> = match &collection {
                Some(name) => {
                    let found: Vec<_> = collections.iter().filter(|c| &c.name == name).collect();
                    if found.is_empty() {
                        return Err(format!("Collection not found: {name}").into());
                    }
                    found
                }
                None => collections.iter().collect(),
            };
            print_output(&serde_json::to_value(selected)?, &cli.format)?;
        }

        Command::Export => {
            let store = ContentStore::load(&cli.root, &collections)?;
            print_output(&store.to_json()?, &cli.format)?;
        }

        Command::Watch => {
            watch(&cli.root, &collections, &cli.format)?;
        }
    }

    Ok(true)
}

fn watch(
    root: &Path,
    collections: &[CollectionDefinition],
    format: &OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let watcher = ContentWatcher::start(root, collections)?;
    log::info!("Watching {} collection(s) under {}", collections.len(), root.display());

    let report = ContentStore::check(root, collections);
    print_output(&serde_json::to_value(&report)?, format)?;
    log_summary(&report);

    while let Some(batch) = watcher.next_batch() {
        for change in &batch {
            log::info!("{:?}: {}", change.kind, change.path.display());
        }
        let report = ContentStore::check(root, collections);
        print_output(&serde_json::to_value(&report)?, format)?;
        log_summary(&report);
    }

    Ok(())
}

fn log_summary(report: &CheckReport) {
    if report.is_ok() {
        log::info!("All collections valid");
    } else {
        log::error!("{} problem(s) found", report.issue_count());
    }
}

fn print_output(
    value: &serde_json::Value,
    format: &OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(value)?),
    }
    Ok(())
}
