//! xefind: report which contexts/environments produced a data type for a set
//! of runs, and how many of those runs are present on each storage location.
//!
//! The pipeline is a straight line: resolve the run set, look up context
//! records and per-location presence for each run, fold into grouped rows,
//! print one table. Everything talks to the run database through an explicit
//! client built once at startup.

use clap::Parser;

mod cli;
mod config;
mod error;
mod report;
mod resolver;
mod rundb;
mod table;

use cli::RootArgs;
use error::XefindError;
use rundb::HttpRunDatabase;

fn main() {
    let args = RootArgs::parse();
    init_logging(args.verbose);

    if let Err(err) = run(&args) {
        let code = err.exit_code();
        eprintln!("error: {:#}", anyhow::Error::from(err));
        std::process::exit(code);
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: &RootArgs) -> Result<(), XefindError> {
    let selection = args.selection()?;
    let locations = args.locations()?;
    let config = config::Config::load()?;
    let db = HttpRunDatabase::new(&config);

    let runs = resolver::resolve(&selection, &db)?;
    tracing::debug!(runs = runs.len(), data_type = %args.data_type, "run set resolved");

    let rows = report::build_report(&db, &runs, &args.data_type, &locations)?;

    if args.json {
        let text = serde_json::to_string_pretty(&rows).expect("serialize report rows");
        println!("{text}");
        return Ok(());
    }

    println!();
    println!("{}", "-".repeat(80));
    println!(" {}", table::headline(&args.data_type, &selection));
    println!();
    print!("{}", table::render(&rows, &locations));
    println!();
    println!("{}", "-".repeat(80));
    Ok(())
}
