//! CLI argument parsing for the availability report.
//!
//! The CLI is intentionally thin: clap enforces the mutually exclusive
//! run-selection group, and `RunSelection` captures the surviving mode as a
//! tagged variant so the rest of the pipeline never re-checks flag
//! combinations.

use clap::builder::PossibleValuesParser;
use clap::{ArgGroup, Parser};
use regex::Regex;
use std::path::PathBuf;

use crate::error::XefindError;
use crate::rundb::{RunId, DEFAULT_LOCATIONS};

/// Science-run labels known to the run database.
pub const SCIENCE_RUNS: [&str; 3] = ["sr0", "sr0_ted", "sr1"];

/// Science runs checked when `--source` is given without `--science-run`.
const DEFAULT_SCIENCE_RUNS: [&str; 2] = ["sr0", "sr1"];

/// Rucio RSE names are uppercase alphanumerics and underscores.
const LOCATION_PATTERN: &str = "^[A-Z0-9_]+$";

#[derive(Parser, Debug)]
#[command(
    name = "xefind",
    version,
    about = "Report processed-data availability across contexts and storage locations",
    after_help = "Examples:\n  xefind peaklets --science-run sr1 --source none\n  xefind peak_basics --filename /path/to/runs.txt\n  xefind event_info --run-id 050001 --extra-location SDSC_USERDISK"
)]
#[command(group(
    ArgGroup::new("selection")
        .required(true)
        .multiple(false)
        .args(["run_id", "filename", "source"])
))]
pub struct RootArgs {
    /// Data type to check (e.g. peaklets, event_info)
    pub data_type: String,

    /// Single run id to check
    #[arg(long, value_name = "ID")]
    pub run_id: Option<String>,

    /// File with one run id per line
    #[arg(long, value_name = "PATH")]
    pub filename: Option<PathBuf>,

    /// Source(s) to check (e.g. none, rn-220, th-232)
    #[arg(long, value_name = "LABEL", num_args = 1..)]
    pub source: Option<Vec<String>>,

    /// Science run(s) to combine with --source (default: sr0 sr1)
    #[arg(
        long,
        value_name = "LABEL",
        num_args = 1..,
        requires = "source",
        value_parser = PossibleValuesParser::new(SCIENCE_RUNS)
    )]
    pub science_run: Option<Vec<String>>,

    /// One storage location to check on top of the defaults
    #[arg(long, value_name = "NAME")]
    pub extra_location: Option<String>,

    /// Emit aggregated rows as JSON instead of a table
    #[arg(long)]
    pub json: bool,

    /// Debug-level logging on stderr
    #[arg(short, long)]
    pub verbose: bool,
}

/// Run-selection mode, resolved once at the CLI boundary.
#[derive(Debug, Clone)]
pub enum RunSelection {
    SingleRun(RunId),
    FileList(PathBuf),
    Filter {
        science_runs: Vec<String>,
        sources: Vec<String>,
    },
}

impl RootArgs {
    /// Collapse the clap-validated flags into a single selection variant.
    pub fn selection(&self) -> Result<RunSelection, XefindError> {
        if let Some(run_id) = &self.run_id {
            return Ok(RunSelection::SingleRun(RunId::new(run_id.trim())));
        }
        if let Some(path) = &self.filename {
            return Ok(RunSelection::FileList(path.clone()));
        }
        if let Some(sources) = &self.source {
            let science_runs = self.science_run.clone().unwrap_or_else(|| {
                DEFAULT_SCIENCE_RUNS.iter().map(|label| label.to_string()).collect()
            });
            return Ok(RunSelection::Filter {
                science_runs,
                sources: sources.clone(),
            });
        }
        // clap's required group makes this unreachable from the command line.
        Err(XefindError::usage(
            "one of --run-id, --filename or --source is required",
        ))
    }

    /// Storage locations to check: the fixed defaults plus at most one extra.
    pub fn locations(&self) -> Result<Vec<String>, XefindError> {
        let mut locations: Vec<String> = DEFAULT_LOCATIONS
            .iter()
            .map(|location| location.to_string())
            .collect();
        if let Some(extra) = &self.extra_location {
            let pattern = Regex::new(LOCATION_PATTERN).unwrap();
            if !pattern.is_match(extra) {
                return Err(XefindError::usage(format!(
                    "invalid storage location {extra:?} (expected uppercase name like UC_DALI_USERDISK)"
                )));
            }
            if !locations.iter().any(|location| location == extra) {
                locations.push(extra.clone());
            }
        }
        Ok(locations)
    }
}
