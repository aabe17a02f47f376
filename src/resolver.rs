//! Run-set resolution.
//!
//! Turns the selected input mode into a deduplicated, order-stable run list
//! before any metadata lookup happens. File lists keep file order; filter
//! queries keep registry order, visiting the science-run x source cartesian
//! product in the order given.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::cli::RunSelection;
use crate::error::XefindError;
use crate::rundb::{RunDatabase, RunId};

/// Resolve the selection into a concrete run list.
pub fn resolve(
    selection: &RunSelection,
    db: &dyn RunDatabase,
) -> Result<Vec<RunId>, XefindError> {
    match selection {
        RunSelection::SingleRun(run) => Ok(vec![run.clone()]),
        RunSelection::FileList(path) => runs_from_file(path),
        RunSelection::Filter {
            science_runs,
            sources,
        } => runs_from_filter(science_runs, sources, db),
    }
}

fn runs_from_file(path: &Path) -> Result<Vec<RunId>, XefindError> {
    let text = fs::read_to_string(path).map_err(|err| {
        XefindError::usage(format!("cannot read run list {}: {err}", path.display()))
    })?;

    let mut seen = HashSet::new();
    let mut runs = Vec::new();
    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let run = RunId::new(trimmed);
        if seen.insert(run.clone()) {
            runs.push(run);
        }
    }

    if runs.is_empty() {
        return Err(XefindError::usage(format!(
            "run list {} contains no run ids",
            path.display()
        )));
    }
    Ok(runs)
}

fn runs_from_filter(
    science_runs: &[String],
    sources: &[String],
    db: &dyn RunDatabase,
) -> Result<Vec<RunId>, XefindError> {
    let mut seen = HashSet::new();
    let mut runs = Vec::new();
    for science_run in science_runs {
        for source in sources {
            let matched = db.runs_matching(science_run, source)?;
            tracing::debug!(%science_run, %source, matched = matched.len(), "registry query");
            for run in matched {
                if seen.insert(run.clone()) {
                    runs.push(run);
                }
            }
        }
    }

    if runs.is_empty() {
        return Err(XefindError::usage(format!(
            "no runs matched science runs [{}] with sources [{}]",
            science_runs.join(", "),
            sources.join(", ")
        )));
    }
    Ok(runs)
}
