//! Availability aggregation across the resolved run set.
//!
//! One row per distinct (context, environment, lineage hash, versions) tuple
//! observed across the run set, in the order the run database first supplied
//! it. A run with no context records for the data type contributes to no row:
//! the table reports combinations that exist, not combinations the user hoped
//! existed.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::error::XefindError;
use crate::rundb::{AvailabilityCount, ContextRecord, RunDatabase, RunId};

/// One aggregated output row.
#[derive(Debug, Clone, Serialize)]
pub struct ReportRow {
    pub context: String,
    pub environment: String,
    pub checked: u64,
    pub lineage_hash: String,
    pub strax: String,
    pub straxen: String,
    pub cutax: String,
    /// Summed presence per storage location.
    pub locations: BTreeMap<String, AvailabilityCount>,
}

impl ReportRow {
    fn new(record: &ContextRecord, locations: &[String]) -> Self {
        Self {
            context: record.context.clone(),
            environment: record.environment.clone(),
            checked: 0,
            lineage_hash: record.lineage_hash.clone(),
            strax: record.strax.clone(),
            straxen: record.straxen.clone(),
            cutax: record.cutax.clone(),
            locations: locations
                .iter()
                .map(|location| (location.clone(), AvailabilityCount::default()))
                .collect(),
        }
    }

    /// Grouping is on the full tuple: the lineage hash encodes the actual
    /// processing recipe, so same-named contexts with different hashes stay
    /// separate rows.
    fn matches(&self, record: &ContextRecord) -> bool {
        self.context == record.context
            && self.environment == record.environment
            && self.lineage_hash == record.lineage_hash
            && self.strax == record.strax
            && self.straxen == record.straxen
            && self.cutax == record.cutax
    }
}

/// Walk the run set, look up metadata and availability for each run, and fold
/// the results into grouped rows.
pub fn build_report(
    db: &dyn RunDatabase,
    runs: &[RunId],
    data_type: &str,
    locations: &[String],
) -> Result<Vec<ReportRow>, XefindError> {
    let mut rows: Vec<ReportRow> = Vec::new();

    for run in runs {
        let records = db.contexts(run, data_type)?;
        if records.is_empty() {
            tracing::debug!(run = %run, data_type, "no registered processing");
            continue;
        }
        for record in &records {
            let counts = db.availability(run, data_type, record, locations)?;
            let index = match rows.iter().position(|row| row.matches(record)) {
                Some(index) => index,
                None => {
                    rows.push(ReportRow::new(record, locations));
                    rows.len() - 1
                }
            };
            let row = &mut rows[index];
            row.checked += 1;
            for location in locations {
                let count = counts.get(location).copied().unwrap_or_default();
                if let Some(tally) = row.locations.get_mut(location) {
                    tally.present += count.present;
                    tally.expected += count.expected;
                }
            }
        }
    }

    Ok(rows)
}
