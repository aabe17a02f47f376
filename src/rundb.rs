//! Run database client.
//!
//! The metadata database exposes a JSON HTTP API: a run registry filtered by
//! science run and source, per-run context records, and per-run file presence
//! by storage location. One blocking agent is built from the resolved config
//! at startup and passed by reference into the pipeline; there is no ambient
//! connection state.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Instant;

use crate::config::Config;
use crate::error::XefindError;

/// Storage locations checked on every invocation.
pub const DEFAULT_LOCATIONS: [&str; 2] = ["UC_DALI_USERDISK", "UC_MIDWAY_USERDISK"];

/// Opaque run identifier. Zero-padded run numbers round-trip unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(String);

impl RunId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One versioned processing configuration attached to a run.
///
/// Two records sharing a lineage hash used an identical processing recipe;
/// records that differ only in lineage hash must never be merged downstream.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ContextRecord {
    #[serde(rename = "name")]
    pub context: String,
    #[serde(rename = "tag")]
    pub environment: String,
    pub lineage_hash: String,
    #[serde(rename = "strax_version")]
    pub strax: String,
    #[serde(rename = "straxen_version")]
    pub straxen: String,
    #[serde(rename = "cutax_version")]
    pub cutax: String,
}

/// File presence at one storage location.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityCount {
    pub present: u64,
    pub expected: u64,
}

impl AvailabilityCount {
    /// Display percentage, rounded to one decimal. Zero expected means 0.0,
    /// never a division fault.
    pub fn percentage(&self) -> f64 {
        if self.expected == 0 {
            return 0.0;
        }
        let pct = self.present as f64 * 100.0 / self.expected as f64;
        (pct * 10.0).round() / 10.0
    }
}

/// Read-side interface to the run database.
pub trait RunDatabase {
    /// Run ids registered for one (science run, source) combination, in
    /// registry order.
    fn runs_matching(&self, science_run: &str, source: &str) -> Result<Vec<RunId>, XefindError>;

    /// Context records that produced `data_type` for `run`, newest first.
    /// Empty means the run has no registered processing for that data type.
    fn contexts(&self, run: &RunId, data_type: &str) -> Result<Vec<ContextRecord>, XefindError>;

    /// Per-location presence counts for one (run, context record) pair.
    /// Locations absent from the response count as zero present and zero
    /// expected.
    fn availability(
        &self,
        run: &RunId,
        data_type: &str,
        record: &ContextRecord,
        locations: &[String],
    ) -> Result<BTreeMap<String, AvailabilityCount>, XefindError>;
}

#[derive(Debug, Deserialize)]
struct RunsResponse {
    runs: Vec<RunId>,
}

#[derive(Debug, Deserialize)]
struct ContextsResponse {
    contexts: Vec<ContextRecord>,
}

#[derive(Debug, Deserialize)]
struct AvailabilityResponse {
    locations: BTreeMap<String, AvailabilityCount>,
}

/// Blocking HTTP client for the run database API.
pub struct HttpRunDatabase {
    agent: ureq::Agent,
    base_url: String,
    token: Option<String>,
}

impl HttpRunDatabase {
    pub fn new(config: &Config) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(config.timeout))
            .build()
            .into();
        Self {
            agent,
            base_url: config.rundb_url.trim_end_matches('/').to_string(),
            token: config.rundb_token.clone(),
        }
    }

    fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, XefindError> {
        let url = format!("{}{}", self.base_url, path);
        let started = Instant::now();

        let mut request = self.agent.get(&url);
        for (key, value) in query {
            request = request.query(*key, *value);
        }
        if let Some(token) = &self.token {
            request = request.header("Authorization", format!("Bearer {token}"));
        }

        let mut response = request
            .call()
            .map_err(|err| XefindError::collaborator(format!("GET {path} failed"), err))?;
        let status = response.status();
        let body: T = response.body_mut().read_json().map_err(|err| {
            XefindError::collaborator(format!("GET {path} returned malformed JSON"), err)
        })?;

        let elapsed_ms = started.elapsed().as_millis();
        tracing::debug!(path, %status, elapsed_ms, "rundb request complete");
        Ok(body)
    }
}

impl RunDatabase for HttpRunDatabase {
    fn runs_matching(&self, science_run: &str, source: &str) -> Result<Vec<RunId>, XefindError> {
        let body: RunsResponse = self.get_json(
            "/runs",
            &[("science_run", science_run), ("source", source)],
        )?;
        Ok(body.runs)
    }

    fn contexts(&self, run: &RunId, data_type: &str) -> Result<Vec<ContextRecord>, XefindError> {
        let path = format!("/runs/{run}/contexts");
        let body: ContextsResponse = self.get_json(&path, &[("data_type", data_type)])?;
        Ok(body.contexts)
    }

    fn availability(
        &self,
        run: &RunId,
        data_type: &str,
        record: &ContextRecord,
        locations: &[String],
    ) -> Result<BTreeMap<String, AvailabilityCount>, XefindError> {
        let path = format!("/runs/{run}/availability");
        let joined = locations.join(",");
        let body: AvailabilityResponse = self.get_json(
            &path,
            &[
                ("data_type", data_type),
                ("lineage_hash", &record.lineage_hash),
                ("locations", &joined),
            ],
        )?;
        Ok(body.locations)
    }
}
