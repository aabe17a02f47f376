//! Error taxonomy for the availability report pipeline.
//!
//! Two terminal kinds: usage errors (bad input, nothing was looked up) and
//! collaborator errors (the run database failed mid-report). A run with no
//! registered processing for the requested data type is not an error anywhere
//! in the pipeline; it simply contributes to no row.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum XefindError {
    /// Invalid or conflicting user input, reported before any lookup runs.
    #[error("{0}")]
    Usage(String),

    /// The run database was unreachable or returned malformed data. Fatal for
    /// the whole invocation: a partial table would misrepresent availability.
    #[error("{context}")]
    Collaborator {
        context: String,
        #[source]
        source: anyhow::Error,
    },
}

impl XefindError {
    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage(message.into())
    }

    pub fn collaborator(context: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        Self::Collaborator {
            context: context.into(),
            source: source.into(),
        }
    }

    /// Process exit code for this error. Usage errors share clap's exit code
    /// so callers see one code for all bad-input outcomes.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Usage(_) => 2,
            Self::Collaborator { .. } => 1,
        }
    }
}
