use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("result {result_id} in race {raceid} has no race metadata")]
    MissingMeta { raceid: String, result_id: i64 },

    #[error("race {raceid} has no poll closing bucket")]
    MissingPollClosing { raceid: String },

    #[error("county-level result in race {raceid} has no fips code")]
    MissingFipsCode { raceid: String },

    #[error("party bucket '{party}' is not part of the balance of power tally")]
    UnknownParty { party: String },

    #[error("malformed row from result store: {0}")]
    Decode(String),

    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode {name}: {source}")]
    Json {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("result store query failed: {0}")]
    Store(#[from] sqlx::Error),

    #[error("render unit '{unit}' failed: {source}")]
    Unit {
        unit: String,
        #[source]
        source: Box<RenderError>,
    },

    #[error("render unit '{unit}' panicked or was cancelled: {message}")]
    Worker { unit: String, message: String },

    #[error("{} render unit(s) failed", .0.len())]
    Batch(Vec<RenderError>),
}

impl RenderError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        RenderError::Io {
            path: path.into(),
            source,
        }
    }
}
