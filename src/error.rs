//! Crate-wide error type. Parse problems carry a source hint (file path or
//! offending string) so a fault in a hundred-thousand-file load can be
//! traced back to its record.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// A structure file, property table line or SMILES string that does not
    /// follow the expected format.
    #[error("malformed record ({source_hint}): {reason}")]
    MalformedRecord { source_hint: String, reason: String },

    /// An operation invoked before its prerequisite state exists.
    #[error("not ready: {0}")]
    NotReady(&'static str),

    #[error(
        "invalid split proportions: p_test={p_test}, p_valid={p_valid}, p_train={p_train:?}"
    )]
    InvalidProportions {
        p_test: f64,
        p_valid: f64,
        p_train: Option<f64>,
    },

    #[error("split index sets overlap: {0}")]
    OverlappingSplit(String),

    #[error("unknown featurizer mode {0:?}")]
    UnknownMode(String),

    /// A required path was neither passed explicitly nor set in the
    /// environment.
    #[error("no path given and environment variable {0} is unset")]
    ConfigurationMissing(&'static str),

    #[error("index {index} is out of range for length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("snapshot failure at {path:?}: {reason}")]
    Snapshot { path: PathBuf, reason: String },
}

impl Error {
    pub fn malformed(source_hint: impl std::fmt::Display, reason: impl std::fmt::Display) -> Self {
        Error::MalformedRecord {
            source_hint: source_hint.to_string(),
            reason: reason.to_string(),
        }
    }
}
