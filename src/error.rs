//src/error.rs

use thiserror::Error;

/// Errors raised while assessing clusters.
///
/// Schema and configuration failures are unrecoverable: the run aborts
/// before any output file is written. A contig missing from the marker
/// table is NOT an error; it simply carries an empty profile.
#[derive(Debug, Error)]
pub enum BinqcError {
    /// The cluster table's header does not satisfy the required schema,
    /// or the table uses the reserved `unclaimed` label.
    #[error("{0}")]
    Schema(String),

    /// An unsupported configuration value, e.g. an unknown kingdom.
    #[error("{0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
