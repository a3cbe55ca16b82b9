//! Error types for acomodar operations.

use thiserror::Error;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in acomodar operations.
#[derive(Error, Debug)]
pub enum Error {
    /// A move or grouping was configured with variables that cannot be
    /// resolved (e.g. a dodge override naming an unknown variable).
    #[error("Configuration error: {0}")]
    Config(String),

    /// A required column is missing from the input table.
    #[error("Missing required column: `{column}`")]
    MissingColumn {
        /// Name of the missing column.
        column: String,
    },
}
