//! Error type shared by every `tabkit_io_*` crate.

use std::io;

use thiserror::Error;

/// Failure raised by an export or import call.
#[derive(Debug, Error)]
pub enum TableError {
    /// Invalid header, options, or column count; raised before any byte is written.
    #[error("configuration error: {0}")]
    Config(String),
    /// Unknown or unsupported character encoding label.
    #[error("unsupported encoding: {0}")]
    Encoding(String),
    /// Sink or source failure.
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },
    /// Flush/close/save failure reported under the strict finalize policy.
    #[error("finalize error: {0}")]
    Finalize(String),
    /// Malformed delimited input.
    #[error("parse error: {0}")]
    Parse(String),
    /// Row ceiling of the target container exceeded.
    #[error("limit exceeded: {0}")]
    Limit(String),
    /// Spreadsheet backend failure.
    #[error("xlsx write error: {0}")]
    Xlsx(String),
    /// DataFrame source failure.
    #[error("dataframe error: {0}")]
    Frame(String),
}

impl TableError {
    /// Wrap an IO error with a short description of the failed step.
    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, TableError>;
