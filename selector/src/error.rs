use std::path::PathBuf;
use thiserror::Error;

use crate::diagnostic::format_unmatched;

/// Errors that abort a selection run
#[derive(Error, Debug)]
pub enum SelectError {
    /// Both selection modes were requested in the same run
    #[error("'--select-from-file' and '--deselect-from-file' can not be used together.")]
    ConfigurationConflict,

    /// A selection file path was given but nothing exists there
    #[error("Given selection file '{}' doesn't exist.", path.display())]
    SelectionFileNotFound { path: PathBuf },

    /// The file exists but could not be read as UTF-8 text
    #[error("Failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Some patterns matched no test and the run was told to fail on that
    #[error("{}", format_unmatched(patterns))]
    MissingSelectionTargets { patterns: Vec<String> },

    /// A configuration file could not be parsed
    #[error("Invalid configuration in '{}': {message}", path.display())]
    InvalidConfig { path: PathBuf, message: String },
}

pub type SelectResult<T> = Result<T, SelectError>;
