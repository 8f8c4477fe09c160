//! Option validation, run before any selection file is opened.

use crate::config::{SelectConfig, SelectionMode};
use crate::error::{SelectError, SelectResult};

/// Check that at most one selection mode is requested and that the
/// referenced file exists. Only the file's existence is checked.
///
/// Safe to call any number of times; it has no side effects on success.
///
/// # Errors
/// [`SelectError::ConfigurationConflict`] when both files are given, before
/// touching the filesystem. [`SelectError::SelectionFileNotFound`] when a
/// given path does not exist.
pub fn validate_options(config: &SelectConfig) -> SelectResult<SelectionMode> {
    if config.select_from_file.is_some() && config.deselect_from_file.is_some() {
        return Err(SelectError::ConfigurationConflict);
    }

    for path in [&config.select_from_file, &config.deselect_from_file]
        .into_iter()
        .flatten()
    {
        if !path.exists() {
            return Err(SelectError::SelectionFileNotFound { path: path.clone() });
        }
    }

    Ok(config.mode())
}
