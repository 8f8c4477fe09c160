use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{SelectError, SelectResult};

/// Whether matched tests are kept, discarded, or no selection happens at all
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectionMode {
    /// Keep only tests matching a pattern
    Select,
    /// Drop tests matching a pattern
    Deselect,
    /// No selection file given; the collection passes through
    Inactive,
}

impl SelectionMode {
    pub fn is_active(&self) -> bool {
        !matches!(self, SelectionMode::Inactive)
    }
}

/// Options controlling one selection run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct SelectConfig {
    pub select_from_file: Option<PathBuf>,
    pub deselect_from_file: Option<PathBuf>,
    pub fail_on_missing: bool,
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    select: SelectConfig,
}

impl SelectConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_select_from_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.select_from_file = Some(path.into());
        self
    }

    pub fn with_deselect_from_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.deselect_from_file = Some(path.into());
        self
    }

    pub fn with_fail_on_missing(mut self, fail_on_missing: bool) -> Self {
        self.fail_on_missing = fail_on_missing;
        self
    }

    /// Mode implied by the two file options.
    ///
    /// When both are set this reports [`SelectionMode::Select`]; callers are
    /// expected to run [`crate::validate_options`] first, which rejects that case.
    pub fn mode(&self) -> SelectionMode {
        match (&self.select_from_file, &self.deselect_from_file) {
            (Some(_), _) => SelectionMode::Select,
            (None, Some(_)) => SelectionMode::Deselect,
            (None, None) => SelectionMode::Inactive,
        }
    }

    /// The selection file for the active mode, if any
    pub fn selection_file(&self) -> Option<&Path> {
        self.select_from_file
            .as_deref()
            .or(self.deselect_from_file.as_deref())
    }

    /// Parse the `[select]` table of a TOML document.
    ///
    /// Relative selection file paths are left untouched; see [`Self::load`]
    /// for resolution against the config file location.
    pub fn from_toml_str(source: &str) -> Result<Self, toml::de::Error> {
        let file: ConfigFile = toml::from_str(source)?;
        Ok(file.select)
    }

    /// Read a TOML config file. Relative selection paths resolve against the
    /// directory holding the file.
    ///
    /// # Errors
    /// Returns [`SelectError::Io`] when the file can't be read and
    /// [`SelectError::InvalidConfig`] when it isn't valid TOML.
    pub fn load(path: &Path) -> SelectResult<Self> {
        let source = fs::read_to_string(path).map_err(|source| SelectError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml_str(&source).map_err(|e| SelectError::InvalidConfig {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let base = path.parent().unwrap_or_else(|| Path::new(""));
        config.select_from_file = config.select_from_file.map(|p| base.join(p));
        config.deselect_from_file = config.deselect_from_file.map(|p| base.join(p));
        Ok(config)
    }

    /// Overlay `overrides` on top of `self`. Any file option given in
    /// `overrides` replaces both file options, so a command line choosing
    /// one mode is not combined with the other mode from a config file.
    pub fn merge(self, overrides: SelectConfig) -> Self {
        let files_overridden =
            overrides.select_from_file.is_some() || overrides.deselect_from_file.is_some();
        let (select_from_file, deselect_from_file) = if files_overridden {
            (overrides.select_from_file, overrides.deselect_from_file)
        } else {
            (self.select_from_file, self.deselect_from_file)
        };

        Self {
            select_from_file,
            deselect_from_file,
            fail_on_missing: self.fail_on_missing || overrides.fail_on_missing,
        }
    }
}
