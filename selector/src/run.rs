//! Host integration for one selection run.
//!
//! A run moves through these states:
//! 1. Idle
//! 2. Validated (options checked, mode known)
//! 3. Inactive → Done, nothing else happens
//! 4. Loaded (selection file read)
//! 5. Partitioned (every item classified, unmatched patterns known)
//! 6. Reported (host collection replaced, listener notified)
//!
//! Nothing carries over between runs.

use serde::{Deserialize, Serialize};

use crate::config::{SelectConfig, SelectionMode};
use crate::diagnostic::UnmatchedPatterns;
use crate::error::{SelectError, SelectResult};
use crate::item::TestItem;
use crate::partition::{match_items, partition, Partition};
use crate::pattern::PatternSet;
use crate::validate::validate_options;

/// Receives the items a run removed from the host collection
pub trait DeselectListener<T> {
    fn deselected(&mut self, items: Vec<T>);
}

impl<T> DeselectListener<T> for Vec<T> {
    fn deselected(&mut self, items: Vec<T>) {
        self.extend(items);
    }
}

/// State of a selection run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunState {
    Idle,
    Validated,
    Loaded,
    Partitioned,
    Reported,
    /// Selection inactive, collection left as is
    Done,
    Failed(String),
}

/// Summary of a finished run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub mode: SelectionMode,
    pub kept: usize,
    pub deselected: usize,
    /// Present when some patterns matched nothing and the run didn't fail on it
    pub warning: Option<UnmatchedPatterns>,
}

/// One-line description of the active selection for a run header.
///
/// Returns `None` when no selection file is configured.
///
/// # Errors
/// Same as [`validate_options`].
pub fn report_header(config: &SelectConfig) -> SelectResult<Option<String>> {
    let mode = validate_options(config)?;
    let Some(path) = config.selection_file() else {
        return Ok(None);
    };

    Ok(Some(format!(
        "select: {}selecting tests from '{}'{}",
        if mode == SelectionMode::Deselect { "de" } else { "" },
        path.display(),
        if config.fail_on_missing {
            ", failing on missing selection items"
        } else {
            ""
        }
    )))
}

/// Validate, load and partition without touching the caller's collection.
///
/// # Errors
/// Validation and loading errors, plus [`SelectError::MissingSelectionTargets`]
/// when patterns matched nothing and `fail_on_missing` is set.
pub fn select_items<'a, T: TestItem>(
    config: &SelectConfig,
    items: &'a [T],
) -> SelectResult<Partition<&'a T>> {
    let mode = validate_options(config)?;
    let patterns = load_for(config)?;
    let result = partition(items, &patterns, mode);
    check_unmatched(config, &result.unmatched_patterns)?;
    Ok(result)
}

fn load_for(config: &SelectConfig) -> SelectResult<PatternSet> {
    match config.selection_file() {
        Some(path) => PatternSet::load(path),
        None => Ok(PatternSet::new()),
    }
}

fn check_unmatched(config: &SelectConfig, unmatched: &UnmatchedPatterns) -> SelectResult<()> {
    if unmatched.is_empty() {
        return Ok(());
    }
    if config.fail_on_missing {
        return Err(SelectError::MissingSelectionTargets {
            patterns: unmatched.patterns().to_vec(),
        });
    }
    tracing::warn!("{}", unmatched);
    Ok(())
}

/// Drives a run against a host-owned collection
#[derive(Debug)]
pub struct SelectionRun<'c> {
    config: &'c SelectConfig,
    state: RunState,
}

impl<'c> SelectionRun<'c> {
    pub fn new(config: &'c SelectConfig) -> Self {
        Self {
            config,
            state: RunState::Idle,
        }
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    /// Filter `items` in place and hand removed items to `listener`.
    ///
    /// On error `items` is left exactly as it was and `listener` is not called.
    ///
    /// # Errors
    /// See [`select_items`].
    pub fn apply<T, L>(&mut self, items: &mut Vec<T>, listener: &mut L) -> SelectResult<RunReport>
    where
        T: TestItem,
        L: DeselectListener<T>,
    {
        self.state = RunState::Idle;
        let result = self.drive(items, listener);
        if let Err(e) = &result {
            self.transition_to(RunState::Failed(e.to_string()));
        }
        result
    }

    fn drive<T, L>(&mut self, items: &mut Vec<T>, listener: &mut L) -> SelectResult<RunReport>
    where
        T: TestItem,
        L: DeselectListener<T>,
    {
        let mode = validate_options(self.config)?;
        self.transition_to(RunState::Validated);

        if !mode.is_active() {
            self.transition_to(RunState::Done);
            return Ok(RunReport {
                mode,
                kept: items.len(),
                deselected: 0,
                warning: None,
            });
        }

        let patterns = load_for(self.config)?;
        self.transition_to(RunState::Loaded);

        let outcome = match_items(items.as_slice(), &patterns);
        self.transition_to(RunState::Partitioned);

        check_unmatched(self.config, &outcome.unmatched_patterns)?;

        let keep_matched = mode == SelectionMode::Select;
        let mut kept = Vec::with_capacity(items.len());
        let mut removed = Vec::new();
        for (item, matched) in std::mem::take(items).into_iter().zip(outcome.matched) {
            if matched == keep_matched {
                kept.push(item);
            } else {
                removed.push(item);
            }
        }

        let report = RunReport {
            mode,
            kept: kept.len(),
            deselected: removed.len(),
            warning: Some(outcome.unmatched_patterns).filter(|u| !u.is_empty()),
        };
        *items = kept;
        listener.deselected(removed);
        self.transition_to(RunState::Reported);

        tracing::debug!(
            "Selection kept {} tests, deselected {}",
            report.kept,
            report.deselected
        );
        Ok(report)
    }

    fn transition_to(&mut self, new_state: RunState) {
        tracing::debug!("Selection state: {:?} → {:?}", self.state, new_state);
        self.state = new_state;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::TestCase;
    use std::fs;
    use std::path::Path;
    use tempfile::{tempdir, TempDir};

    fn write_selection(contents: &str) -> (TempDir, std::path::PathBuf) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("selection.txt");
        fs::write(&path, contents).unwrap();
        (dir, path)
    }

    fn sample_items() -> Vec<TestCase> {
        vec![
            TestCase::from_node_id("tests/test_a.py::test_one"),
            TestCase::from_node_id("tests/test_a.py::test_two"),
            TestCase::from_node_id("tests/test_b.py::test_one"),
        ]
    }

    #[test]
    fn test_header_select() {
        let (_dir, path) = write_selection("x\n");
        let config = SelectConfig::new().with_select_from_file(&path);
        assert_eq!(
            report_header(&config).unwrap(),
            Some(format!("select: selecting tests from '{}'", path.display()))
        );
    }

    #[test]
    fn test_header_deselect_fail_on_missing() {
        let (_dir, path) = write_selection("x\n");
        let config = SelectConfig::new()
            .with_deselect_from_file(&path)
            .with_fail_on_missing(true);
        assert_eq!(
            report_header(&config).unwrap(),
            Some(format!(
                "select: deselecting tests from '{}', failing on missing selection items",
                path.display()
            ))
        );
    }

    #[test]
    fn test_header_inactive() {
        let config = SelectConfig::new().with_fail_on_missing(true);
        assert_eq!(report_header(&config).unwrap(), None);
    }

    #[test]
    fn test_header_validates() {
        let config = SelectConfig::new().with_select_from_file(Path::new("/nonexistent/sel"));
        assert!(report_header(&config).is_err());
    }

    #[test]
    fn test_apply_select() {
        let (_dir, path) = write_selection("tests/test_a.py::*\n");
        let config = SelectConfig::new().with_select_from_file(&path);
        let mut items = sample_items();
        let mut deselected: Vec<TestCase> = Vec::new();

        let mut run = SelectionRun::new(&config);
        let report = run.apply(&mut items, &mut deselected).unwrap();

        assert_eq!(run.state(), &RunState::Reported);
        assert_eq!(report.kept, 2);
        assert_eq!(report.deselected, 1);
        assert!(report.warning.is_none());
        assert_eq!(items, sample_items()[..2]);
        assert_eq!(deselected, sample_items()[2..]);
    }

    #[test]
    fn test_apply_inactive_leaves_items() {
        let config = SelectConfig::default();
        let mut items = sample_items();
        let mut deselected: Vec<TestCase> = Vec::new();

        let mut run = SelectionRun::new(&config);
        let report = run.apply(&mut items, &mut deselected).unwrap();

        assert_eq!(run.state(), &RunState::Done);
        assert_eq!(report.mode, SelectionMode::Inactive);
        assert_eq!(items, sample_items());
        assert!(deselected.is_empty());
    }

    #[test]
    fn test_apply_warns_on_missing() {
        let (_dir, path) = write_selection("does_not_exist\n");
        let config = SelectConfig::new().with_select_from_file(&path);
        let mut items = sample_items();
        let mut deselected: Vec<TestCase> = Vec::new();

        let report = SelectionRun::new(&config)
            .apply(&mut items, &mut deselected)
            .unwrap();

        assert!(items.is_empty());
        assert_eq!(deselected.len(), 3);
        let warning = report.warning.unwrap();
        assert_eq!(warning.patterns(), ["does_not_exist"]);
    }

    #[test]
    fn test_apply_fail_on_missing_leaves_items_untouched() {
        let (_dir, path) = write_selection("does_not_exist\ntest_two\n");
        let config = SelectConfig::new()
            .with_select_from_file(&path)
            .with_fail_on_missing(true);
        let mut items = sample_items();
        let mut deselected: Vec<TestCase> = Vec::new();

        let mut run = SelectionRun::new(&config);
        let err = run.apply(&mut items, &mut deselected).unwrap_err();

        match err {
            SelectError::MissingSelectionTargets { patterns } => {
                assert_eq!(patterns, ["does_not_exist"]);
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(matches!(run.state(), RunState::Failed(_)));
        assert_eq!(items, sample_items());
        assert!(deselected.is_empty());
    }

    #[test]
    fn test_apply_conflict_before_file_access() {
        let config = SelectConfig::new()
            .with_select_from_file("/nonexistent/a")
            .with_deselect_from_file("/nonexistent/b");
        let mut items = sample_items();
        let mut deselected: Vec<TestCase> = Vec::new();

        let err = SelectionRun::new(&config)
            .apply(&mut items, &mut deselected)
            .unwrap_err();
        assert!(matches!(err, SelectError::ConfigurationConflict));
        assert_eq!(items, sample_items());
    }

    #[test]
    fn test_run_can_be_reused() {
        let (_dir, path) = write_selection("test_two\n");
        let config = SelectConfig::new().with_deselect_from_file(&path);
        let mut run = SelectionRun::new(&config);

        let mut first = sample_items();
        let mut second = sample_items();
        let mut sink: Vec<TestCase> = Vec::new();
        run.apply(&mut first, &mut sink).unwrap();
        run.apply(&mut second, &mut sink).unwrap();

        assert_eq!(first, second);
        assert_eq!(sink.len(), 2);
    }

    #[test]
    fn test_select_items_is_pure() {
        let (_dir, path) = write_selection("test_one\n");
        let config = SelectConfig::new().with_select_from_file(&path);
        let items = sample_items();

        let result = select_items(&config, &items).unwrap();
        assert_eq!(result.kept, [&items[0], &items[2]]);
        assert_eq!(result.removed, [&items[1]]);
        assert_eq!(items.len(), 3);
    }
}
