//! Non-fatal findings of a selection run.
//!
//! Unmatched patterns are reported as a value instead of a process-wide
//! warning so the caller decides where it ends up. [`crate::SelectionRun`]
//! also logs it through `tracing`.

use serde::{Deserialize, Serialize};
use std::fmt;

const UNMATCHED_HEADER: &str = "Not all test patterns matched an actual test. \
                                The patterns without matching tests are:";

/// Render the unmatched-pattern message. `patterns` is expected to be sorted.
pub(crate) fn format_unmatched(patterns: &[String]) -> String {
    let mut message = String::from(UNMATCHED_HEADER);
    for pattern in patterns {
        message.push_str("\n  - ");
        message.push_str(pattern);
    }
    message
}

/// Patterns that matched zero items in a run, in sorted order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnmatchedPatterns {
    patterns: Vec<String>,
}

impl UnmatchedPatterns {
    pub fn new(mut patterns: Vec<String>) -> Self {
        patterns.sort();
        patterns.dedup();
        Self { patterns }
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn into_patterns(self) -> Vec<String> {
        self.patterns
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

impl fmt::Display for UnmatchedPatterns {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_unmatched(&self.patterns))
    }
}
