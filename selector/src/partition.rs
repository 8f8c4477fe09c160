//! Matching tests against a pattern set and splitting them into kept and
//! removed partitions.
//!
//! Everything here is pure: items are borrowed, never reordered, and the
//! unmatched-pattern warning comes back as a value.

use crate::config::SelectionMode;
use crate::diagnostic::UnmatchedPatterns;
use crate::item::TestItem;
use crate::pattern::{CompiledPattern, PatternSet};

/// Which items matched at least one pattern, and which patterns matched nothing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchOutcome {
    /// One flag per input item, in input order
    pub matched: Vec<bool>,
    pub unmatched_patterns: UnmatchedPatterns,
}

/// Result of partitioning a collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition<T> {
    pub kept: Vec<T>,
    pub removed: Vec<T>,
    pub unmatched_patterns: UnmatchedPatterns,
}

/// Evaluate every item against every pattern.
///
/// An item matches when a pattern globs its full id or equals its short name.
pub fn match_items<T: TestItem>(items: &[T], patterns: &PatternSet) -> MatchOutcome {
    let compiled: Vec<CompiledPattern> = patterns.iter().map(CompiledPattern::new).collect();
    let mut used = vec![false; compiled.len()];

    let matched: Vec<bool> = items
        .iter()
        .map(|item| {
            let full_id = item.full_id();
            let short_name = item.short_name();
            let mut has_match = false;
            for (pattern, hit) in compiled.iter().zip(used.iter_mut()) {
                if pattern.matches_full_id(full_id) || pattern.matches_short_name(short_name) {
                    *hit = true;
                    has_match = true;
                }
            }
            has_match
        })
        .collect();

    let unmatched = compiled
        .iter()
        .zip(&used)
        .filter(|(_, used)| !**used)
        .map(|(pattern, _)| pattern.as_str().to_string())
        .collect();

    MatchOutcome {
        matched,
        unmatched_patterns: UnmatchedPatterns::new(unmatched),
    }
}

/// Split items into kept and removed according to `mode`, preserving order.
///
/// [`SelectionMode::Inactive`] keeps everything and reports no unmatched patterns.
pub fn partition<'a, T: TestItem>(
    items: &'a [T],
    patterns: &PatternSet,
    mode: SelectionMode,
) -> Partition<&'a T> {
    if !mode.is_active() {
        return Partition {
            kept: items.iter().collect(),
            removed: Vec::new(),
            unmatched_patterns: UnmatchedPatterns::new(Vec::new()),
        };
    }

    let outcome = match_items(items, patterns);
    let keep_matched = mode == SelectionMode::Select;

    let mut kept = Vec::new();
    let mut removed = Vec::new();
    for (item, matched) in items.iter().zip(&outcome.matched) {
        if *matched == keep_matched {
            kept.push(item);
        } else {
            removed.push(item);
        }
    }

    Partition {
        kept,
        removed,
        unmatched_patterns: outcome.unmatched_patterns,
    }
}
