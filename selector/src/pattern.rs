//! Selection files and the patterns they contain.
//!
//! A selection file is UTF-8 text with one pattern per line. `\n`, `\r\n`
//! and a lone `\r` all end a line. Lines starting with `#` are comments;
//! every other line is trimmed and kept, including lines that end up empty.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use crate::error::{SelectError, SelectResult};

/// Marks a comment line when it is the very first character
pub const COMMENT_MARKER: char = '#';

/// Deduplicated patterns loaded from one selection file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatternSet {
    patterns: BTreeSet<String>,
}

impl PatternSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse selection file contents.
    pub fn parse(contents: &str) -> Self {
        let normalized = contents.replace("\r\n", "\n").replace('\r', "\n");
        normalized
            .lines()
            .filter(|line| !line.starts_with(COMMENT_MARKER))
            .map(str::trim)
            .collect()
    }

    /// Read and parse a selection file in one go.
    ///
    /// # Errors
    /// Returns [`SelectError::Io`] if the file can't be opened or isn't valid UTF-8.
    pub fn load(path: &Path) -> SelectResult<Self> {
        let contents = fs::read_to_string(path).map_err(|source| SelectError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let patterns = Self::parse(&contents);
        tracing::debug!(
            "Loaded {} selection patterns from {}",
            patterns.len(),
            path.display()
        );
        Ok(patterns)
    }

    pub fn insert(&mut self, pattern: impl Into<String>) -> bool {
        self.patterns.insert(pattern.into())
    }

    pub fn contains(&self, pattern: &str) -> bool {
        self.patterns.contains(pattern)
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Patterns in sorted order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for PatternSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            patterns: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// A pattern prepared for matching against test identifiers
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    source: String,
    glob: Option<glob::Pattern>,
}

impl CompiledPattern {
    /// Compile a shell-style pattern.
    ///
    /// Runs of `*` collapse to one `*`, which matches across `/` as well.
    /// A `[` without a closing `]` stands for itself while the rest of the
    /// pattern keeps its wildcards. Anything `glob` still rejects after that
    /// is compared literally.
    pub fn new(source: &str) -> Self {
        let glob = glob::Pattern::new(&escape_unclosed_brackets(&collapse_stars(source))).ok();
        if glob.is_none() {
            tracing::debug!("Pattern {:?} is not a valid glob, matching literally", source);
        }
        Self {
            source: source.to_string(),
            glob,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Glob match against a full identifier
    pub fn matches_full_id(&self, full_id: &str) -> bool {
        match &self.glob {
            Some(glob) => glob.matches(full_id),
            None => self.source == full_id,
        }
    }

    /// Exact match against a short name; never glob-expanded
    pub fn matches_short_name(&self, short_name: &str) -> bool {
        self.source == short_name
    }
}

fn collapse_stars(pattern: &str) -> String {
    let mut collapsed = String::with_capacity(pattern.len());
    let mut previous_star = false;
    for c in pattern.chars() {
        if c == '*' && previous_star {
            continue;
        }
        previous_star = c == '*';
        collapsed.push(c);
    }
    collapsed
}

/// Rewrite every `[` that opens no class as `[[]`.
///
/// A class may start with `!`, and a `]` right after `[` or `[!` is a member,
/// so `[]]` and `[!]]` are closed but `[!]` is not.
fn escape_unclosed_brackets(pattern: &str) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut escaped = String::with_capacity(pattern.len() + 2);
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        i += 1;
        if c != '[' {
            escaped.push(c);
            continue;
        }

        let mut j = i;
        if chars.get(j) == Some(&'!') {
            j += 1;
        }
        if chars.get(j) == Some(&']') {
            j += 1;
        }
        while j < chars.len() && chars[j] != ']' {
            j += 1;
        }

        if j >= chars.len() {
            escaped.push_str("[[]");
        } else {
            escaped.extend(&chars[i - 1..=j]);
            i = j + 1;
        }
    }
    escaped
}
