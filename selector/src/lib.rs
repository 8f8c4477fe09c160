//! Select or deselect collected tests using name patterns from a file.
//!
//! A run validates the options, loads the selection file into a
//! [`PatternSet`], and partitions the host's tests into kept and removed.
//! Patterns glob-match a test's full id or equal its short name.

pub mod config;
pub mod diagnostic;
pub mod error;
pub mod item;
pub mod partition;
pub mod pattern;
pub mod run;
pub mod validate;

pub use config::{SelectConfig, SelectionMode};
pub use diagnostic::UnmatchedPatterns;
pub use error::{SelectError, SelectResult};
pub use item::{TestCase, TestItem};
pub use partition::{match_items, partition, MatchOutcome, Partition};
pub use pattern::{CompiledPattern, PatternSet};
pub use run::{report_header, select_items, DeselectListener, RunReport, RunState, SelectionRun};
pub use validate::validate_options;

pub mod prelude {
    pub use crate::config::*;
    pub use crate::diagnostic::*;
    pub use crate::error::*;
    pub use crate::item::*;
    pub use crate::partition::*;
    pub use crate::pattern::*;
    pub use crate::run::*;
    pub use crate::validate::*;
}
