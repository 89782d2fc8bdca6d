//! Version-control history analysis: per-file churn.
//!
//! Reads the change log of a git or subversion working copy through the
//! external `git`/`svn` command, turns it into one event per file per
//! commit, and ranks files by how often they changed.

pub mod aggregate;
pub mod extract;
pub mod process;
pub mod report;
pub mod source;

pub use report::{ChurnOptions, ChurnReport};
pub use source::LogSource;
