// Cppfacts Core - best-effort structural fact extraction for C-family source.
//
// This crate is the analysis core of a test-generation pipeline: given the
// text of C-family source files, it extracts classes (with their methods,
// constructors, destructors, data members and access regions), free
// functions, namespaces and include dependencies, and folds the per-file
// results into one project report.
//
// It is not a parser. A tolerant scanner scrubs comments and literals,
// delimits brace scopes by depth counting, and classifies entities with
// explicit pattern rules, so incomplete or irregular code degrades to fewer
// facts instead of failures. Orchestration concerns (file discovery,
// build/test invocation, report persistence) live outside this crate.

pub mod analyzer;
pub mod error;
pub mod extract;
pub mod report;
pub mod scope;
pub mod scrub;
pub mod unit;

pub use analyzer::{Analyzer, AnalyzerConfig, EntryPointFilter};
pub use error::{Error, Result};
pub use report::{aggregate, FileReport, ProjectReport, ProjectStatistics};
pub use unit::SourceUnit;
