//! Analyzer - public API for structural fact extraction.
//!
//! Wraps the per-unit extraction pipeline with the per-unit error policy
//! (an unreadable or malformed unit costs facts, never the run) and the
//! parallel batch path. The analyzer itself holds only configuration; all
//! extraction state is per-unit and pure, so units can be processed in any
//! order or in parallel with identical results.

use std::path::Path;

use rayon::prelude::*;
use tracing::warn;

use crate::extract;
use crate::report::{aggregate, FileReport, ProjectReport};
use crate::unit::SourceUnit;

/// Whether functions named like program entry points (`main`) are recorded
/// as free functions. The whole-project scanner wants them; a per-class
/// analysis pass does not.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EntryPointFilter {
    #[default]
    Include,
    Exclude,
}

impl EntryPointFilter {
    pub(crate) fn includes_entry_points(self) -> bool {
        matches!(self, EntryPointFilter::Include)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnalyzerConfig {
    pub entry_points: EntryPointFilter,
}

/// Stateless fact extractor for a set of source units.
#[derive(Debug, Clone, Default)]
pub struct Analyzer {
    config: AnalyzerConfig,
}

impl Analyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: AnalyzerConfig) -> Self {
        Self { config }
    }

    /// Extract facts from one in-memory unit. Total: malformed text yields
    /// fewer facts, never an error.
    pub fn analyze_unit(&self, unit: &SourceUnit) -> FileReport {
        extract::extract_unit(unit, &self.config)
    }

    /// Read and analyze one file. On a read failure the unit is skipped
    /// with a warning and an empty report keeps its place in the output.
    pub fn analyze_file(&self, path: impl AsRef<Path>) -> FileReport {
        let path = path.as_ref();
        match SourceUnit::read(path) {
            Ok(unit) => self.analyze_unit(&unit),
            Err(err) => {
                warn!("{err}");
                FileReport::empty(path.display().to_string())
            }
        }
    }

    /// Analyze a batch of units in parallel and aggregate the results.
    ///
    /// `par_iter` preserves input order in the collected output, so a fixed
    /// unit ordering always produces an identical report.
    pub fn analyze_project(&self, units: &[SourceUnit]) -> ProjectReport {
        let files: Vec<FileReport> = units.par_iter().map(|u| self.analyze_unit(u)).collect();
        aggregate(files)
    }

    /// Analyze a batch of files by path, reading each in the worker pool.
    /// Unreadable files contribute empty reports in place.
    pub fn analyze_files<P: AsRef<Path> + Sync>(&self, paths: &[P]) -> ProjectReport {
        let files: Vec<FileReport> = paths.par_iter().map(|p| self.analyze_file(p)).collect();
        aggregate(files)
    }
}
