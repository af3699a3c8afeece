//! Per-file and project-level fact containers, and the aggregation fold.

use std::collections::BTreeSet;

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

use crate::extract::types::{ClassFacts, FreeFunctionFacts};

/// Structural facts for one source unit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileReport {
    pub file: String,
    pub classes: Vec<ClassFacts>,
    pub functions: Vec<FreeFunctionFacts>,
    /// Include paths in source order, duplicates preserved.
    pub includes: Vec<String>,
    pub namespaces: Vec<String>,
}

impl FileReport {
    /// The report for a unit that could not be analyzed: the path is kept so
    /// the project report still accounts for the file, with zero facts.
    pub fn empty(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            classes: Vec::new(),
            functions: Vec::new(),
            includes: Vec::new(),
            namespaces: Vec::new(),
        }
    }
}

/// Project totals. Always derived from the file reports by
/// [`ProjectReport::statistics`], never stored alongside them, so the two
/// can not drift apart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProjectStatistics {
    pub total_classes: usize,
    pub total_functions: usize,
    pub total_methods: usize,
    pub files_analyzed: usize,
    pub unique_includes: Vec<String>,
    pub unique_namespaces: Vec<String>,
}

/// Ordered collection of per-file reports. File order is whatever the
/// caller supplied; repeated runs over the same ordering serialize
/// byte-identically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectReport {
    pub files: Vec<FileReport>,
}

impl ProjectReport {
    /// Fold the per-file reports into project totals. Pure: the empty
    /// collection yields all-zero counts and empty summaries.
    pub fn statistics(&self) -> ProjectStatistics {
        let total_classes = self.files.iter().map(|f| f.classes.len()).sum();
        let total_functions = self.files.iter().map(|f| f.functions.len()).sum();
        let total_methods = self
            .files
            .iter()
            .flat_map(|f| f.classes.iter())
            .map(|c| c.methods.len())
            .sum();

        let unique_includes: BTreeSet<&String> =
            self.files.iter().flat_map(|f| f.includes.iter()).collect();
        let unique_namespaces: BTreeSet<&String> = self
            .files
            .iter()
            .flat_map(|f| f.namespaces.iter())
            .collect();

        ProjectStatistics {
            total_classes,
            total_functions,
            total_methods,
            files_analyzed: self.files.len(),
            unique_includes: unique_includes.into_iter().cloned().collect(),
            unique_namespaces: unique_namespaces.into_iter().cloned().collect(),
        }
    }
}

impl Serialize for ProjectReport {
    /// Statistics are recomputed at serialization time, so the rendered
    /// report can never disagree with its own file list.
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ProjectReport", 2)?;
        state.serialize_field("files", &self.files)?;
        state.serialize_field("statistics", &self.statistics())?;
        state.end()
    }
}

/// Merge per-file reports into a project report, preserving order. No
/// deduplication across files: two files declaring an identically named
/// class contribute two distinct entries.
pub fn aggregate(files: Vec<FileReport>) -> ProjectReport {
    ProjectReport { files }
}
