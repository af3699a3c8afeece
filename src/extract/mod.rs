//! Per-unit fact extraction: scrub, locate, delimit, classify, collect.
//!
//! Everything here is pure over one unit's text. The pipeline for a unit is
//! scrub → locate entities → for each class-like entity, delimit its body
//! and classify members (recursing into nested classes) → collect includes
//! from the raw text. Cross-file combination belongs to [`crate::report`].

pub mod types;

mod entities;
mod includes;
mod members;
mod tokens;

use tracing::debug;

use crate::analyzer::AnalyzerConfig;
use crate::report::FileReport;
use crate::scope::{column_number, line_number};
use crate::unit::SourceUnit;
use entities::ClassCandidate;
use types::{ClassFacts, FreeFunctionFacts};

/// Extract one unit's structural facts. Total: malformed input degrades to
/// fewer facts, never to a failure.
pub(crate) fn extract_unit(unit: &SourceUnit, config: &AnalyzerConfig) -> FileReport {
    let scrubbed = crate::scrub::scrub(&unit.content);
    let located = entities::locate(&scrubbed, config.entry_points.includes_entry_points());

    let mut classes = Vec::new();
    for candidate in &located.classes {
        extract_class(&scrubbed, &unit.path, candidate, &mut classes);
    }

    let functions = located
        .functions
        .iter()
        .map(|f| {
            let line = line_number(&scrubbed, f.decl_offset);
            FreeFunctionFacts {
                id: generate_id(&unit.path, &f.name, line, column_number(&scrubbed, f.decl_offset)),
                name: f.name.clone(),
                return_type: f.return_type.clone(),
                line,
            }
        })
        .collect::<Vec<_>>();

    let namespaces = located
        .namespaces
        .iter()
        .map(|n| n.name.clone())
        .collect::<Vec<_>>();

    let includes = includes::collect_includes(&unit.content);

    debug!(
        "extracted {} classes, {} functions, {} includes from {}",
        classes.len(),
        functions.len(),
        includes.len(),
        unit.path
    );

    FileReport {
        file: unit.path.clone(),
        classes,
        functions,
        includes,
        namespaces,
    }
}

/// Build facts for one class candidate and recurse into its nested classes.
/// Nested classes become their own entries; their body regions are masked
/// out of the enclosing body so members are attributed to exactly one scope.
fn extract_class(scrubbed: &str, file: &str, candidate: &ClassCandidate, out: &mut Vec<ClassFacts>) {
    let interior_start = candidate.body_start + 1;
    let interior_end = candidate.body_end - 1;
    let nested = entities::scan_classes(scrubbed, interior_start, interior_end);

    let mut body = scrubbed.as_bytes()[interior_start..interior_end].to_vec();
    for inner in &nested {
        for b in &mut body[inner.decl_offset - interior_start..inner.body_end - interior_start] {
            if *b != b'\n' {
                *b = b' ';
            }
        }
    }
    let body = match String::from_utf8(body) {
        Ok(s) => s,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    };

    let classified = members::classify_members(&body, &candidate.name, candidate.kind.default_access());
    let line = line_number(scrubbed, candidate.decl_offset);

    out.push(ClassFacts {
        id: generate_id(
            file,
            &candidate.name,
            line,
            column_number(scrubbed, candidate.decl_offset),
        ),
        name: candidate.name.clone(),
        kind: candidate.kind,
        base_class: candidate.base_class.clone(),
        line,
        methods: classified.methods,
        constructors: classified.constructors,
        destructors: classified.destructors,
        members: classified.fields,
        access_regions: classified.access_regions,
    });

    for inner in &nested {
        extract_class(scrubbed, file, inner, out);
    }
}

/// Stable content-address id for a fact (md5, hex).
fn generate_id(file: &str, name: &str, line: u32, column: u32) -> String {
    let input = format!("{file}:{name}:{line}:{column}");
    format!("{:x}", md5::compute(input.as_bytes()))
}
