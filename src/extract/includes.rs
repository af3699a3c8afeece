//! Include directive collection.
//!
//! This runs on the raw text, not the scrubbed text: to the scrubber a
//! quoted include path is a string literal and its content would already be
//! blanked. Paths are kept exactly as written (delimiters stripped, nothing
//! resolved), in source order, duplicates included.

use once_cell::sync::Lazy;
use regex::Regex;

static INCLUDE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"#include\s*[<"]([^>"]+)[>"]"#).unwrap());

pub(crate) fn collect_includes(raw: &str) -> Vec<String> {
    INCLUDE_RE
        .captures_iter(raw)
        .map(|caps| caps[1].to_string())
        .collect()
}
