//! Error taxonomy for the fact extractor.
//!
//! Nothing here is fatal to a whole analysis run: an unreadable unit is
//! skipped with a warning, and an unbalanced scope only drops the single
//! candidate entity it belongs to.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The unit's bytes could not be read from disk. The unit is excluded
    /// from the report; other units are unaffected.
    #[error("failed to read {path}: {source}")]
    UnreadableFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A scope opened at `offset` has no matching close brace before end of
    /// input. The candidate entity is dropped; scanning continues with its
    /// siblings.
    #[error("no matching close brace for scope opened at byte {offset}")]
    UnbalancedScope { offset: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
